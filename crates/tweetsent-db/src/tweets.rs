//! Database operations for the `tweets` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tweetsent_core::{Sentiment, TweetRecord, TweetStats};
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `tweets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TweetRow {
    pub id: i64,
    pub public_id: Uuid,
    pub username: String,
    pub text: String,
    pub clean_text: String,
    pub hashtags: Vec<String>,
    pub sentiment: String,
    pub keyword: String,
    pub captured_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TweetRow> for TweetRecord {
    type Error = DbError;

    fn try_from(row: TweetRow) -> Result<Self, Self::Error> {
        let sentiment: Sentiment = row.sentiment.parse().map_err(|e| DbError::InvalidRow {
            id: row.id,
            reason: format!("{e}"),
        })?;
        Ok(TweetRecord {
            username: row.username,
            text: row.text,
            clean_text: row.clean_text,
            hashtags: row.hashtags,
            sentiment,
            timestamp: row.captured_at,
            keyword: row.keyword,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, public_id, username, text, clean_text, hashtags, \
     sentiment, keyword, captured_at, created_at, updated_at FROM tweets";

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert a tweet, or overwrite every field of the row with the same
/// `clean_text`.
///
/// Returns `true` if a new row was inserted, `false` if an existing row was
/// updated. `public_id` is only assigned on insert.
///
/// The conflict target is the `md5(clean_text)` unique index: a btree entry
/// on the raw text caps out near 2.7 KB, and long posts must still upsert.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn upsert_tweet(pool: &PgPool, record: &TweetRecord) -> Result<bool, DbError> {
    // xmax is zero only for a freshly inserted tuple.
    let inserted: bool = sqlx::query_scalar(
        "INSERT INTO tweets \
             (public_id, username, text, clean_text, hashtags, sentiment, keyword, captured_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (md5(clean_text)) DO UPDATE SET \
             username = EXCLUDED.username, \
             text = EXCLUDED.text, \
             hashtags = EXCLUDED.hashtags, \
             sentiment = EXCLUDED.sentiment, \
             keyword = EXCLUDED.keyword, \
             captured_at = EXCLUDED.captured_at, \
             updated_at = NOW() \
         RETURNING (xmax = 0)",
    )
    .bind(Uuid::new_v4())
    .bind(&record.username)
    .bind(&record.text)
    .bind(&record.clean_text)
    .bind(&record.hashtags)
    .bind(record.sentiment.as_str())
    .bind(&record.keyword)
    .bind(record.timestamp)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

/// Delete every tweet. Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn clear_tweets(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM tweets").execute(pool).await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// List every tweet in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tweets(pool: &PgPool) -> Result<Vec<TweetRow>, DbError> {
    let rows = sqlx::query_as::<_, TweetRow>(&format!("{SELECT_COLUMNS} ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// List tweets carrying one sentiment label, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tweets_by_sentiment(
    pool: &PgPool,
    sentiment: Sentiment,
) -> Result<Vec<TweetRow>, DbError> {
    let rows = sqlx::query_as::<_, TweetRow>(&format!(
        "{SELECT_COLUMNS} WHERE sentiment = $1 ORDER BY id"
    ))
    .bind(sentiment.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List tweets scraped for exactly `keyword`, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tweets_by_keyword(
    pool: &PgPool,
    keyword: &str,
) -> Result<Vec<TweetRow>, DbError> {
    let rows = sqlx::query_as::<_, TweetRow>(&format!(
        "{SELECT_COLUMNS} WHERE keyword = $1 ORDER BY id"
    ))
    .bind(keyword)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List the most recently captured tweets.
///
/// Results are ordered by `captured_at DESC` then `id DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_tweets(pool: &PgPool, limit: i64) -> Result<Vec<TweetRow>, DbError> {
    let rows = sqlx::query_as::<_, TweetRow>(&format!(
        "{SELECT_COLUMNS} ORDER BY captured_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Total and per-label counts, read in one statement so `total` always
/// equals the sum of the labels.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn tweet_stats(pool: &PgPool) -> Result<TweetStats, DbError> {
    let (total, positive, neutral, negative): (i64, i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), \
             COUNT(*) FILTER (WHERE sentiment = 'positive'), \
             COUNT(*) FILTER (WHERE sentiment = 'neutral'), \
             COUNT(*) FILTER (WHERE sentiment = 'negative') \
         FROM tweets",
    )
    .fetch_one(pool)
    .await?;

    Ok(TweetStats {
        total,
        positive,
        neutral,
        negative,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sentiment: &str) -> TweetRow {
        TweetRow {
            id: 9,
            public_id: Uuid::new_v4(),
            username: "ferris".to_string(),
            text: "crabs #rust".to_string(),
            clean_text: "crabs".to_string(),
            hashtags: vec!["#rust".to_string()],
            sentiment: sentiment.to_string(),
            keyword: "rust".to_string(),
            captured_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_record() {
        let r = row("positive");
        let captured_at = r.captured_at;
        let record = TweetRecord::try_from(r).unwrap();
        assert_eq!(record.sentiment, Sentiment::Positive);
        assert_eq!(record.clean_text, "crabs");
        assert_eq!(record.hashtags, vec!["#rust"]);
        assert_eq!(record.timestamp, captured_at);
    }

    #[test]
    fn row_with_unknown_sentiment_is_rejected() {
        let err = TweetRecord::try_from(row("ecstatic")).unwrap_err();
        assert!(matches!(err, DbError::InvalidRow { id: 9, .. }));
    }
}
