//! The persistence surface the ingestion pipeline and the CLI talk to.

use std::future::Future;

use sqlx::PgPool;
use tweetsent_core::{Sentiment, TweetRecord, TweetStats};

use crate::{tweets, DbError, PoolConfig};

/// Which branch an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Idempotent, content-addressed tweet storage.
///
/// `clean_text` is the key: at most one record exists per distinct value.
/// Implementations do not retry; errors go straight back to the caller.
pub trait TweetStore: Send + Sync {
    /// Overwrite the record with equal `clean_text`, or insert a new one.
    fn upsert(
        &self,
        record: &TweetRecord,
    ) -> impl Future<Output = Result<UpsertOutcome, DbError>> + Send;

    /// Delete every record. Returns how many were removed.
    fn clear(&self) -> impl Future<Output = Result<u64, DbError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<TweetRecord>, DbError>> + Send;

    fn get_by_sentiment(
        &self,
        sentiment: Sentiment,
    ) -> impl Future<Output = Result<Vec<TweetRecord>, DbError>> + Send;

    fn get_by_keyword(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<TweetRecord>, DbError>> + Send;

    /// Newest `limit` records by capture time.
    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TweetRecord>, DbError>> + Send;

    fn stats(&self) -> impl Future<Output = Result<TweetStats, DbError>> + Send;
}

/// Postgres-backed [`TweetStore`].
///
/// Owns its pool. Construct with [`PgTweetStore::connect`] at startup, hand
/// it to whoever needs it, and call [`PgTweetStore::close`] on shutdown.
#[derive(Debug, Clone)]
pub struct PgTweetStore {
    pool: PgPool,
}

impl PgTweetStore {
    /// Open a pool against `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the connection cannot be established.
    pub async fn connect(database_url: &str, config: PoolConfig) -> Result<Self, DbError> {
        let pool = crate::connect_pool(database_url, config).await?;
        tracing::debug!(
            max_connections = config.max_connections,
            "tweet store connected"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool (used by `#[sqlx::test]`).
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("tweet store closed");
    }
}

fn into_records(rows: Vec<tweets::TweetRow>) -> Result<Vec<TweetRecord>, DbError> {
    rows.into_iter().map(TweetRecord::try_from).collect()
}

impl TweetStore for PgTweetStore {
    async fn upsert(&self, record: &TweetRecord) -> Result<UpsertOutcome, DbError> {
        let inserted = tweets::upsert_tweet(&self.pool, record).await?;
        Ok(if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn clear(&self) -> Result<u64, DbError> {
        tweets::clear_tweets(&self.pool).await
    }

    async fn get_all(&self) -> Result<Vec<TweetRecord>, DbError> {
        into_records(tweets::list_tweets(&self.pool).await?)
    }

    async fn get_by_sentiment(&self, sentiment: Sentiment) -> Result<Vec<TweetRecord>, DbError> {
        into_records(tweets::list_tweets_by_sentiment(&self.pool, sentiment).await?)
    }

    async fn get_by_keyword(&self, keyword: &str) -> Result<Vec<TweetRecord>, DbError> {
        into_records(tweets::list_tweets_by_keyword(&self.pool, keyword).await?)
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<TweetRecord>, DbError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        into_records(tweets::list_recent_tweets(&self.pool, limit).await?)
    }

    async fn stats(&self) -> Result<TweetStats, DbError> {
        tweets::tweet_stats(&self.pool).await
    }
}
