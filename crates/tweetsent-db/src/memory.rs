//! In-process [`TweetStore`] for tests and offline dry runs.

use tokio::sync::RwLock;
use tweetsent_core::{Sentiment, TweetRecord, TweetStats};

use crate::store::{TweetStore, UpsertOutcome};
use crate::DbError;

/// Records kept in a `Vec` in insertion order. Same upsert semantics as
/// the Postgres store; never returns an error.
#[derive(Debug, Default)]
pub struct MemoryTweetStore {
    records: RwLock<Vec<TweetRecord>>,
}

impl MemoryTweetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl TweetStore for MemoryTweetStore {
    async fn upsert(&self, record: &TweetRecord) -> Result<UpsertOutcome, DbError> {
        let mut records = self.records.write().await;
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.clean_text == record.clean_text)
        {
            *existing = record.clone();
            Ok(UpsertOutcome::Updated)
        } else {
            records.push(record.clone());
            Ok(UpsertOutcome::Inserted)
        }
    }

    async fn clear(&self) -> Result<u64, DbError> {
        let mut records = self.records.write().await;
        let removed = records.len();
        records.clear();
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn get_all(&self) -> Result<Vec<TweetRecord>, DbError> {
        Ok(self.records.read().await.clone())
    }

    async fn get_by_sentiment(&self, sentiment: Sentiment) -> Result<Vec<TweetRecord>, DbError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.sentiment == sentiment)
            .cloned()
            .collect())
    }

    async fn get_by_keyword(&self, keyword: &str) -> Result<Vec<TweetRecord>, DbError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.keyword == keyword)
            .cloned()
            .collect())
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<TweetRecord>, DbError> {
        let mut recent = self.records.read().await.clone();
        // Stable sort, then reverse insertion order for equal timestamps to
        // mirror `captured_at DESC, id DESC`.
        recent.reverse();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn stats(&self) -> Result<TweetStats, DbError> {
        Ok(TweetStats::from_records(&self.records.read().await))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn record(clean_text: &str, sentiment: Sentiment, minute: i64) -> TweetRecord {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        TweetRecord {
            username: "ferris".to_string(),
            text: format!("{clean_text} #rust"),
            clean_text: clean_text.to_string(),
            hashtags: vec!["#rust".to_string()],
            sentiment,
            timestamp: base + Duration::minutes(minute),
            keyword: "rust".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_with_equal_clean_text_replaces_fields() {
        let store = MemoryTweetStore::new();
        let first = record("same words", Sentiment::Positive, 0);
        let mut second = record("same words", Sentiment::Negative, 5);
        second.username = "other".to_string();
        second.keyword = "crab".to_string();

        assert_eq!(store.upsert(&first).await.unwrap(), UpsertOutcome::Inserted);
        assert_eq!(store.upsert(&second).await.unwrap(), UpsertOutcome::Updated);

        let all = store.get_all().await.unwrap();
        assert_eq!(all, vec![second]);
    }

    #[tokio::test]
    async fn clean_text_equality_is_case_and_whitespace_sensitive() {
        let store = MemoryTweetStore::new();
        store
            .upsert(&record("Hello world", Sentiment::Neutral, 0))
            .await
            .unwrap();
        store
            .upsert(&record("hello world", Sentiment::Neutral, 1))
            .await
            .unwrap();
        store
            .upsert(&record("hello  world", Sentiment::Neutral, 2))
            .await
            .unwrap();
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = MemoryTweetStore::new();
        store
            .upsert(&record("a", Sentiment::Positive, 0))
            .await
            .unwrap();
        store
            .upsert(&record("b", Sentiment::Negative, 1))
            .await
            .unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.get_all().await.unwrap().is_empty());
        assert_eq!(store.stats().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn filters_by_sentiment_and_keyword() {
        let store = MemoryTweetStore::new();
        store
            .upsert(&record("a", Sentiment::Positive, 0))
            .await
            .unwrap();
        let mut other = record("b", Sentiment::Negative, 1);
        other.keyword = "go".to_string();
        store.upsert(&other).await.unwrap();

        let positive = store.get_by_sentiment(Sentiment::Positive).await.unwrap();
        assert_eq!(positive.len(), 1);
        assert_eq!(positive[0].clean_text, "a");

        let go = store.get_by_keyword("go").await.unwrap();
        assert_eq!(go.len(), 1);
        assert_eq!(go[0].clean_text, "b");
        assert!(store.get_by_keyword("Go").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_truncated() {
        let store = MemoryTweetStore::new();
        store
            .upsert(&record("old", Sentiment::Neutral, 0))
            .await
            .unwrap();
        store
            .upsert(&record("newest", Sentiment::Neutral, 10))
            .await
            .unwrap();
        store
            .upsert(&record("middle", Sentiment::Neutral, 5))
            .await
            .unwrap();

        let recent = store.get_recent(2).await.unwrap();
        let texts: Vec<&str> = recent.iter().map(|r| r.clean_text.as_str()).collect();
        assert_eq!(texts, vec!["newest", "middle"]);
    }

    #[tokio::test]
    async fn stats_total_matches_label_sum() {
        let store = MemoryTweetStore::new();
        for (i, label) in [
            Sentiment::Positive,
            Sentiment::Negative,
            Sentiment::Neutral,
            Sentiment::Positive,
        ]
        .into_iter()
        .enumerate()
        {
            let n = i64::try_from(i).unwrap();
            store
                .upsert(&record(&format!("post {i}"), label, n))
                .await
                .unwrap();
        }
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.positive, 2);
        assert_eq!(stats.total, stats.positive + stats.neutral + stats.negative);
    }
}
