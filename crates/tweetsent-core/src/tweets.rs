use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Username stored when the source could not tell who wrote a post.
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// Sentiment label assigned to every stored post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Every label, in display order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(CoreError::InvalidSentiment(other.to_string())),
        }
    }
}

/// A post as handed over by a scraping source, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    pub text: String,
    /// Author handle when the source could extract one.
    pub username: Option<String>,
}

impl RawPost {
    #[must_use]
    pub fn new(text: impl Into<String>, username: Option<String>) -> Self {
        Self {
            text: text.into(),
            username,
        }
    }

    /// The username to store, falling back to [`UNKNOWN_USERNAME`] when the
    /// source gave nothing usable.
    #[must_use]
    pub fn username_or_unknown(&self) -> String {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(UNKNOWN_USERNAME)
            .to_string()
    }
}

/// A normalized, classified post. One stored record exists per distinct
/// `clean_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub username: String,
    /// Raw text exactly as captured.
    pub text: String,
    /// Text with URLs, mentions and hashtags removed. Dedup key.
    pub clean_text: String,
    /// Hashtags in order of appearance, duplicates kept.
    pub hashtags: Vec<String>,
    pub sentiment: Sentiment,
    /// Capture time, set once at ingestion.
    pub timestamp: DateTime<Utc>,
    /// Search term that produced this record.
    pub keyword: String,
}

/// Per-label record counts over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetStats {
    pub total: i64,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

impl TweetStats {
    /// Count records by label. Used by stores that keep records in memory.
    #[must_use]
    pub fn from_records(records: &[TweetRecord]) -> Self {
        let count = |label: Sentiment| {
            let n = records.iter().filter(|r| r.sentiment == label).count();
            i64::try_from(n).unwrap_or(i64::MAX)
        };
        Self {
            total: i64::try_from(records.len()).unwrap_or(i64::MAX),
            positive: count(Sentiment::Positive),
            neutral: count(Sentiment::Neutral),
            negative: count(Sentiment::Negative),
        }
    }

    #[must_use]
    pub fn count_for(&self, sentiment: Sentiment) -> i64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    /// Percentage of `total` carrying `sentiment`, or `0.0` for an empty store.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn share(&self, sentiment: Sentiment) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count_for(sentiment) as f64 * 100.0 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(clean_text: &str, sentiment: Sentiment) -> TweetRecord {
        TweetRecord {
            username: "someone".to_string(),
            text: clean_text.to_string(),
            clean_text: clean_text.to_string(),
            hashtags: vec![],
            sentiment,
            timestamp: Utc::now(),
            keyword: "rust".to_string(),
        }
    }

    #[test]
    fn sentiment_parses_lowercase_labels() {
        for label in Sentiment::ALL {
            assert_eq!(label.as_str().parse::<Sentiment>().unwrap(), label);
        }
    }

    #[test]
    fn sentiment_rejects_unknown_label() {
        let err = "Positive".parse::<Sentiment>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidSentiment(ref s) if s == "Positive"));
    }

    #[test]
    fn sentiment_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }

    #[test]
    fn username_falls_back_to_unknown() {
        assert_eq!(RawPost::new("hi", None).username_or_unknown(), "Unknown");
        assert_eq!(
            RawPost::new("hi", Some("  ".to_string())).username_or_unknown(),
            "Unknown"
        );
        assert_eq!(
            RawPost::new("hi", Some("ferris".to_string())).username_or_unknown(),
            "ferris"
        );
    }

    #[test]
    fn stats_from_records_sum_to_total() {
        let records = vec![
            record("a", Sentiment::Positive),
            record("b", Sentiment::Positive),
            record("c", Sentiment::Negative),
            record("d", Sentiment::Neutral),
        ];
        let stats = TweetStats::from_records(&records);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.positive, 2);
        assert_eq!(stats.total, stats.positive + stats.neutral + stats.negative);
    }

    #[test]
    fn share_of_empty_stats_is_zero() {
        assert_eq!(TweetStats::default().share(Sentiment::Positive), 0.0);
    }

    #[test]
    fn share_is_percentage_of_total() {
        let stats = TweetStats {
            total: 4,
            positive: 1,
            neutral: 1,
            negative: 2,
        };
        assert!((stats.share(Sentiment::Negative) - 50.0).abs() < f64::EPSILON);
    }
}
