//! Where raw posts come from.
//!
//! Both sources speak the JSON array shape emitted by `bird search --json`.
//! Elements are decoded one at a time, so a single malformed element turns
//! into an [`ExtractionError`] for that position instead of sinking the
//! whole fetch.

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;
use tweetsent_core::RawPost;

use crate::error::SentimentError;

mod bird;
mod file;

pub use bird::BirdSource;
pub use file::JsonFileSource;

/// A single element the source found but could not turn into a post.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("element {index}: {reason}")]
pub struct ExtractionError {
    /// Zero-based position in discovery order.
    pub index: usize,
    pub reason: String,
}

pub type SourceItem = Result<RawPost, ExtractionError>;

/// Produces raw posts for a keyword, in discovery order.
pub trait PostSource: Send + Sync {
    /// Fetch up to `max_posts` items for `keyword`.
    ///
    /// The outer error means nothing could be fetched at all. Per-element
    /// problems are returned inline as `Err` items.
    fn fetch(
        &self,
        keyword: &str,
        max_posts: usize,
    ) -> impl Future<Output = Result<Vec<SourceItem>, SentimentError>> + Send;
}

#[derive(Deserialize)]
struct BirdTweet {
    text: String,
    #[serde(default)]
    author: Option<BirdAuthor>,
}

#[derive(Deserialize)]
struct BirdAuthor {
    #[serde(default)]
    username: Option<String>,
}

impl From<BirdTweet> for RawPost {
    fn from(tweet: BirdTweet) -> Self {
        RawPost::new(tweet.text, tweet.author.and_then(|a| a.username))
    }
}

/// Decode a `bird`-shaped JSON array, keeping at most `max_posts` items.
///
/// # Errors
///
/// Returns [`SentimentError::Source`] if the payload is not a JSON array.
pub(crate) fn decode_posts(
    bytes: &[u8],
    max_posts: usize,
) -> Result<Vec<SourceItem>, SentimentError> {
    let elements: Vec<serde_json::Value> = serde_json::from_slice(bytes)
        .map_err(|e| SentimentError::Source(format!("expected a JSON array of posts: {e}")))?;

    Ok(elements
        .into_iter()
        .take(max_posts)
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<BirdTweet>(value)
                .map(RawPost::from)
                .map_err(|e| ExtractionError {
                    index,
                    reason: e.to_string(),
                })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_text_and_username() {
        let json = br#"[
            {
                "id": "1234567890",
                "text": "Loving the new release",
                "author": { "username": "testuser" }
            }
        ]"#;
        let items = decode_posts(json, 10).unwrap();
        assert_eq!(items.len(), 1);
        let post = items[0].as_ref().unwrap();
        assert_eq!(post.text, "Loving the new release");
        assert_eq!(post.username.as_deref(), Some("testuser"));
    }

    #[test]
    fn extra_fields_ignored() {
        let json = br#"[
            {
                "id": "999",
                "text": "hello",
                "createdAt": "2024-01-01T00:00:00Z",
                "likeCount": 42,
                "author": { "username": "fan", "name": "A Fan" },
                "authorId": "111"
            }
        ]"#;
        let items = decode_posts(json, 10).unwrap();
        assert_eq!(items[0].as_ref().unwrap().username.as_deref(), Some("fan"));
    }

    #[test]
    fn missing_author_leaves_username_empty() {
        let json = br#"[{ "text": "anonymous post" }, { "text": "x", "author": {} }]"#;
        let items = decode_posts(json, 10).unwrap();
        assert!(items.iter().all(|i| i.as_ref().unwrap().username.is_none()));
    }

    #[test]
    fn malformed_element_isolated_at_its_index() {
        let json = br#"[
            { "text": "one" },
            { "text": "two" },
            { "author": { "username": "no_text" } },
            { "text": "four" },
            { "text": "five" }
        ]"#;
        let items = decode_posts(json, 10).unwrap();
        assert_eq!(items.len(), 5);
        let err = items[2].as_ref().unwrap_err();
        assert_eq!(err.index, 2);
        assert!(err.reason.contains("text"), "reason was: {}", err.reason);
        assert_eq!(items.iter().filter(|i| i.is_ok()).count(), 4);
    }

    #[test]
    fn truncates_to_max_posts() {
        let json = br#"[{ "text": "a" }, { "text": "b" }, { "text": "c" }]"#;
        let items = decode_posts(json, 2).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].as_ref().unwrap().text, "b");
    }

    #[test]
    fn non_array_payload_is_source_error() {
        let err = decode_posts(br#"{"error": "rate limited"}"#, 10).unwrap_err();
        assert!(matches!(err, SentimentError::Source(_)));
    }
}
