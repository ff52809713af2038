//! Hashtag extraction and text cleaning for raw posts.
//!
//! Cleaning removes URL tokens (`http` followed by a non-whitespace run),
//! `@mentions` and `#hashtags`, then collapses the whitespace left behind.
//! The cleaned text is the dedup key for stored records, so this module must
//! stay deterministic: same input, same output.

use std::sync::LazyLock;

use regex::Regex;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("valid hashtag regex"));

static STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|@\w+|#\w+").expect("valid strip regex"));

/// Result of normalizing one raw post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub clean_text: String,
    pub hashtags: Vec<String>,
}

impl NormalizedText {
    /// `true` when nothing is left after stripping. Such posts are never stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clean_text.is_empty()
    }
}

/// Extract hashtags and produce cleaned text from raw post content.
#[must_use]
pub fn normalize(raw: &str) -> NormalizedText {
    NormalizedText {
        clean_text: clean_text(raw),
        hashtags: extract_hashtags(raw),
    }
}

/// Every `#word` token in order of appearance. Case and duplicates are kept.
#[must_use]
pub fn extract_hashtags(raw: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(raw)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Remove URLs, mentions and hashtags, collapse whitespace runs, and trim.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let stripped = STRIP_RE.replace_all(raw, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashtags_keep_order_case_and_duplicates() {
        let out = normalize("great #sun day #SUN");
        assert_eq!(out.hashtags, vec!["#sun", "#SUN"]);
    }

    #[test]
    fn repeated_hashtag_is_kept_twice() {
        assert_eq!(extract_hashtags("#a #b #a"), vec!["#a", "#b", "#a"]);
    }

    #[test]
    fn cleaning_removes_urls_mentions_and_hashtags() {
        let out = normalize("check http://x.co @bob #fun now");
        assert_eq!(out.clean_text, "check now");
        assert_eq!(out.hashtags, vec!["#fun"]);
    }

    #[test]
    fn https_links_are_removed() {
        assert_eq!(
            clean_text("read https://example.com/a?b=c later"),
            "read later"
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(clean_text("  @lead hello world #tail  "), "hello world");
    }

    #[test]
    fn url_and_mention_only_is_empty() {
        let out = normalize("https://t.co/xyz @someone");
        assert!(out.is_empty());
        assert!(out.hashtags.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let out = normalize("");
        assert_eq!(out.clean_text, "");
        assert!(out.hashtags.is_empty());
    }

    #[test]
    fn case_of_remaining_text_is_untouched() {
        assert_eq!(clean_text("Rust IS Great #rustlang"), "Rust IS Great");
    }

    #[test]
    fn unicode_hashtags_are_extracted() {
        assert_eq!(extract_hashtags("día #café bueno"), vec!["#café"]);
    }

    #[test]
    fn bare_hash_is_not_a_hashtag() {
        let out = normalize("we are # 1");
        assert!(out.hashtags.is_empty());
        assert_eq!(out.clean_text, "we are # 1");
    }
}
