//! Ranked summaries over stored records for reports.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::tweets::{Sentiment, TweetRecord};

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

/// English filler words excluded from word-frequency rankings.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "is", "are", "was", "were", "be", "been", "being", "in",
    "on", "at", "to", "for", "with", "by", "about", "against", "between", "into", "through",
    "during", "before", "after", "above", "below", "from", "up", "down", "of", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor",
    "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just",
    "don", "should", "now", "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you",
    "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she", "her",
    "hers", "herself", "it", "its", "itself", "they", "them", "their", "theirs", "themselves",
    "what", "which", "who", "whom", "this", "that", "these", "those", "am", "have", "has", "had",
    "having", "do", "does", "did", "doing", "would", "could", "ought", "cannot", "yeah", "u",
    "ur", "r", "n", "im", "m", "rt",
];

/// A label with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    pub label: String,
    pub count: usize,
}

/// Count occurrences and return the `n` most common, highest first. Ties keep
/// the order in which labels were first seen.
fn rank<I>(items: I, n: usize) -> Vec<Ranked>
where
    I: IntoIterator<Item = String>,
{
    let mut order: Vec<Ranked> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        if let Some(&i) = index.get(&item) {
            order[i].count += 1;
        } else {
            index.insert(item.clone(), order.len());
            order.push(Ranked {
                label: item,
                count: 1,
            });
        }
    }

    // sort_by is stable, so first-seen order survives among equal counts.
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(n);
    order
}

/// Most used hashtags across all records. Case-sensitive: `#Rust` and `#rust`
/// are counted separately.
#[must_use]
pub fn top_hashtags(records: &[TweetRecord], n: usize) -> Vec<Ranked> {
    rank(records.iter().flat_map(|r| r.hashtags.iter().cloned()), n)
}

/// Most frequent non-stopword words in the cleaned text, lowercased.
#[must_use]
pub fn frequent_words(records: &[TweetRecord], n: usize) -> Vec<Ranked> {
    let words = records.iter().flat_map(|r| {
        let lowered = r.clean_text.to_lowercase();
        WORD_RE
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .filter(|w| w.chars().count() > 1 && !STOPWORDS.contains(&w.as_str()))
            .collect::<Vec<_>>()
    });
    rank(words, n)
}

/// The first `n` positive and first `n` negative records, in stored order.
#[derive(Debug)]
pub struct BestAndWorst<'a> {
    pub best: Vec<&'a TweetRecord>,
    pub worst: Vec<&'a TweetRecord>,
}

#[must_use]
pub fn best_and_worst(records: &[TweetRecord], n: usize) -> BestAndWorst<'_> {
    let pick = |label: Sentiment| {
        records
            .iter()
            .filter(|r| r.sentiment == label)
            .take(n)
            .collect::<Vec<_>>()
    };
    BestAndWorst {
        best: pick(Sentiment::Positive),
        worst: pick(Sentiment::Negative),
    }
}

/// Top hashtags within each sentiment label.
#[must_use]
pub fn hashtags_by_sentiment(records: &[TweetRecord], n: usize) -> Vec<(Sentiment, Vec<Ranked>)> {
    Sentiment::ALL
        .iter()
        .map(|&label| {
            let tags = records
                .iter()
                .filter(|r| r.sentiment == label)
                .flat_map(|r| r.hashtags.iter().cloned());
            (label, rank(tags, n))
        })
        .collect()
}
