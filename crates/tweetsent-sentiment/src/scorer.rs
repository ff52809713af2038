//! Offline lexicon scorer for runs without an inference API.

use tweetsent_core::Sentiment;

use crate::classifier::Classify;

/// General-purpose word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("good", 0.3),
    ("great", 0.4),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("love", 0.5),
    ("loved", 0.5),
    ("loving", 0.4),
    ("best", 0.5),
    ("happy", 0.4),
    ("glad", 0.3),
    ("excited", 0.4),
    ("fantastic", 0.5),
    ("wonderful", 0.5),
    ("nice", 0.3),
    ("beautiful", 0.4),
    ("brilliant", 0.5),
    ("recommend", 0.4),
    ("win", 0.4),
    ("winning", 0.4),
    ("thanks", 0.3),
    ("fun", 0.3),
    // Negative signals
    ("bad", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("horrible", -0.6),
    ("worst", -0.6),
    ("hate", -0.6),
    ("hated", -0.6),
    ("sad", -0.4),
    ("angry", -0.5),
    ("disappointed", -0.5),
    ("disappointing", -0.5),
    ("broken", -0.4),
    ("fail", -0.4),
    ("failed", -0.4),
    ("failure", -0.4),
    ("problem", -0.3),
    ("bug", -0.3),
    ("scam", -0.7),
    ("useless", -0.5),
    ("boring", -0.3),
];

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        for &(lex_word, weight) in LEXICON {
            if w == lex_word {
                score += weight;
                break;
            }
        }
    }
    score.clamp(-1.0, 1.0)
}

/// [`Classify`] implementation over [`lexicon_score`]: above zero is
/// positive, below zero negative, exactly zero neutral.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconClassifier;

impl Classify for LexiconClassifier {
    async fn classify(&self, clean_text: &str) -> Sentiment {
        let score = lexicon_score(clean_text);
        if score > 0.0 {
            Sentiment::Positive
        } else if score < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = lexicon_score("this release is great");
        assert!(score > 0.0, "expected positive score, got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = lexicon_score("the update is broken");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn score_clamps_to_positive_one() {
        let text = "great excellent best love amazing awesome fantastic";
        assert_eq!(lexicon_score(text), 1.0);
    }

    #[test]
    fn score_clamps_to_negative_one() {
        let text = "terrible awful horrible worst hate scam useless";
        assert_eq!(lexicon_score(text), -1.0);
    }

    #[test]
    fn punctuation_stripped_from_words() {
        let score = lexicon_score("Great!");
        assert!(score > 0.0, "expected positive score for 'Great!', got {score}");
    }

    #[tokio::test]
    async fn classifier_maps_score_sign_to_label() {
        let c = LexiconClassifier;
        assert_eq!(c.classify("what a great day").await, Sentiment::Positive);
        assert_eq!(c.classify("worst day ever").await, Sentiment::Negative);
        assert_eq!(c.classify("it is tuesday").await, Sentiment::Neutral);
        // great (+0.4) + bad (-0.4) cancels out.
        assert_eq!(c.classify("great but bad").await, Sentiment::Neutral);
    }
}
