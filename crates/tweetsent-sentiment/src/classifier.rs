//! Three-way sentiment classification.
//!
//! Classification never fails outward: anything that goes wrong talking to
//! the model is logged and the post is labelled neutral, so ingestion keeps
//! going when the inference API is down.

use std::future::Future;

use tweetsent_core::{InferenceConfig, Sentiment};

use crate::error::SentimentError;
use crate::inference::InferenceClient;

pub(crate) const SYSTEM_INSTRUCTION: &str = "You are a sentiment analysis assistant that \
     classifies text as positive, negative, or neutral.";

/// Something that can label cleaned post text.
pub trait Classify: Send + Sync {
    /// Label `clean_text`. Must not fail; fall back to [`Sentiment::Neutral`].
    fn classify(&self, clean_text: &str) -> impl Future<Output = Sentiment> + Send;
}

/// Map a free-form model reply to a label.
///
/// Case-folds the reply and checks for `"positive"` first, then
/// `"negative"`; anything else is neutral. Substring matching tolerates
/// replies like `"Sentiment: Positive."`.
#[must_use]
pub fn parse_label(reply: &str) -> Sentiment {
    let reply = reply.trim().to_lowercase();
    if reply.contains("positive") {
        Sentiment::Positive
    } else if reply.contains("negative") {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn user_prompt(clean_text: &str) -> String {
    format!(
        "Analyze the sentiment of the following tweet.\n\
         Respond with only one word: 'positive', 'negative', or 'neutral'.\n\n\
         Tweet: {clean_text}"
    )
}

/// Classifier backed by a chat-completions model.
pub struct LlmClassifier {
    client: InferenceClient,
}

impl LlmClassifier {
    #[must_use]
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }

    /// Build the HTTP client and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, SentimentError> {
        Ok(Self::new(InferenceClient::new(config)?))
    }
}

impl Classify for LlmClassifier {
    async fn classify(&self, clean_text: &str) -> Sentiment {
        match self
            .client
            .complete(SYSTEM_INSTRUCTION, &user_prompt(clean_text))
            .await
        {
            Ok(reply) => {
                let label = parse_label(&reply);
                tracing::debug!(reply = %reply.trim(), %label, "model reply classified");
                label
            }
            Err(e) => {
                tracing::warn!(error = %e, "classification failed, defaulting to neutral");
                Sentiment::Neutral
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn classifier(base_url: &str, timeout_secs: u64) -> LlmClassifier {
        LlmClassifier::from_config(&InferenceConfig {
            api_key: "test-key".to_string(),
            base_url: base_url.to_string(),
            model: "llama3-8b-8192".to_string(),
            timeout_secs,
        })
        .unwrap()
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "role": "assistant", "content": content } } ]
        }))
    }

    #[test]
    fn parse_label_is_case_insensitive() {
        assert_eq!(parse_label("POSITIVE"), Sentiment::Positive);
        assert_eq!(parse_label(" Negative\n"), Sentiment::Negative);
        assert_eq!(parse_label("neutral"), Sentiment::Neutral);
    }

    #[test]
    fn parse_label_tolerates_verbose_replies() {
        assert_eq!(
            parse_label("The sentiment of this tweet is positive."),
            Sentiment::Positive
        );
        assert_eq!(parse_label("Sentiment: negative"), Sentiment::Negative);
    }

    #[test]
    fn parse_label_checks_positive_before_negative() {
        assert_eq!(
            parse_label("positive, not negative"),
            Sentiment::Positive
        );
        assert_eq!(parse_label("not positive"), Sentiment::Positive);
    }

    #[test]
    fn parse_label_defaults_to_neutral() {
        assert_eq!(parse_label(""), Sentiment::Neutral);
        assert_eq!(parse_label("mixed feelings"), Sentiment::Neutral);
    }

    #[test]
    fn prompt_embeds_the_text() {
        let prompt = user_prompt("rust is fun");
        assert!(prompt.ends_with("Tweet: rust is fun"));
        assert!(prompt.contains("only one word"));
    }

    #[tokio::test]
    async fn classify_uses_model_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Tweet: shipping day went great"))
            .respond_with(reply("Positive"))
            .mount(&server)
            .await;

        let label = classifier(&server.uri(), 5)
            .classify("shipping day went great")
            .await;
        assert_eq!(label, Sentiment::Positive);
    }

    #[tokio::test]
    async fn classify_falls_back_to_neutral_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let label = classifier(&server.uri(), 5).classify("anything").await;
        assert_eq!(label, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn classify_falls_back_to_neutral_on_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let label = classifier(&server.uri(), 5).classify("anything").await;
        assert_eq!(label, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn classify_falls_back_to_neutral_on_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("negative").set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let label = classifier(&server.uri(), 1).classify("slow one").await;
        assert_eq!(label, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn classify_falls_back_to_neutral_when_unreachable() {
        // Port 9 (discard) is not listening in test environments.
        let label = classifier("http://127.0.0.1:9", 2).classify("offline").await;
        assert_eq!(label, Sentiment::Neutral);
    }
}
