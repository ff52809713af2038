//! Client for an OpenAI-compatible chat-completions endpoint (Groq by default).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tweetsent_core::InferenceConfig;

use crate::error::SentimentError;

const TEMPERATURE: f32 = 0.1;
/// A one-word answer needs only a handful of tokens.
const MAX_TOKENS: u32 = 10;

/// Chat-completions HTTP client.
///
/// Build with [`InferenceClient::new`]; point `base_url` at a mock server in
/// tests.
pub struct InferenceClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl InferenceClient {
    /// Create a client from inference settings.
    ///
    /// The request timeout comes from `config.timeout_secs`; a timed-out call
    /// surfaces as [`SentimentError::Http`].
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &InferenceConfig) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tweetsent/0.1 (sentiment)")
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Send one system + user message pair and return the reply text.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::Http`] on network failure or timeout.
    /// - [`SentimentError::Inference`] on a non-2xx status, an unparseable
    ///   body, or a reply with no content.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, SentimentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SentimentError::Inference(format!(
                "inference API returned status {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SentimentError::Inference(format!("response parse error: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SentimentError::Inference("response had no message content".into()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: &str) -> InferenceConfig {
        InferenceConfig {
            api_key: "test-key".to_string(),
            base_url: base_url.to_string(),
            model: "llama3-8b-8192".to_string(),
            timeout_secs: 5,
        }
    }

    fn reply(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
            ]
        })
    }

    #[tokio::test]
    async fn complete_sends_model_messages_and_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "llama3-8b-8192",
                "max_tokens": 10,
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("positive")))
            .expect(1)
            .mount(&server)
            .await;

        let client = InferenceClient::new(&config(&server.uri())).unwrap();
        let text = client.complete("sys", "hello").await.unwrap();
        assert_eq!(text, "positive");
    }

    #[tokio::test]
    async fn complete_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = InferenceClient::new(&config(&server.uri())).unwrap();
        let err = client.complete("sys", "hello").await.unwrap_err();
        assert!(
            matches!(err, SentimentError::Inference(ref m) if m.contains("429")),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn complete_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = InferenceClient::new(&config(&server.uri())).unwrap();
        let err = client.complete("sys", "hello").await.unwrap_err();
        assert!(matches!(err, SentimentError::Inference(_)));
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("neutral")))
            .mount(&server)
            .await;

        let client = InferenceClient::new(&config(&format!("{}/", server.uri()))).unwrap();
        assert_eq!(client.complete("s", "u").await.unwrap(), "neutral");
    }
}
