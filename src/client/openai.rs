//! OpenAI-compatible chat completions backend.

use crate::client::{conversation, non_empty, ChatMessage, ClientError, ModelClient, PromptSet};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Client for `/chat/completions` on OpenAI or any compatible server.
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn request(&self, question: &str, prompts: &PromptSet) -> Result<String, ClientError> {
        let url = self.endpoint();
        let body = CompletionRequest {
            model: &self.config.model,
            messages: conversation(question, prompts),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("POST {} (model {})", url, self.config.model);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ClientError::from_transport(e, &self.config.api_base, self.config.timeout_seconds)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        non_empty(completion_text(&value))
    }
}

/// Pull the answer out of a completion body.
///
/// Handles `choices[0].message.content` as a string or as an array of
/// text parts, and the older `choices[0].text` shape.
fn completion_text(value: &Value) -> Option<String> {
    let choice = value.get("choices")?.get(0)?;

    if let Some(content) = choice.get("message").and_then(|m| m.get("content")) {
        if let Some(text) = content.as_str() {
            return Some(text.to_string());
        }
        if let Some(parts) = content.as_array() {
            let joined: String = parts
                .iter()
                .filter_map(|p| p.as_str().or_else(|| p.get("text").and_then(Value::as_str)))
                .collect();
            return Some(joined);
        }
    }

    choice.get("text").and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(base: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_base: base.to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 1000,
            temperature: None,
            timeout_seconds: 5,
        }
    }

    fn prompts() -> PromptSet {
        PromptSet::new("You are helpful.", "Investor question: {question}")
    }

    #[test]
    fn test_completion_text_shapes() {
        let modern = json!({"choices": [{"message": {"role": "assistant", "content": "hello"}}]});
        let parts = json!({"choices": [{"message": {"content": [{"type": "text", "text": "he"}, "llo"]}}]});
        let legacy = json!({"choices": [{"text": "hello"}]});
        let missing = json!({"choices": []});

        assert_eq!(completion_text(&modern).as_deref(), Some("hello"));
        assert_eq!(completion_text(&parts).as_deref(), Some("hello"));
        assert_eq!(completion_text(&legacy).as_deref(), Some("hello"));
        assert_eq!(completion_text(&missing), None);
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let client = OpenAiClient::new(config("https://api.example.com/v1/")).unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
        assert_eq!(client.model(), "gpt-4o");
    }

    #[tokio::test]
    async fn test_request_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "gpt-4o",
                "max_tokens": 1000,
                "messages": [
                    {"role": "system", "content": "You are helpful."},
                    {"role": "user", "content": "Investor question: Who is big?"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"BlackRock, see blackrock.com"}}]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(config(&server.url())).unwrap();
        let text = client.request("Who is big?", &prompts()).await.unwrap();

        assert_eq!(text, "BlackRock, see blackrock.com");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = OpenAiClient::new(config(&server.url())).unwrap();
        let err = client.request("Q", &prompts()).await.unwrap_err();

        match err {
            ClientError::Api { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_request_empty_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(config(&server.url())).unwrap();
        let err = client.request("Q", &prompts()).await.unwrap_err();

        assert!(matches!(err, ClientError::EmptyResponse));
    }
}
