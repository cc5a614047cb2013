//! Language-model backends.
//!
//! Every backend implements [`ModelClient`]; the runner only ever sees
//! response text or a [`ClientError`].

pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Token replaced by the question text in the user prompt template.
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Errors a backend can report for a single request.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to {0}")]
    Connect(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("failed to send request: {0}")]
    Request(#[from] reqwest::Error),
}

impl ClientError {
    /// Map a transport error to the most specific variant.
    pub(crate) fn from_transport(err: reqwest::Error, base: &str, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout_seconds)
        } else if err.is_connect() {
            ClientError::Connect(base.to_string())
        } else {
            ClientError::Request(err)
        }
    }
}

/// System prompt plus user prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSet {
    pub system: String,
    pub user_template: String,
}

impl PromptSet {
    pub fn new(system: impl Into<String>, user_template: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user_template: user_template.into(),
        }
    }

    /// The user message for `question`: literal replacement of the placeholder.
    pub fn user_message(&self, question: &str) -> String {
        self.user_template.replace(QUESTION_PLACEHOLDER, question)
    }

    pub fn has_placeholder(&self) -> bool {
        self.user_template.contains(QUESTION_PLACEHOLDER)
    }
}

/// Chat message in the shape both backends accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sends one question to a model and returns its answer.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier, used in report metadata.
    fn model(&self) -> &str;

    async fn request(&self, question: &str, prompts: &PromptSet) -> Result<String, ClientError>;
}

/// Build the two-message conversation for `question`.
pub(crate) fn conversation(question: &str, prompts: &PromptSet) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(prompts.system.clone()),
        ChatMessage::user(prompts.user_message(question)),
    ]
}

/// Treat missing or empty content as a failed request.
pub(crate) fn non_empty(content: Option<String>) -> Result<String, ClientError> {
    match content {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ClientError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_replaces_placeholder() {
        let prompts = PromptSet::new("sys", "I'm an investor. {question} Thanks.");
        assert_eq!(
            prompts.user_message("Who leads?"),
            "I'm an investor. Who leads? Thanks."
        );
    }

    #[test]
    fn test_user_message_is_literal() {
        let prompts = PromptSet::new("sys", "{question} / {question} / {{question}} / {other}");
        assert_eq!(
            prompts.user_message("$1 {x}"),
            "$1 {x} / $1 {x} / {$1 {x}} / {other}"
        );
    }

    #[test]
    fn test_template_without_placeholder() {
        let prompts = PromptSet::new("sys", "Tell me about funds");
        assert!(!prompts.has_placeholder());
        assert_eq!(prompts.user_message("ignored"), "Tell me about funds");
    }

    #[test]
    fn test_conversation_roles() {
        let messages = conversation("Q?", &PromptSet::new("be brief", "Ask: {question}"));
        assert_eq!(messages[0], ChatMessage::system("be brief"));
        assert_eq!(messages[1], ChatMessage::user("Ask: Q?"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("hi".to_string())).unwrap(), "hi");
        assert!(matches!(non_empty(Some(String::new())), Err(ClientError::EmptyResponse)));
        assert!(matches!(non_empty(None), Err(ClientError::EmptyResponse)));
    }
}
