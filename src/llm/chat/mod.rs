pub mod gemini;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use thiserror::Error;

use super::LlmConfig;
use self::gemini::GeminiChatClient;
use crate::models::chat::{ Role, Turn };

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContentPart {
    pub text: String,
}

/// One role-tagged entry of the `contents` list sent to the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl ContentBlock {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![ContentPart { text: text.into() }],
        }
    }
}

impl From<&Turn> for ContentBlock {
    fn from(turn: &Turn) -> Self {
        ContentBlock::text(turn.role, turn.text.clone())
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion client not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api {
        status: u16,
        body: String,
    },

    #[error("Failed to parse completion response: {0}")]
    InvalidResponse(String),

    #[error("Prompt blocked: {0}")]
    Blocked(String),

    #[error("Completion response contained no text")]
    EmptyResponse,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        contents: &[ContentBlock],
        system_instruction: Option<&str>
    ) -> Result<CompletionResponse, CompletionError>;

    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, CompletionError> {
    let client = GeminiChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
