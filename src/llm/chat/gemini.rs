use async_trait::async_trait;
use log::{ debug, info };
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };

use super::{ ChatClient, CompletionError, CompletionResponse, ContentBlock, ContentPart };
use crate::llm::{ LlmConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL };

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [ContentBlock],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Serialize, Debug)]
struct SystemInstruction {
    parts: Vec<ContentPart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Joins every text part of the first candidate.
    fn into_text(self) -> Result<String, CompletionError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(CompletionError::Blocked(reason));
        }

        let text: String = self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(text)
    }
}

pub struct GeminiChatClient {
    http: HttpClient,
    api_key: String,
    default_model: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, CompletionError> {
        let default_model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        let http = HttpClient::builder().build()?;

        Ok(Self { http, api_key, default_model, base_url })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, CompletionError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::NotConfigured(
                    "Gemini API key is required for GeminiChatClient".to_string()
                )
            })?;

        Self::new(api_key, config.completion_model.clone(), config.base_url.clone())
    }

    fn endpoint(&self, model: &str) -> String {
        let model = if model.is_empty() { self.default_model.as_str() } else { model };
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), model)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn generate(
        &self,
        model: &str,
        contents: &[ContentBlock],
        system_instruction: Option<&str>
    ) -> Result<CompletionResponse, CompletionError> {
        let payload = GenerateContentRequest {
            contents,
            system_instruction: system_instruction.map(|text| SystemInstruction {
                parts: vec![ContentPart { text: text.to_string() }],
            }),
        };

        let url = self.endpoint(model);
        info!("GeminiChatClient::generate() → model={} turns={}", model, contents.len());
        debug!("POST {}", url);

        let resp = self.http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Api { status: status.as_u16(), body });
        }

        let body = resp.text().await?;
        let parsed: GenerateContentResponse = serde_json
            ::from_str(&body)
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        let text = parsed.into_text()?;
        Ok(CompletionResponse { text })
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
