use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

pub const DEFAULT_GENERATE_TEXT_INSTRUCTION: &str =
    "Reply in Japanese or Sundanese, chosen at random.";
pub const DEFAULT_CHAT_INSTRUCTION: &str = "You must reply in Sundanese.";

#[derive(Debug)]
pub enum PromptError {
    EmptyInstruction(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::EmptyInstruction(key) =>
                write!(f, "System instruction '{}' must not be empty", key),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// System instructions sent alongside each endpoint's request to the model.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SystemPrompts {
    #[serde(default = "default_generate_text")]
    pub generate_text: String,
    #[serde(default = "default_chat")]
    pub chat: String,
}

fn default_generate_text() -> String {
    DEFAULT_GENERATE_TEXT_INSTRUCTION.to_string()
}

fn default_chat() -> String {
    DEFAULT_CHAT_INSTRUCTION.to_string()
}

impl Default for SystemPrompts {
    fn default() -> Self {
        Self {
            generate_text: default_generate_text(),
            chat: default_chat(),
        }
    }
}

impl SystemPrompts {
    fn validate(&self) -> Result<(), PromptError> {
        if self.generate_text.trim().is_empty() {
            return Err(PromptError::EmptyInstruction("generate_text".to_string()));
        }
        if self.chat.trim().is_empty() {
            return Err(PromptError::EmptyInstruction("chat".to_string()));
        }
        Ok(())
    }
}

pub fn load_prompts_from_str(content: &str) -> Result<SystemPrompts, PromptError> {
    let prompts: SystemPrompts = serde_json::from_str(content)?;
    prompts.validate()?;
    Ok(prompts)
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<SystemPrompts, PromptError> {
    let content = fs::read_to_string(&path)?;
    let prompts = load_prompts_from_str(&content)?;
    info!("Loaded system prompts from {}", path.as_ref().display());
    Ok(prompts)
}

/// Built-in prompts unless a prompts file is configured.
pub fn resolve_prompts(path: Option<&str>) -> Result<SystemPrompts, PromptError> {
    match path {
        Some(p) if !p.trim().is_empty() => load_prompts(p),
        _ => Ok(SystemPrompts::default()),
    }
}
