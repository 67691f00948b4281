use std::time::Duration;

use serde::{Deserialize, Serialize};

use papertutor_document::DEFAULT_MAX_FILE_SIZE;
use papertutor_llm::compatible::GEMINI_OPENAI_BASE_URL;

/// Model names offered for selection. All but [`AZURE_MODEL`] are served by Gemini.
pub const AVAILABLE_MODELS: [&str; 4] = [
    "gemini-2.0-flash-thinking-exp-01-21",
    "learnlm-1.5-pro-experimental",
    "gemini-2.0-flash-exp",
    AZURE_MODEL,
];

/// Selecting this name routes requests to Azure OpenAI.
pub const AZURE_MODEL: &str = "azure";

pub const DEFAULT_MODEL: &str = "learnlm-1.5-pro-experimental";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub tutor: TutorConfig,
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_base_url() -> String {
    GEMINI_OPENAI_BASE_URL.into()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Gemini OpenAI-compatible endpoint; unused for Azure.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Per-request HTTP timeout for the chat backend.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_language() -> String {
    "Hebrew".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TutorConfig {
    /// Language explanations are written in.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}
