mod env;
mod types;


pub use types::*;

use std::path::Path;

use crate::credentials::Credential;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown model '{0}', expected one of: {models}", models = AVAILABLE_MODELS.join(", "))]
    UnknownModel(String),
    #[error("{0} must be greater than 0")]
    ZeroLimit(&'static str),
    #[error("tutor.language must not be empty")]
    EmptyLanguage,
    #[error("missing environment variables: {}", crate::credentials::env_list(.0))]
    MissingCredentials(Vec<Credential>),
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<Self>(&content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !AVAILABLE_MODELS.contains(&self.llm.model.as_str()) {
            return Err(ConfigError::UnknownModel(self.llm.model.clone()));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::ZeroLimit("llm.max_tokens"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::ZeroLimit("llm.timeout_secs"));
        }
        if self.document.max_file_size == 0 {
            return Err(ConfigError::ZeroLimit("document.max_file_size"));
        }
        if self.tutor.language.trim().is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        Ok(())
    }
}
