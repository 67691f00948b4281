//! Application bootstrap: config resolution, credential lookup and provider construction.

use std::path::{Path, PathBuf};

use anyhow::Context;
use papertutor_document::PdfLoader;
use papertutor_llm::any::AnyProvider;
use papertutor_llm::azure::AzureOpenAiProvider;
use papertutor_llm::compatible::CompatibleProvider;

use crate::config::{AZURE_MODEL, Config, ConfigError, LlmConfig};
use crate::credentials::{Credential, CredentialSource, EnvCredentials, Secret, require};

/// Where chat requests go, decided once from the model name.
#[derive(Debug, Clone)]
pub enum ProviderSelection {
    /// A Gemini model behind Google's OpenAI-compatible endpoint.
    Standard { model: String, api_key: Secret },
    Azure {
        endpoint: String,
        deployment: String,
        api_key: Secret,
        api_version: String,
    },
}

impl ProviderSelection {
    /// Look up the credentials `model` needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownModel`] for names outside the available set and
    /// [`ConfigError::MissingCredentials`] naming every absent credential.
    pub fn resolve<S>(model: &str, source: &S) -> Result<Self, ConfigError>
    where
        S: CredentialSource + ?Sized,
    {
        if !crate::config::AVAILABLE_MODELS.contains(&model) {
            return Err(ConfigError::UnknownModel(model.to_owned()));
        }
        if model == AZURE_MODEL {
            let [endpoint, deployment, api_key, api_version] = require(source, Credential::AZURE)?;
            return Ok(Self::Azure {
                endpoint,
                deployment,
                api_key: Secret::new(api_key),
                api_version,
            });
        }
        let [api_key] = require(source, [Credential::GoogleApiKey])?;
        Ok(Self::Standard {
            model: model.to_owned(),
            api_key: Secret::new(api_key),
        })
    }

    #[must_use]
    pub fn build(&self, llm: &LlmConfig) -> AnyProvider {
        let timeout = llm.request_timeout();
        match self {
            Self::Standard { model, api_key } => AnyProvider::Gemini(
                CompatibleProvider::new(
                    "gemini".into(),
                    api_key.expose().to_owned(),
                    llm.base_url.clone(),
                    model.clone(),
                    llm.max_tokens,
                    llm.temperature,
                )
                .with_timeout(timeout),
            ),
            Self::Azure {
                endpoint,
                deployment,
                api_key,
                api_version,
            } => AnyProvider::Azure(
                AzureOpenAiProvider::new(
                    endpoint,
                    deployment.clone(),
                    api_key.expose().to_owned(),
                    api_version,
                    llm.max_tokens,
                    llm.temperature,
                )
                .with_timeout(timeout),
            ),
        }
    }
}

pub struct AppBuilder {
    config: Config,
    credentials: Box<dyn CredentialSource>,
}

impl AppBuilder {
    /// Load and validate config from `path`, reading credentials from the environment.
    ///
    /// `model` overrides the configured model name.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be read, parsed or validated.
    pub fn load(path: PathBuf, model: Option<&str>) -> anyhow::Result<Self> {
        let mut config = Config::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        if let Some(model) = model {
            config.llm.model = model.to_owned();
        }
        config.validate().context("invalid configuration")?;
        tracing::debug!(path = %path.display(), model = %config.llm.model, "config loaded");
        Ok(Self {
            config,
            credentials: Box::new(EnvCredentials),
        })
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Box<dyn CredentialSource>) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// # Errors
    ///
    /// Returns an error when a credential for the selected model is missing.
    pub fn build_provider(&self) -> anyhow::Result<AnyProvider> {
        let model = &self.config.llm.model;
        let selection = ProviderSelection::resolve(model, self.credentials.as_ref())
            .with_context(|| format!("cannot use model '{model}'"))?;
        let provider = selection.build(&self.config.llm);
        tracing::info!(%model, "provider ready");
        Ok(provider)
    }

    #[must_use]
    pub fn build_loader(&self) -> PdfLoader {
        PdfLoader::new(self.config.document.max_file_size)
    }
}

/// Priority: CLI `--config` > `PAPERTUTOR_CONFIG` env > `config/default.toml`.
#[must_use]
pub fn resolve_config_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("PAPERTUTOR_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

#[cfg(test)]
mod tests {
    use papertutor_llm::provider::LlmProvider;
    use serial_test::serial;

    use super::*;
    use crate::credentials::StaticCredentials;

    #[test]
    fn standard_model_uses_google_key() {
        let source = StaticCredentials::default().with(Credential::GoogleApiKey, "g-key");
        let selection = ProviderSelection::resolve("gemini-2.0-flash-exp", &source).unwrap();
        match &selection {
            ProviderSelection::Standard { model, api_key } => {
                assert_eq!(model, "gemini-2.0-flash-exp");
                assert_eq!(api_key.expose(), "g-key");
            }
            ProviderSelection::Azure { .. } => panic!("expected standard selection"),
        }

        let provider = selection.build(&LlmConfig::default());
        assert!(matches!(provider, AnyProvider::Gemini(_)));
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn standard_model_without_key_fails_fast() {
        let source = StaticCredentials::default();
        let err = ProviderSelection::resolve("learnlm-1.5-pro-experimental", &source).unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::MissingCredentials(missing) if missing == &[Credential::GoogleApiKey]
        ));
        assert_eq!(err.to_string(), "missing environment variables: GOOGLE_API_KEY");
    }

    #[test]
    fn azure_reads_all_four_values() {
        let source = StaticCredentials::azure();
        let selection = ProviderSelection::resolve(AZURE_MODEL, &source).unwrap();
        let ProviderSelection::Azure {
            endpoint,
            deployment,
            api_key,
            api_version,
        } = &selection
        else {
            panic!("expected azure selection");
        };
        assert_eq!(endpoint, "https://example.openai.azure.com/");
        assert_eq!(deployment, "gpt4o-prod");
        assert_eq!(api_key.expose(), "az-key");
        assert_eq!(api_version, "2024-06-01");

        let provider = selection.build(&LlmConfig::default());
        assert_eq!(provider.name(), "azure");
    }

    #[test]
    fn azure_reports_every_missing_value() {
        let source = StaticCredentials::default().with(Credential::AzureDeployment, "gpt4o-prod");
        let err = ProviderSelection::resolve(AZURE_MODEL, &source).unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::MissingCredentials(missing) if missing == &[
                Credential::AzureEndpoint,
                Credential::AzureApiKey,
                Credential::AzureApiVersion,
            ]
        ));
        let message = err.to_string();
        assert!(message.contains("AZ_OPENAI_API_BASE"));
        assert!(message.contains("AZ_OPENAI_API_KEY"));
        assert!(message.contains("AZ_OPENAI_API_VERSION"));
        assert!(!message.contains("AZ_OPENAI_LLM_4_O"));
    }

    #[test]
    fn azure_does_not_need_google_key() {
        let source = StaticCredentials::azure();
        let selection = ProviderSelection::resolve(AZURE_MODEL, &source).unwrap();
        assert!(matches!(selection, ProviderSelection::Azure { .. }));
    }

    #[test]
    fn unknown_model_rejected_before_credential_lookup() {
        let err = ProviderSelection::resolve("gpt-5", &StaticCredentials::default()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModel(ref m) if m == "gpt-5"));
    }

    #[test]
    fn selection_debug_hides_key() {
        let selection = ProviderSelection::Standard {
            model: "gemini-2.0-flash-exp".into(),
            api_key: Secret::new("very-secret"),
        };
        let debug = format!("{selection:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("gemini-2.0-flash-exp"));
    }

    #[test]
    #[serial]
    fn app_builder_applies_model_override() {
        let dir = tempfile::tempdir().unwrap();
        let builder = AppBuilder::load(dir.path().join("none.toml"), Some(AZURE_MODEL))
            .unwrap()
            .with_credentials(Box::new(StaticCredentials::azure()));
        assert_eq!(builder.config().llm.model, AZURE_MODEL);
        let provider = builder.build_provider().unwrap();
        assert!(matches!(provider, AnyProvider::Azure(_)));
    }

    #[test]
    #[serial]
    fn app_builder_missing_credentials_name_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let builder = AppBuilder::load(dir.path().join("none.toml"), Some(AZURE_MODEL))
            .unwrap()
            .with_credentials(Box::new(StaticCredentials::default()));
        let err = builder.build_provider().unwrap_err();
        assert_eq!(err.to_string(), "cannot use model 'azure'");
        assert!(format!("{err:#}").contains("AZ_OPENAI_API_BASE"));
    }

    #[test]
    #[serial]
    fn app_builder_rejects_unknown_model_override() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppBuilder::load(dir.path().join("none.toml"), Some("nope")).is_err());
    }

    #[test]
    #[serial]
    fn app_builder_loader_uses_configured_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(&path, "[document]\nmax_file_size = 77\n").unwrap();
        let builder = AppBuilder::load(path, None).unwrap();
        assert_eq!(builder.build_loader().max_file_size, 77);
    }

    #[test]
    fn config_path_cli_wins() {
        let path = resolve_config_path(Some(Path::new("/tmp/custom.toml")));
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    #[serial]
    fn config_path_env_then_default() {
        unsafe { std::env::set_var("PAPERTUTOR_CONFIG", "/etc/papertutor.toml") };
        assert_eq!(resolve_config_path(None), PathBuf::from("/etc/papertutor.toml"));
        unsafe { std::env::remove_var("PAPERTUTOR_CONFIG") };
        assert_eq!(resolve_config_path(None), PathBuf::from("config/default.toml"));
    }
}
