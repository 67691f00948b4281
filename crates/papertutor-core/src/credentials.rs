//! Model backend credentials: which ones exist, where they come from, and what is missing.

use std::fmt;

use crate::config::ConfigError;

/// A value the tutor needs from its environment to reach a model backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Credential {
    GoogleApiKey,
    AzureEndpoint,
    AzureDeployment,
    AzureApiKey,
    AzureApiVersion,
}

impl Credential {
    /// Everything the `azure` model needs, in lookup order.
    pub const AZURE: [Self; 4] = [
        Self::AzureEndpoint,
        Self::AzureDeployment,
        Self::AzureApiKey,
        Self::AzureApiVersion,
    ];

    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::GoogleApiKey => "GOOGLE_API_KEY",
            Self::AzureEndpoint => "AZ_OPENAI_API_BASE",
            Self::AzureDeployment => "AZ_OPENAI_LLM_4_O",
            Self::AzureApiKey => "AZ_OPENAI_API_KEY",
            Self::AzureApiVersion => "AZ_OPENAI_API_VERSION",
        }
    }

    /// API keys; endpoint, deployment and version are safe to log.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::GoogleApiKey | Self::AzureApiKey)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_var())
    }
}

pub(crate) fn env_list(credentials: &[Credential]) -> String {
    credentials
        .iter()
        .map(|c| c.env_var())
        .collect::<Vec<_>>()
        .join(", ")
}

/// An API key. Never shows up in `Debug` output.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes>)", self.0.len())
    }
}

/// Where credential values come from.
pub trait CredentialSource: Send + Sync {
    /// The value of `credential`, or `None` when it is unset or empty.
    fn lookup(&self, credential: Credential) -> Option<String>;
}

/// Reads credentials from their environment variables.
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn lookup(&self, credential: Credential) -> Option<String> {
        std::env::var(credential.env_var())
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

/// Values of all `credentials`, in order.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredentials`] listing every absent one, so a partly
/// configured Azure setup is reported in a single message.
pub fn require<S, const N: usize>(
    source: &S,
    credentials: [Credential; N],
) -> Result<[String; N], ConfigError>
where
    S: CredentialSource + ?Sized,
{
    let values = credentials.map(|c| source.lookup(c));
    let missing: Vec<Credential> = credentials
        .iter()
        .zip(&values)
        .filter(|(_, v)| v.is_none())
        .map(|(c, _)| *c)
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingCredentials(missing));
    }
    for (credential, value) in credentials.iter().zip(&values) {
        if !credential.is_secret() {
            tracing::debug!(%credential, value = value.as_deref().unwrap_or_default(), "credential resolved");
        }
    }
    Ok(values.map(Option::unwrap_or_default))
}

/// Fixed credential values for tests.
#[cfg(test)]
#[derive(Default)]
pub struct StaticCredentials(std::collections::HashMap<Credential, String>);

#[cfg(test)]
impl StaticCredentials {
    #[must_use]
    pub fn with(mut self, credential: Credential, value: &str) -> Self {
        self.0.insert(credential, value.to_owned());
        self
    }

    #[must_use]
    pub fn azure() -> Self {
        Self::default()
            .with(Credential::AzureEndpoint, "https://example.openai.azure.com/")
            .with(Credential::AzureDeployment, "gpt4o-prod")
            .with(Credential::AzureApiKey, "az-key")
            .with(Credential::AzureApiVersion, "2024-06-01")
    }
}

#[cfg(test)]
impl CredentialSource for StaticCredentials {
    fn lookup(&self, credential: Credential) -> Option<String> {
        self.0.get(&credential).cloned()
    }
}
