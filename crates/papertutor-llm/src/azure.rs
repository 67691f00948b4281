use std::fmt;
use std::time::Duration;

use crate::error::LlmError;
use crate::openai::{AuthScheme, OpenAiProvider};
use crate::provider::{LlmProvider, Message};

/// Model name sent in the request body; Azure routes by deployment, not by this field.
const AZURE_MODEL: &str = "gpt-4o";

/// Azure OpenAI chat completions for a single deployment.
pub struct AzureOpenAiProvider {
    inner: OpenAiProvider,
    deployment: String,
}

impl AzureOpenAiProvider {
    #[must_use]
    pub fn new(
        endpoint: &str,
        deployment: String,
        api_key: String,
        api_version: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        let endpoint = endpoint.trim_end_matches('/');
        let chat_url = format!(
            "{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={api_version}"
        );
        let inner = OpenAiProvider::new(
            api_key,
            endpoint.to_owned(),
            AZURE_MODEL.to_owned(),
            max_tokens,
            temperature,
        )
        .with_chat_url(chat_url, AuthScheme::ApiKeyHeader);
        Self { inner, deployment }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }

    #[must_use]
    pub fn deployment(&self) -> &str {
        &self.deployment
    }
}

impl fmt::Debug for AzureOpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiProvider")
            .field("deployment", &self.deployment)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl Clone for AzureOpenAiProvider {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            deployment: self.deployment.clone(),
        }
    }
}

impl LlmProvider for AzureOpenAiProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.inner.chat(messages).await
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "azure"
    }

    async fn chat_typed<T>(&self, messages: &[Message]) -> Result<T, LlmError>
    where
        T: serde::de::DeserializeOwned + schemars::JsonSchema + Send + 'static,
        Self: Sized,
    {
        self.inner.chat_typed(messages).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn debug_shows_deployment_not_key() {
        let p = AzureOpenAiProvider::new(
            "https://acme.openai.azure.com/",
            "gpt4o-prod".into(),
            "azure-secret".into(),
            "2024-08-01-preview",
            4096,
            0.0,
        );
        let debug = format!("{p:?}");
        assert!(debug.contains("gpt4o-prod"));
        assert!(!debug.contains("azure-secret"));
        assert_eq!(p.name(), "azure");
        assert_eq!(p.deployment(), "gpt4o-prod");
    }

    #[tokio::test]
    async fn chat_uses_deployment_url_and_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt4o-prod/chat/completions"))
            .and(query_param("api-version", "2024-08-01-preview"))
            .and(header("api-key", "azure-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "from azure"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let p = AzureOpenAiProvider::new(
            &server.uri(),
            "gpt4o-prod".into(),
            "azure-secret".into(),
            "2024-08-01-preview",
            4096,
            0.0,
        );
        let reply = p.chat(&[Message::user("hi")]).await.unwrap();
        assert_eq!(reply, "from azure");
    }
}
