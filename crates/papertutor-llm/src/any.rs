use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::azure::AzureOpenAiProvider;
use crate::compatible::CompatibleProvider;
#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::provider::{LlmProvider, Message};

/// Generates a match over all `AnyProvider` variants, binding the inner provider
/// and evaluating the given expression for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Gemini($p) => $expr,
            AnyProvider::Azure($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyProvider {
    Gemini(CompatibleProvider),
    Azure(AzureOpenAiProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl LlmProvider for AnyProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        delegate_provider!(self, |p| p.chat(messages).await)
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }

    async fn chat_typed<T>(&self, messages: &[Message]) -> Result<T, crate::LlmError>
    where
        T: DeserializeOwned + JsonSchema + Send + 'static,
        Self: Sized,
    {
        delegate_provider!(self, |p| p.chat_typed::<T>(messages).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatible::GEMINI_OPENAI_BASE_URL;

    fn gemini() -> AnyProvider {
        AnyProvider::Gemini(CompatibleProvider::new(
            "gemini".into(),
            "k".into(),
            GEMINI_OPENAI_BASE_URL.into(),
            "gemini-2.0-flash-exp".into(),
            1024,
            0.0,
        ))
    }

    fn azure() -> AnyProvider {
        AnyProvider::Azure(AzureOpenAiProvider::new(
            "https://acme.openai.azure.com",
            "dep".into(),
            "k".into(),
            "2024-08-01-preview",
            1024,
            0.0,
        ))
    }

    #[test]
    fn name_delegates() {
        assert_eq!(gemini().name(), "gemini");
        assert_eq!(azure().name(), "azure");
    }

    #[tokio::test]
    async fn chat_unreachable_propagates_error() {
        let p = AnyProvider::Gemini(CompatibleProvider::new(
            "gemini".into(),
            "k".into(),
            "http://127.0.0.1:1".into(),
            "m".into(),
            16,
            0.0,
        ));
        assert!(p.chat(&[Message::user("hi")]).await.is_err());
    }
}
