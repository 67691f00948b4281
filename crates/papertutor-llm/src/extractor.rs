use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::LlmError;
use crate::provider::{LlmProvider, Message};

/// One-shot structured extraction from a single user turn.
pub struct Extractor<'a, P: LlmProvider> {
    provider: &'a P,
}

impl<'a, P: LlmProvider> Extractor<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// # Errors
    ///
    /// Returns an error if the provider fails or the response cannot be parsed.
    pub async fn extract<T>(&self, input: &str) -> Result<T, LlmError>
    where
        T: DeserializeOwned + JsonSchema + Send + 'static,
    {
        self.provider
            .chat_typed::<T>(&[Message::user(input)])
            .await
    }
}
