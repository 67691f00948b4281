use papertutor_llm::provider::{LlmProvider, Message};

/// Produces one tutoring reply for a transcript, attaching the paper as context.
///
/// The request is built fresh for every call: the system instruction, the caller's
/// transcript, then the paper text as a final user turn. The transcript itself is
/// never modified.
pub struct ResponseGenerator<'a, P: LlmProvider> {
    provider: &'a P,
    system_prompt: String,
}

impl<'a, P: LlmProvider> ResponseGenerator<'a, P> {
    pub fn new(provider: &'a P, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
        }
    }

    /// Ask for a reply. If the call with the paper attached fails, retry once without it.
    ///
    /// Always returns displayable text: either the reply, or an error description when
    /// the retry fails too.
    pub async fn generate(&self, transcript: &[Message], document: &str) -> String {
        let mut request = Vec::with_capacity(transcript.len() + 2);
        request.push(Message::system(self.system_prompt.as_str()));
        request.extend_from_slice(transcript);
        request.push(Message::user(document));

        let first = match self.provider.chat(&request).await {
            Ok(reply) => return reply,
            Err(e) => e,
        };

        tracing::warn!(
            provider = self.provider.name(),
            "reply with full paper failed ({first}), retrying with transcript only"
        );
        request.pop();

        match self.provider.chat(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(provider = self.provider.name(), "reply retry failed: {e}");
                format!("{} returned an error: {e}", self.provider.name())
            }
        }
    }
}
