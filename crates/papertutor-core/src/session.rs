use std::path::Path;

use papertutor_document::{DocumentId, DocumentLoader, PaperContent, PdfLoader, extract};
use papertutor_llm::LlmError;
use papertutor_llm::provider::{LlmProvider, Message};

use crate::locator::locate_section;
use crate::outline::{Outline, infer_outline};
use crate::prompts;
use crate::responder::ResponseGenerator;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no document loaded")]
    NoDocument,
    #[error("'{0}' is not a section of the outline")]
    UnknownLabel(String),
    #[error("section '{0}' was not found in the paper text")]
    SectionNotFound(String),
    #[error("outline inference failed: {0}")]
    Llm(#[from] LlmError),
}

/// Conversation shown to the user. Only user and assistant turns are stored here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.0.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> &Message {
        self.0.push(Message::assistant(content));
        &self.0[self.0.len() - 1]
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// One user's tutoring session over a single paper.
///
/// Holds the loaded paper, its outline (inferred at most once per document) and the
/// transcript. Loading a different paper resets the outline and the transcript.
pub struct PaperSession<P: LlmProvider, L: DocumentLoader = PdfLoader> {
    provider: P,
    loader: L,
    language: String,
    content: Option<PaperContent>,
    outline: Option<(DocumentId, Outline)>,
    transcript: Transcript,
}

impl<P: LlmProvider, L: DocumentLoader> PaperSession<P, L> {
    pub fn new(provider: P, loader: L, language: impl Into<String>) -> Self {
        Self {
            provider,
            loader,
            language: language.into(),
            content: None,
            outline: None,
            transcript: Transcript::default(),
        }
    }

    /// Extract `path` and make it the current paper. Returns whether a paper is loaded.
    ///
    /// Reloading the same bytes keeps the outline and the transcript.
    pub async fn load(&mut self, path: &Path) -> bool {
        match extract(&self.loader, path).await {
            Some(content) => {
                self.set_content(content);
                true
            }
            None => {
                self.content = None;
                self.outline = None;
                self.transcript.clear();
                false
            }
        }
    }

    pub fn set_content(&mut self, content: PaperContent) {
        if self.content.as_ref().is_some_and(|c| c.id() == content.id()) {
            tracing::debug!(id = %content.id(), "same paper loaded again");
            return;
        }
        self.outline = None;
        self.transcript.clear();
        self.content = Some(content);
    }

    /// Switch models without losing the paper or the conversation.
    pub fn set_provider(&mut self, provider: P) {
        self.provider = provider;
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn content(&self) -> Option<&PaperContent> {
        self.content.as_ref()
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The paper's outline, inferred on first use.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoDocument`] without a paper, or the inference failure.
    /// A failed inference is not cached.
    pub async fn outline(&mut self) -> Result<&Outline, SessionError> {
        let content = self.content.as_ref().ok_or(SessionError::NoDocument)?;
        let cached = matches!(&self.outline, Some((id, _)) if *id == content.id());
        if !cached {
            let outline = infer_outline(&self.provider, content).await?;
            self.outline = Some((content.id(), outline));
        }
        self.outline
            .as_ref()
            .map(|(_, outline)| outline)
            .ok_or(SessionError::NoDocument)
    }

    /// Start a fresh conversation explaining the section named `label`.
    ///
    /// The transcript is cleared, then the explanation request (with the section text)
    /// becomes its first user turn and stays there for follow-up questions. It is not
    /// hidden after the reply arrives, so the request shows in the visible history.
    ///
    /// # Errors
    ///
    /// Fails without a paper, when the outline cannot be inferred, or when `label`
    /// cannot be located. The transcript is left untouched in those cases.
    pub async fn explain(&mut self, label: &str) -> Result<&str, SessionError> {
        let labels = self.outline().await?.labels();
        if !labels.iter().any(|l| l == label) {
            return Err(SessionError::UnknownLabel(label.to_owned()));
        }
        let content = self.content.as_ref().ok_or(SessionError::NoDocument)?;
        let section = locate_section(content.text(), label, &labels)
            .ok_or_else(|| SessionError::SectionNotFound(label.to_owned()))?;
        let request = prompts::explain_request(section, &self.language);

        self.transcript.clear();
        self.transcript.push_user(request);
        Ok(self.respond().await)
    }

    /// Add a question to the conversation and answer it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoDocument`] without a paper.
    pub async fn ask(&mut self, question: &str) -> Result<&str, SessionError> {
        if self.content.is_none() {
            return Err(SessionError::NoDocument);
        }
        self.transcript.push_user(question);
        Ok(self.respond().await)
    }

    /// Explain the abstract and introduction.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoDocument`] without a paper.
    pub async fn summarize(&mut self) -> Result<&str, SessionError> {
        let request = prompts::overview_request(&self.language);
        self.ask(&request).await
    }

    /// Outline rendered as Markdown headings.
    ///
    /// # Errors
    ///
    /// Same as [`Self::outline`].
    pub async fn structure_markdown(&mut self) -> Result<String, SessionError> {
        Ok(self.outline().await?.to_markdown())
    }

    async fn respond(&mut self) -> &str {
        let text = self.content.as_ref().map_or("", PaperContent::text);
        let reply = ResponseGenerator::new(&self.provider, prompts::system_prompt(&self.language))
            .generate(self.transcript.messages(), text)
            .await;
        &self.transcript.push_assistant(reply).content
    }
}
