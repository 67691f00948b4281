use std::fmt;

/// Fixed instructions that precede the page text of every paper.
pub const PAPER_PREAMBLE: &str = "Here is the content of the paper you will be focusing on today.\n\
Please read the paper\n";

/// Identity of a document: BLAKE3 digest of its source bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(blake3::Hash);

impl DocumentId {
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.0.to_hex();
        f.write_str(&hex[..16])
    }
}

/// Extracted paper text. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperContent {
    text: String,
    id: DocumentId,
    source: String,
    page_count: usize,
}

impl PaperContent {
    /// Join pages with newlines behind [`PAPER_PREAMBLE`].
    #[must_use]
    pub fn from_pages<S: AsRef<str>>(pages: &[S], id: DocumentId, source: impl Into<String>) -> Self {
        Self {
            text: compose(pages),
            id,
            source: source.into(),
            page_count: pages.len(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

fn compose<S: AsRef<str>>(pages: &[S]) -> String {
    let body_len: usize = pages.iter().map(|p| p.as_ref().len() + 1).sum();
    let mut text = String::with_capacity(PAPER_PREAMBLE.len() + body_len + 1);
    text.push_str(PAPER_PREAMBLE);
    for page in pages {
        text.push('\n');
        text.push_str(page.as_ref());
    }
    text.push('\n');
    text
}
