use std::collections::BTreeMap;
use std::fmt;

use papertutor_document::PaperContent;
use papertutor_llm::LlmError;
use papertutor_llm::extractor::Extractor;
use papertutor_llm::provider::LlmProvider;
use schemars::JsonSchema;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::prompts;

/// A main section and its subsection titles, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineSection {
    pub title: String,
    pub subsections: Vec<String>,
}

/// Inferred section outline of a paper. Section order is document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Outline {
    /// Ordered dictionary mapping main section titles to lists of their subsections.
    /// For example: {"Introduction": ["1.1 Background", "1.2 Related Work"],
    /// "Methods": ["2.1 Data Collection", "2.2 Analysis"]}
    #[serde(serialize_with = "serialize_sections", deserialize_with = "deserialize_sections")]
    #[schemars(with = "BTreeMap<String, Vec<String>>")]
    sections: Vec<OutlineSection>,
}

impl Outline {
    pub fn from_sections<T, S>(sections: impl IntoIterator<Item = (T, Vec<S>)>) -> Self
    where
        T: Into<String>,
        S: Into<String>,
    {
        let mut outline = Self::default();
        for (title, subsections) in sections {
            outline.push(title.into(), subsections.into_iter().map(Into::into).collect());
        }
        outline
    }

    /// Duplicate titles merge into the first entry.
    fn push(&mut self, title: String, subsections: Vec<String>) {
        if let Some(existing) = self.sections.iter_mut().find(|s| s.title == title) {
            existing.subsections.extend(subsections);
        } else {
            self.sections.push(OutlineSection { title, subsections });
        }
    }

    #[must_use]
    pub fn sections(&self) -> &[OutlineSection] {
        &self.sections
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Flattened boundary labels: each section title followed by its subsections.
    ///
    /// A subsection identical to its own section title is not repeated.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        for section in &self.sections {
            labels.push(section.title.clone());
            labels.extend(
                section
                    .subsections
                    .iter()
                    .filter(|sub| **sub != section.title)
                    .cloned(),
            );
        }
        labels
    }

    /// Selectable entries per section. A section without subsections offers itself.
    #[must_use]
    pub fn navigation(&self) -> Vec<(&str, Vec<&str>)> {
        self.sections
            .iter()
            .map(|s| {
                let entries = if s.subsections.is_empty() {
                    vec![s.title.as_str()]
                } else {
                    s.subsections.iter().map(String::as_str).collect()
                };
                (s.title.as_str(), entries)
            })
            .collect()
    }

    /// Render as `## Section` headings, each subsection on its own line.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str("## ");
            out.push_str(&section.title);
            out.push('\n');
            for sub in &section.subsections {
                out.push('\n');
                out.push_str(sub);
                out.push('\n');
            }
        }
        out
    }
}

/// Ask the model for the paper's outline. One call, no retry.
///
/// # Errors
///
/// Returns an error if the provider fails or the reply does not match the outline schema.
pub async fn infer_outline<P: LlmProvider>(
    provider: &P,
    content: &PaperContent,
) -> Result<Outline, LlmError> {
    let request = prompts::outline_request(content.text());
    let outline: Outline = Extractor::new(provider).extract(&request).await?;
    tracing::info!(
        id = %content.id(),
        sections = outline.len(),
        provider = provider.name(),
        "outline inferred"
    );
    Ok(outline)
}

fn serialize_sections<S: Serializer>(
    sections: &[OutlineSection],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(sections.iter().map(|s| (&s.title, &s.subsections)))
}

fn deserialize_sections<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<OutlineSection>, D::Error> {
    struct SectionsVisitor;

    impl<'de> Visitor<'de> for SectionsVisitor {
        type Value = Vec<OutlineSection>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of section titles to lists of subsection titles")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut outline = Outline::default();
            while let Some((title, subsections)) = map.next_entry::<String, Vec<String>>()? {
                outline.push(title, subsections);
            }
            Ok(outline.sections)
        }
    }

    deserializer.deserialize_map(SectionsVisitor)
}

#[cfg(test)]
mod tests {
    use papertutor_document::DocumentId;
    use papertutor_llm::compatible::CompatibleProvider;
    use papertutor_llm::mock::MockProvider;
    use papertutor_llm::provider::Role;

    use super::*;

    fn sample() -> Outline {
        Outline::from_sections([
            ("Introduction", vec!["1.1 Background", "1.2 Related Work"]),
            ("Methods", vec![]),
        ])
    }

    fn content(text: &str) -> PaperContent {
        PaperContent::from_pages(&[text], DocumentId::of_bytes(text.as_bytes()), "t.pdf")
    }

    #[test]
    fn deserialize_preserves_document_order() {
        let json = r#"{"sections": {"Zeta": [], "Alpha": ["A.1"], "Mid": ["M.1", "M.2"]}}"#;
        let outline: Outline = serde_json::from_str(json).unwrap();
        let titles: Vec<_> = outline.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn serialize_round_trips_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"sections":{"Introduction":["1.1 Background","1.2 Related Work"],"Methods":[]}}"#
        );
    }

    #[test]
    fn duplicate_titles_merge() {
        let json = r#"{"sections": {"A": ["a1"], "A": ["a2"]}}"#;
        let outline: Outline = serde_json::from_str(json).unwrap();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline.sections()[0].subsections, ["a1", "a2"]);
    }

    #[test]
    fn wrong_shape_is_rejected() {
        assert!(serde_json::from_str::<Outline>(r#"{"sections": ["a", "b"]}"#).is_err());
        assert!(serde_json::from_str::<Outline>(r#"{"sections": {"A": "a1"}}"#).is_err());
    }

    #[test]
    fn empty_subsections_navigate_to_section_itself() {
        let outline = sample();
        let nav = outline.navigation();
        assert_eq!(nav[0], ("Introduction", vec!["1.1 Background", "1.2 Related Work"]));
        assert_eq!(nav[1], ("Methods", vec!["Methods"]));
    }

    #[test]
    fn labels_flatten_sections_then_subsections() {
        assert_eq!(
            sample().labels(),
            ["Introduction", "1.1 Background", "1.2 Related Work", "Methods"]
        );
    }

    #[test]
    fn labels_skip_subsection_equal_to_title() {
        let outline = Outline::from_sections([("Methods", vec!["Methods"])]);
        assert_eq!(outline.labels(), ["Methods"]);
    }

    #[test]
    fn markdown_lists_sections_and_subsections() {
        assert_eq!(
            sample().to_markdown(),
            "## Introduction\n\n1.1 Background\n\n1.2 Related Work\n## Methods\n"
        );
    }

    #[test]
    fn schema_describes_string_to_list_map() {
        let (schema, _) = papertutor_llm::provider::cached_schema::<Outline>().unwrap();
        let sections = &schema["properties"]["sections"];
        assert_eq!(sections["type"], "object");
        assert_eq!(sections["additionalProperties"]["type"], "array");
    }

    #[tokio::test]
    async fn infer_outline_parses_model_reply() {
        let provider = MockProvider::with_responses(vec![
            "```json\n{\"sections\": {\"1 INTRODUCTION\": [], \"2 RELATED WORK\": [\"2.1 Evaluating\"]}}\n```"
                .into(),
        ]);
        let outline = infer_outline(&provider, &content("1 INTRODUCTION ...")).await.unwrap();
        assert_eq!(outline.labels(), ["1 INTRODUCTION", "2 RELATED WORK", "2.1 Evaluating"]);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0][0].role, Role::User);
        assert!(requests[0][0].content.contains("1 INTRODUCTION ..."));
    }

    #[tokio::test]
    async fn infer_outline_propagates_provider_failure() {
        let provider = MockProvider::failing();
        let result = infer_outline(&provider, &content("x")).await;
        assert!(result.is_err());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn infer_outline_schema_mismatch_is_error() {
        let provider = MockProvider::with_responses(vec!["{\"sections\": 3}".into()]);
        let result = infer_outline(&provider, &content("x")).await;
        assert!(matches!(result, Err(LlmError::StructuredParse(_))));
    }

    async fn rate_limited_server() -> wiremock::MockServer {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        server
    }

    fn gemini(server: &wiremock::MockServer) -> CompatibleProvider {
        CompatibleProvider::new(
            "gemini".into(),
            "key".into(),
            server.uri(),
            "gemini-2.0-flash-exp".into(),
            128,
            0.0,
        )
    }

    #[tokio::test]
    async fn rate_limited_outline_sends_one_request() {
        let server = rate_limited_server().await;
        let result = infer_outline(&gemini(&server), &content("1 INTRODUCTION")).await;
        assert!(matches!(result, Err(LlmError::RateLimited)));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
