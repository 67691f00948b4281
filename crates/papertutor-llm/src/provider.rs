use std::any::TypeId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, OnceLock};

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

pub trait LlmProvider: Send + Sync {
    /// Send messages to the LLM and return the assistant response.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to communicate or the response is invalid.
    fn chat(&self, messages: &[Message]) -> impl Future<Output = Result<String, LlmError>> + Send;

    fn name(&self) -> &str;

    /// Ask for a reply conforming to the JSON schema of `T` and deserialize it.
    ///
    /// The default appends schema format instructions to the conversation and parses
    /// the plain-text reply, accepting a fenced ```json block.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails or the reply does not match the schema.
    fn chat_typed<T>(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<T, LlmError>> + Send
    where
        T: DeserializeOwned + JsonSchema + Send + 'static,
        Self: Sized,
    {
        async move {
            let request = with_format_instructions::<T>(messages)?;
            let raw = self.chat(&request).await?;
            parse_structured::<T>(&raw)
        }
    }
}

type SchemaCache = Mutex<HashMap<TypeId, (serde_json::Value, String)>>;

static SCHEMA_CACHE: OnceLock<SchemaCache> = OnceLock::new();

/// JSON schema of `T` as a value and as pretty-printed text, generated once per type.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn cached_schema<T: JsonSchema + 'static>() -> Result<(serde_json::Value, String), LlmError> {
    let cache = SCHEMA_CACHE.get_or_init(Mutex::default);
    let mut guard = cache
        .lock()
        .map_err(|_| LlmError::Other("schema cache poisoned".into()))?;
    if let Some(entry) = guard.get(&TypeId::of::<T>()) {
        return Ok(entry.clone());
    }
    let schema = schemars::schema_for!(T);
    let value = serde_json::to_value(&schema)?;
    let text = serde_json::to_string_pretty(&value)?;
    guard.insert(TypeId::of::<T>(), (value.clone(), text.clone()));
    Ok((value, text))
}

#[must_use]
pub fn format_instructions(schema: &str) -> String {
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\
         Reply with the JSON instance only.\n\n\
         Here is the output schema:\n```\n{schema}\n```"
    )
}

/// Copy `messages` and append schema format instructions for `T` as a final user turn.
///
/// # Errors
///
/// Returns an error if the schema cannot be generated.
pub fn with_format_instructions<T: JsonSchema + 'static>(
    messages: &[Message],
) -> Result<Vec<Message>, LlmError> {
    let (_, schema) = cached_schema::<T>()?;
    let mut request = messages.to_vec();
    request.push(Message::user(format_instructions(&schema)));
    Ok(request)
}

/// Deserialize a model reply, tolerating markdown fences and surrounding prose.
///
/// # Errors
///
/// Returns [`LlmError::StructuredParse`] if no JSON object in the reply matches `T`.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    let body = strip_fences(raw.trim());
    match serde_json::from_str::<T>(body) {
        Ok(value) => Ok(value),
        Err(first) => {
            let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
                return Err(LlmError::StructuredParse(first.to_string()));
            };
            if end < start {
                return Err(LlmError::StructuredParse(first.to_string()));
            }
            serde_json::from_str::<T>(&body[start..=end])
                .map_err(|e| LlmError::StructuredParse(e.to_string()))
        }
    }
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
