//! LLM provider abstraction and the backends used to talk about papers.

pub mod any;
pub mod azure;
pub mod compatible;
pub mod error;
pub mod extractor;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod openai;
pub mod provider;

pub use error::LlmError;
pub use provider::LlmProvider;
