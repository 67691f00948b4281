//! Paper tutoring core: outline inference, section slicing, replies, sessions and configuration.

pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod locator;
pub mod outline;
pub mod prompts;
pub mod responder;
pub mod session;

pub use locator::locate_section;
pub use outline::{Outline, OutlineSection, infer_outline};
pub use responder::ResponseGenerator;
pub use session::{PaperSession, SessionError, Transcript};
