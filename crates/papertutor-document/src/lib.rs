//! Turning a paper file into the text blob the tutor works on.

pub mod error;
pub mod loader;
pub mod types;

pub use error::DocumentError;
pub use loader::{PdfLoader, extract};
pub use types::{DocumentId, PaperContent};

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<PaperContent, DocumentError>> + Send + '_>>;
}
