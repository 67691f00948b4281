mod pdf;

pub use pdf::PdfLoader;

use std::path::Path;

use crate::{DocumentLoader, PaperContent};

/// Load a paper, turning any failure into "no content".
///
/// The reason is logged; callers treat `None` as "no document loaded yet".
pub async fn extract<L: DocumentLoader + ?Sized>(loader: &L, path: &Path) -> Option<PaperContent> {
    match loader.load(path).await {
        Ok(content) => {
            tracing::info!(
                source = content.source(),
                pages = content.page_count(),
                id = %content.id(),
                "paper extracted"
            );
            Some(content)
        }
        Err(e) => {
            tracing::warn!("failed to extract {}: {e}", path.display());
            None
        }
    }
}
