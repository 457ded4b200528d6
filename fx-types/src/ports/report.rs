//! Report rendering port.

use crate::domain::StoredRate;
use fx_directory::ProviderCode;

/// Error type for report rendering.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Nothing to render for {0}")]
    Empty(ProviderCode),

    #[error("Render failed: {0}")]
    Render(String),
}

/// A rendered chart artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Port for chart renderers.
///
/// Rendering is CPU-only; callers own any offloading to a blocking pool.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, code: ProviderCode, rows: &[StoredRate]) -> Result<RenderedReport, ReportError>;
}
