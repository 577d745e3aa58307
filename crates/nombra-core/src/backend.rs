use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("PDF appears to be empty")]
    EmptyDocument,
    #[error("page {page} text extraction failed: {message}")]
    PageError { page: usize, message: String },
    #[error("no extractable text found in PDF")]
    NoText,
    #[error("failed to create temp directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: &'static str, message: String },
    #[error("no pages converted from PDF")]
    NoPages,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide one way of turning a document into plain text
/// (direct text-layer extraction, OCR, ...). Choosing between them and
/// validating what they return is the job of
/// [`ContentExtractor`](crate::extract::ContentExtractor).
pub trait PdfBackend: Send + Sync {
    /// Short human-readable name used in logs (e.g. "standard", "OCR").
    fn name(&self) -> &str;

    /// Extract the full text content of a PDF file.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}
