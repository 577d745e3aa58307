//! The end-to-end run: extract → truncate → title → sanitize → rename.

use std::path::Path;

use thiserror::Error;

use crate::backend::PdfBackend;
use crate::extract::{ContentExtractor, ExtractionError};
use crate::llm::{TitleError, TitleGenerator};
use crate::paths::{RenameOutcome, rename_to_title};
use crate::title::{clean_title, sanitize_filename};
use crate::truncate::{TRUNCATION_SUFFIX, truncate_content};
use crate::Config;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("PDF processing error: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("Title generation failed: {0}")]
    TitleGeneration(#[from] TitleError),
    #[error("Renaming failed: {0}")]
    Rename(#[source] std::io::Error),
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// The cleaned title, for display.
    pub title: String,
    pub rename: RenameOutcome,
}

/// Process one document.
///
/// Extraction failures of a single strategy are absorbed by the
/// [`ContentExtractor`]; everything that reaches this function's error path
/// is fatal for the run.
pub async fn run(
    path: &Path,
    config: &Config,
    standard: &dyn PdfBackend,
    ocr: &dyn PdfBackend,
    generator: &dyn TitleGenerator,
) -> Result<PipelineOutcome, PipelineError> {
    let content = ContentExtractor::new(standard, ocr).extract(path, &config.extraction())?;

    let content = truncate_content(&content, config.max_content_length, TRUNCATION_SUFFIX);
    tracing::info!(
        chars = content.chars().count(),
        model = %config.model,
        "sending content for title generation"
    );
    if config.verbose {
        tracing::debug!("content:\n{}", content);
    }

    let raw = generator.generate(&content).await?;
    let title = clean_title(&raw);
    tracing::debug!(raw = %raw, clean = %title, "title received");

    let file_stem = sanitize_filename(&title);
    let rename = rename_to_title(path, &file_stem).map_err(PipelineError::Rename)?;

    Ok(PipelineOutcome { title, rename })
}
