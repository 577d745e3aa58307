use std::path::Path;

use mupdf::{Document, TextPageFlags};

use nombra_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`] reading the text layer.
///
/// This crate isolates the mupdf dependency (AGPL-3.0) so the rest of the
/// workspace does not transitively depend on it.
///
/// Each page is trimmed; pages with no text are skipped and the rest are
/// joined with a newline.
#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn name(&self) -> &str {
        "standard"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let page_count = document
            .page_count()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        if page_count == 0 {
            return Err(BackendError::EmptyDocument);
        }

        let mut pages_text = Vec::new();

        let pages = document
            .pages()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        for (index, page_result) in pages.enumerate() {
            let page_no = index + 1;
            let page_error = |e: mupdf::Error| BackendError::PageError {
                page: page_no,
                message: e.to_string(),
            };

            let page = page_result.map_err(page_error)?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(page_error)?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }

            let page_text = page_text.trim();
            if page_text.is_empty() {
                tracing::debug!(page = page_no, "page has no text layer");
                continue;
            }
            pages_text.push(page_text.to_string());
        }

        if pages_text.is_empty() {
            return Err(BackendError::NoText);
        }

        tracing::debug!(
            pages = page_count,
            pages_with_text = pages_text.len(),
            "extracted text layer"
        );

        Ok(expand_ligatures(&pages_text.join("\n")))
    }
}

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}
