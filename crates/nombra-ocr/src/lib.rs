//! OCR extraction for scanned PDFs.
//!
//! Pages are rasterized with `pdftoppm` (poppler-utils) into a private
//! temporary directory and each image is recognized with `tesseract`. Both
//! executables must be on `PATH`; if either is missing the backend fails
//! rather than returning nothing.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use nombra_core::{BackendError, DEFAULT_OCR_DPI, PdfBackend};

const PDFTOPPM: &str = "pdftoppm";
const TESSERACT: &str = "tesseract";
const IMAGE_PREFIX: &str = "page";

/// [`PdfBackend`] that runs OCR over rendered page images.
#[derive(Debug, Clone)]
pub struct OcrBackend {
    dpi: u32,
    language: Option<String>,
}

impl Default for OcrBackend {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_OCR_DPI,
            language: None,
        }
    }
}

impl OcrBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendering resolution handed to `pdftoppm -r`.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    /// Tesseract language code(s) handed to `-l`, e.g. `"deu+eng"`.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }

    fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, BackendError> {
        let output = Command::new(PDFTOPPM)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf)
            .arg(out_dir.join(IMAGE_PREFIX))
            .output();
        check_output(PDFTOPPM, output)?;

        let mut images: Vec<(u32, PathBuf)> = std::fs::read_dir(out_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| page_number(&path).map(|n| (n, path)))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(BackendError::NoPages);
        }
        Ok(images.into_iter().map(|(_, path)| path).collect())
    }

    fn recognize(&self, image: &Path) -> Result<String, BackendError> {
        let mut cmd = Command::new(TESSERACT);
        cmd.arg(image).arg("stdout");
        if let Some(ref lang) = self.language {
            cmd.arg("-l").arg(lang);
        }
        let output = check_output(TESSERACT, cmd.output())?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl PdfBackend for OcrBackend {
    fn name(&self) -> &str {
        "OCR"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        if !path.is_file() {
            return Err(BackendError::OpenError(format!(
                "file not found: {}",
                path.display()
            )));
        }

        // Removed on drop, including every early return below.
        let temp_dir = tempfile::Builder::new()
            .prefix("nombra-ocr")
            .tempdir()
            .map_err(BackendError::TempDir)?;

        tracing::info!(dpi = self.dpi, "rasterizing pages for OCR");
        let images = self.rasterize(path, temp_dir.path())?;

        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            tracing::debug!(page = i + 1, total = images.len(), "running tesseract");
            let text = self.recognize(image)?;
            pages.push(text.trim_end().to_string());
        }

        let content = pages.join("\n");
        if content.trim().is_empty() {
            return Err(BackendError::NoText);
        }

        tracing::info!(
            pages = images.len(),
            chars = content.chars().count(),
            "OCR complete"
        );
        Ok(content)
    }
}

/// Turn a spawn result into `Output`, mapping a missing binary or a
/// non-zero exit into [`BackendError::ToolFailed`].
fn check_output(tool: &'static str, output: io::Result<Output>) -> Result<Output, BackendError> {
    let output = output.map_err(|e| BackendError::ToolFailed {
        tool,
        message: if e.kind() == io::ErrorKind::NotFound {
            format!("{tool} not found on PATH")
        } else {
            e.to_string()
        },
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(BackendError::ToolFailed {
            tool,
            message: format!("{} {}", output.status, stderr.trim()),
        });
    }
    if !stderr.trim().is_empty() {
        tracing::debug!(tool, stderr = %stderr.trim(), "tool diagnostics");
    }
    Ok(output)
}

/// Page number of a `page-<n>.png` image produced by pdftoppm.
///
/// pdftoppm zero-pads to the width of the page count, so the number is
/// parsed rather than relying on lexical order.
fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (prefix, number) = stem.rsplit_once('-')?;
    if prefix != IMAGE_PREFIX {
        return None;
    }
    number.parse().ok()
}
