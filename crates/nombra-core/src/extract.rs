//! Choosing between extraction strategies and validating their output.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::backend::{BackendError, PdfBackend};

/// Direct-extraction output longer than this with no inline whitespace is
/// treated as garbage (broken font encodings, binary streams).
pub const GARBLED_TEXT_THRESHOLD: usize = 500;

/// Default minimum number of non-whitespace-trimmed characters required.
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 10;

/// One way of getting text out of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Standard,
    Ocr,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Standard => write!(f, "standard"),
            Strategy::Ocr => write!(f, "OCR"),
        }
    }
}

/// Why a single strategy was discarded.
#[derive(Error, Debug)]
pub enum StrategyFailure {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(
        "extracted content length ({actual}) is below minimum required length ({minimum})"
    )]
    TooShort { actual: usize, minimum: usize },
    #[error("text extraction failed: no spaces found in {length} characters of extracted text")]
    Garbled { length: usize },
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The only strategy that was allowed to run failed.
    #[error("{strategy} extraction failed: {source}")]
    Strategy {
        strategy: Strategy,
        #[source]
        source: StrategyFailure,
    },
    #[error("all text extraction methods failed: {last}")]
    AllFailed { last: StrategyFailure },
    #[error("no text could be extracted from the PDF")]
    NoText,
}

/// Settings the orchestrator reads; built once from [`Config`](crate::Config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionConfig {
    pub min_content_length: usize,
    pub force_ocr: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            force_ocr: false,
        }
    }
}

/// Reject content whose trimmed length is under `minimum` characters.
pub fn validate_content_length(content: &str, minimum: usize) -> Result<(), StrategyFailure> {
    let actual = content.trim().chars().count();
    if actual < minimum {
        return Err(StrategyFailure::TooShort { actual, minimum });
    }
    Ok(())
}

/// True for long text with no spaces or tabs anywhere.
///
/// Line breaks are ignored: backends insert them between lines and pages,
/// so a single garbled run per line would otherwise slip through.
pub fn looks_garbled(text: &str) -> bool {
    let length = text.chars().count();
    length > GARBLED_TEXT_THRESHOLD
        && !text
            .chars()
            .any(|c| c.is_whitespace() && c != '\n' && c != '\r')
}

/// Runs extraction strategies in order until one yields usable text.
///
/// Without `force_ocr` the standard backend goes first and OCR is the
/// fallback. A strategy that errors, returns text below the minimum length,
/// or (standard only) returns garbled text is skipped, and the next one is
/// tried. With `force_ocr` only OCR runs and its failure is final.
pub struct ContentExtractor<'a> {
    strategies: Vec<(Strategy, &'a dyn PdfBackend)>,
    ocr: &'a dyn PdfBackend,
}

impl<'a> ContentExtractor<'a> {
    pub fn new(standard: &'a dyn PdfBackend, ocr: &'a dyn PdfBackend) -> Self {
        Self {
            strategies: vec![(Strategy::Standard, standard), (Strategy::Ocr, ocr)],
            ocr,
        }
    }

    pub fn extract(&self, path: &Path, config: &ExtractionConfig) -> Result<String, ExtractionError> {
        if config.force_ocr {
            tracing::debug!(backend = self.ocr.name(), "OCR forced, skipping standard extraction");
            return self
                .attempt(Strategy::Ocr, self.ocr, path, config)
                .and_then(|text| {
                    // Empty OCR output without an error still fails validation.
                    if text.is_empty() {
                        Err(StrategyFailure::TooShort {
                            actual: 0,
                            minimum: config.min_content_length,
                        })
                    } else {
                        Ok(text)
                    }
                })
                .map_err(|source| ExtractionError::Strategy {
                    strategy: Strategy::Ocr,
                    source,
                });
        }

        let mut last_failure: Option<StrategyFailure> = None;

        for &(strategy, backend) in &self.strategies {
            match self.attempt(strategy, backend, path, config) {
                Ok(text) if text.is_empty() => {
                    tracing::warn!(%strategy, "extraction returned no text, trying next method");
                }
                Ok(text) => {
                    tracing::info!(%strategy, chars = text.chars().count(), "text extracted");
                    return Ok(text);
                }
                Err(failure) => {
                    tracing::warn!(%strategy, error = %failure, "extraction failed, trying next method");
                    last_failure = Some(failure);
                }
            }
        }

        match last_failure {
            Some(last) => Err(ExtractionError::AllFailed { last }),
            None => Err(ExtractionError::NoText),
        }
    }

    /// Run one strategy. `Ok("")` means "nothing found, no error".
    fn attempt(
        &self,
        strategy: Strategy,
        backend: &dyn PdfBackend,
        path: &Path,
        config: &ExtractionConfig,
    ) -> Result<String, StrategyFailure> {
        tracing::debug!(%strategy, backend = backend.name(), "attempting text extraction");

        let text = backend.extract_text(path)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }

        if strategy == Strategy::Standard && looks_garbled(text) {
            return Err(StrategyFailure::Garbled {
                length: text.chars().count(),
            });
        }

        validate_content_length(text, config.min_content_length)?;
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockResponse};

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    const GOOD_TEXT: &str = "Invoice 2024-03 from ACME Corp to John Doe";

    #[test]
    fn standard_success_skips_ocr() {
        let standard = MockBackend::new("standard", MockResponse::Text(GOOD_TEXT.into()));
        let ocr = MockBackend::new("ocr", MockResponse::Text("ocr text here".into()));

        let text = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config())
            .unwrap();

        assert_eq!(text, GOOD_TEXT);
        assert_eq!(standard.call_count(), 1);
        assert_eq!(ocr.call_count(), 0);
    }

    #[test]
    fn standard_error_falls_back_to_ocr() {
        let standard = MockBackend::new("standard", MockResponse::Error("bad xref".into()));
        let ocr = MockBackend::new("ocr", MockResponse::Text(GOOD_TEXT.into()));

        let text = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config())
            .unwrap();

        assert_eq!(text, GOOD_TEXT);
        assert_eq!(ocr.call_count(), 1);
    }

    #[test]
    fn too_short_standard_text_falls_back_to_ocr() {
        let standard = MockBackend::new("standard", MockResponse::Text("  p. 1 ".into()));
        let ocr = MockBackend::new("ocr", MockResponse::Text(GOOD_TEXT.into()));

        let text = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config())
            .unwrap();

        assert_eq!(text, GOOD_TEXT);
    }

    #[test]
    fn empty_standard_text_falls_back_to_ocr() {
        let standard = MockBackend::new("standard", MockResponse::Text(" \n ".into()));
        let ocr = MockBackend::new("ocr", MockResponse::Text(GOOD_TEXT.into()));

        let text = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config())
            .unwrap();

        assert_eq!(text, GOOD_TEXT);
        assert_eq!(standard.call_count(), 1);
        assert_eq!(ocr.call_count(), 1);
    }

    #[test]
    fn garbled_standard_text_falls_back_to_ocr() {
        let garbled = "\u{FFFD}x".repeat(400);
        let standard = MockBackend::new("standard", MockResponse::Text(garbled));
        let ocr = MockBackend::new("ocr", MockResponse::Text(GOOD_TEXT.into()));

        let text = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config())
            .unwrap();

        assert_eq!(text, GOOD_TEXT);
    }

    #[test]
    fn long_spaceless_ocr_text_is_accepted() {
        let spaceless = "x".repeat(800);
        let standard = MockBackend::new("standard", MockResponse::Error("no text layer".into()));
        let ocr = MockBackend::new("ocr", MockResponse::Text(spaceless.clone()));

        let text = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config())
            .unwrap();

        assert_eq!(text, spaceless);
    }

    #[test]
    fn all_failed_reports_last_failure() {
        let standard = MockBackend::new("standard", MockResponse::Error("bad xref".into()));
        let ocr = MockBackend::new("ocr", MockResponse::Text("short".into()));

        let err = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config())
            .unwrap_err();

        match err {
            ExtractionError::AllFailed {
                last: StrategyFailure::TooShort { actual, minimum },
            } => {
                assert_eq!(actual, 5);
                assert_eq!(minimum, DEFAULT_MIN_CONTENT_LENGTH);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn all_empty_without_errors_is_no_text() {
        let standard = MockBackend::new("standard", MockResponse::Text(String::new()));
        let ocr = MockBackend::new("ocr", MockResponse::Text(String::new()));

        let err = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config())
            .unwrap_err();

        assert!(matches!(err, ExtractionError::NoText));
    }

    #[test]
    fn forced_ocr_never_touches_standard() {
        let standard = MockBackend::new("standard", MockResponse::Text(GOOD_TEXT.into()));
        let ocr = MockBackend::new("ocr", MockResponse::Text("Scanned lease agreement".into()));
        let config = ExtractionConfig {
            force_ocr: true,
            ..ExtractionConfig::default()
        };

        let text = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config)
            .unwrap();

        assert_eq!(text, "Scanned lease agreement");
        assert_eq!(standard.call_count(), 0);
    }

    #[test]
    fn forced_ocr_failure_is_final() {
        let standard = MockBackend::new("standard", MockResponse::Text(GOOD_TEXT.into()));
        let ocr = MockBackend::new("ocr", MockResponse::Error("tesseract missing".into()));
        let config = ExtractionConfig {
            force_ocr: true,
            ..ExtractionConfig::default()
        };

        let err = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config)
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::Strategy {
                strategy: Strategy::Ocr,
                source: StrategyFailure::Backend(_),
            }
        ));
        assert_eq!(standard.call_count(), 0);
    }

    #[test]
    fn forced_ocr_validates_length() {
        let standard = MockBackend::new("standard", MockResponse::Text(GOOD_TEXT.into()));
        let ocr = MockBackend::new("ocr", MockResponse::Text("abc".into()));
        let config = ExtractionConfig {
            force_ocr: true,
            min_content_length: 10,
        };

        let err = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config)
            .unwrap_err();

        assert!(err.to_string().contains("below minimum required length"));
    }

    #[test]
    fn forced_ocr_with_empty_output_is_too_short() {
        let standard = MockBackend::new("standard", MockResponse::Text(GOOD_TEXT.into()));
        let ocr = MockBackend::new("ocr", MockResponse::Text(" \n\t ".into()));
        let config = ExtractionConfig {
            force_ocr: true,
            min_content_length: 10,
        };

        let err = ContentExtractor::new(&standard, &ocr)
            .extract(Path::new("doc.pdf"), &config)
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::Strategy {
                strategy: Strategy::Ocr,
                source: StrategyFailure::TooShort {
                    actual: 0,
                    minimum: 10
                },
            }
        ));
        assert_eq!(standard.call_count(), 0);
        assert_eq!(ocr.call_count(), 1);
    }

    #[test]
    fn extractor_is_reusable_across_documents() {
        let standard = MockBackend::new("standard", MockResponse::Error("no text layer".into()));
        let ocr = MockBackend::with_sequence(
            "ocr",
            vec![
                MockResponse::Error("tesseract crashed".into()),
                MockResponse::Text(GOOD_TEXT.into()),
            ],
        );
        let extractor = ContentExtractor::new(&standard, &ocr);

        let err = extractor
            .extract(Path::new("first.pdf"), &config())
            .unwrap_err();
        assert!(err.to_string().contains("tesseract crashed"));

        let text = extractor
            .extract(Path::new("second.pdf"), &config())
            .unwrap();
        assert_eq!(text, GOOD_TEXT);
        assert_eq!(standard.call_count(), 2);
        assert_eq!(ocr.call_count(), 2);
    }

    #[test]
    fn validate_content_length_counts_trimmed_chars() {
        assert!(validate_content_length("   0123456789   ", 10).is_ok());
        assert!(validate_content_length("   012345678   ", 10).is_err());
        assert!(validate_content_length("", 0).is_ok());
    }

    #[test]
    fn garbled_heuristic() {
        assert!(looks_garbled(&"x".repeat(501)));
        assert!(looks_garbled(&"xxxxxxxxxx\n".repeat(60)));
        assert!(!looks_garbled(&"x".repeat(500)));
        assert!(!looks_garbled(&"word ".repeat(200)));
        assert!(!looks_garbled(&"a\tb".repeat(200)));
    }
}
