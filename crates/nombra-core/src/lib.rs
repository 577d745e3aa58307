use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod extract;
pub mod llm;
#[doc(hidden)]
pub mod mock;
pub mod paths;
pub mod pipeline;
pub mod title;
pub mod truncate;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use extract::{ContentExtractor, ExtractionConfig, ExtractionError, Strategy, StrategyFailure};
pub use llm::{OpenAiClient, TitleError, TitleGenerator};
pub use paths::{RenameOutcome, rename_to_title, resolve_unique_path};
pub use pipeline::{PipelineError, PipelineOutcome};
pub use title::{clean_title, sanitize_filename};
pub use truncate::{TRUNCATION_SUFFIX, truncate_content};

/// Default rasterization resolution for OCR.
pub const DEFAULT_OCR_DPI: u32 = 300;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key required. Use --key or set OPENAI_API_KEY")]
    MissingApiKey,
    #[error("minimum content length ({min}) exceeds maximum content length ({max})")]
    InvalidContentBounds { min: usize, max: usize },
}

/// Settings for one run, resolved once and then only read.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    /// Content beyond this many characters is truncated before title generation.
    pub max_content_length: usize,
    /// Extracted text shorter than this (after trimming) is rejected.
    pub min_content_length: usize,
    /// Skip direct extraction and go straight to OCR.
    pub force_ocr: bool,
    /// Log the content sent to the model.
    pub verbose: bool,
    pub ocr_dpi: u32,
    /// Tesseract language code(s), e.g. "deu+eng". `None` uses tesseract's default.
    pub ocr_language: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "api_key",
                &if self.api_key.is_empty() { "" } else { "***" },
            )
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("max_content_length", &self.max_content_length)
            .field("min_content_length", &self.min_content_length)
            .field("force_ocr", &self.force_ocr)
            .field("verbose", &self.verbose)
            .field("ocr_dpi", &self.ocr_dpi)
            .field("ocr_language", &self.ocr_language)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: llm::DEFAULT_API_BASE_URL.to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
            max_content_length: truncate::DEFAULT_MAX_CONTENT_LENGTH,
            min_content_length: extract::DEFAULT_MIN_CONTENT_LENGTH,
            force_ocr: false,
            verbose: false,
            ocr_dpi: DEFAULT_OCR_DPI,
            ocr_language: None,
        }
    }
}

impl Config {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.min_content_length > self.max_content_length {
            return Err(ConfigError::InvalidContentBounds {
                min: self.min_content_length,
                max: self.max_content_length,
            });
        }
        Ok(())
    }

    /// The slice of settings the extraction orchestrator needs.
    pub fn extraction(&self) -> ExtractionConfig {
        ExtractionConfig {
            min_content_length: self.min_content_length,
            force_ocr: self.force_ocr,
        }
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    fn valid() -> Config {
        Config {
            api_key: "sk-test".into(),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_match_cli_defaults() {
        let config = Config::default();
        assert_eq!(config.max_content_length, 3000);
        assert_eq!(config.min_content_length, 10);
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.ocr_dpi, 300);
        assert!(!config.force_ocr);
    }

    #[test]
    fn missing_api_key_is_rejected() {
        assert_eq!(Config::default().validate(), Err(ConfigError::MissingApiKey));
        let blank = Config {
            api_key: "  ".into(),
            ..Config::default()
        };
        assert_eq!(blank.validate(), Err(ConfigError::MissingApiKey));
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let config = Config {
            min_content_length: 500,
            max_content_length: 100,
            ..valid()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidContentBounds { min: 500, max: 100 })
        );
    }

    #[test]
    fn extraction_view_copies_fields() {
        let config = Config {
            min_content_length: 42,
            force_ocr: true,
            ..valid()
        };
        assert_eq!(
            config.extraction(),
            ExtractionConfig {
                min_content_length: 42,
                force_ocr: true,
            }
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", valid());
        assert!(!debug.contains("sk-test"));
        assert!(debug.contains("***"));
    }
}
