use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub openai: Option<OpenAiConfig>,
    pub content: Option<ContentConfig>,
    pub ocr: Option<OcrConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    pub force: Option<bool>,
    pub dpi: Option<u32>,
    pub language: Option<String>,
}

/// Platform config directory path: `<config_dir>/nombra/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nombra").join("config.toml"))
}

/// Load config by cascading CWD `.nombra.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".nombra.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_openai = base.openai.unwrap_or_default();
    let overlay_openai = overlay.openai.unwrap_or_default();
    let base_content = base.content.unwrap_or_default();
    let overlay_content = overlay.content.unwrap_or_default();
    let base_ocr = base.ocr.unwrap_or_default();
    let overlay_ocr = overlay.ocr.unwrap_or_default();

    ConfigFile {
        openai: Some(OpenAiConfig {
            api_key: overlay_openai.api_key.or(base_openai.api_key),
            base_url: overlay_openai.base_url.or(base_openai.base_url),
            model: overlay_openai.model.or(base_openai.model),
        }),
        content: Some(ContentConfig {
            max_length: overlay_content.max_length.or(base_content.max_length),
            min_length: overlay_content.min_length.or(base_content.min_length),
        }),
        ocr: Some(OcrConfig {
            force: overlay_ocr.force.or(base_ocr.force),
            dpi: overlay_ocr.dpi.or(base_ocr.dpi),
            language: overlay_ocr.language.or(base_ocr.language),
        }),
    }
}
