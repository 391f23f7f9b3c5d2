//! Configuration management.

pub mod file_config;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::ExtractionLimits;
use crate::sources::{CROSSREF_API_BASE, DEFAULT_MODEL, GEMINI_API_BASE};
use crate::utils::{BackoffPolicy, CitationStyle};

/// Prefix for environment overrides, e.g. `LIT_REVIEW__GENERATION__MODEL`
pub const ENV_PREFIX: &str = "LIT_REVIEW";

/// Environment variable read for the generation API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub citation: CitationConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
}

impl Config {
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            self.generation.max_attempts.max(1),
            Duration::from_millis(self.generation.backoff_unit_ms),
        )
    }

    pub fn extraction_limits(&self) -> ExtractionLimits {
        ExtractionLimits {
            max_pages: self.extraction.max_pages,
            max_chars: self.extraction.max_chars,
        }
    }
}

/// Where input documents are found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Folder scanned (non-recursively) for documents
    #[serde(default = "default_input_folder")]
    pub folder: PathBuf,

    /// File extension matched, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            folder: default_input_folder(),
            extension: default_extension(),
        }
    }
}

fn default_input_folder() -> PathBuf {
    PathBuf::from("papers")
}

fn default_extension() -> String {
    "pdf".to_string()
}

/// Text extraction limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_pages() -> usize {
    20
}

fn default_max_chars() -> usize {
    10_000
}

/// Text generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// API key (falls back to `GEMINI_API_KEY`)
    #[serde(default = "default_api_key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit; the wait after attempt `n` is `unit * 2^n`
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_generation_base_url(),
            model: default_model(),
            max_attempts: default_max_attempts(),
            backoff_unit_ms: default_backoff_unit_ms(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_api_key() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
}

fn default_generation_base_url() -> String {
    GEMINI_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_generation_timeout() -> u64 {
    60
}

/// Bibliographic metadata service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_base_url")]
    pub base_url: String,

    /// Contact address for CrossRef's polite pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailto: Option<String>,

    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: default_metadata_base_url(),
            mailto: None,
            timeout_secs: default_metadata_timeout(),
        }
    }
}

fn default_metadata_base_url() -> String {
    CROSSREF_API_BASE.to_string()
}

fn default_metadata_timeout() -> u64 {
    30
}

/// Citation style selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationConfig {
    /// Used when no style is requested
    #[serde(default = "default_style")]
    pub default_style: CitationStyle,

    /// Used when the requested style is not recognized
    #[serde(default = "fallback_style")]
    pub fallback_style: CitationStyle,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            default_style: default_style(),
            fallback_style: fallback_style(),
        }
    }
}

fn default_style() -> CitationStyle {
    CitationStyle::Ieee
}

fn fallback_style() -> CitationStyle {
    CitationStyle::Apa
}

impl CitationConfig {
    /// Pick the style for a run
    ///
    /// Returns the style and, for an unrecognized request, the notice to show.
    pub fn resolve(&self, requested: Option<&str>) -> (CitationStyle, Option<String>) {
        match requested {
            None => (self.default_style, None),
            Some(name) => match name.parse::<CitationStyle>() {
                Ok(style) => (style, None),
                Err(_) => (
                    self.fallback_style,
                    Some(format!(
                        "Invalid citation style. Defaulting to {}.",
                        self.fallback_style
                    )),
                ),
            },
        }
    }
}

/// Output file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_summary_file")]
    pub summary_file: PathBuf,

    #[serde(default = "default_review_file")]
    pub review_file: PathBuf,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_file: default_summary_file(),
            review_file: default_review_file(),
            log_file: default_log_file(),
        }
    }
}

fn default_summary_file() -> PathBuf {
    PathBuf::from("literature_review.txt")
}

fn default_review_file() -> PathBuf {
    PathBuf::from("full_literature_review.txt")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("log.txt")
}

/// Worker pool sizing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Upper bound on documents processed at once (defaults to the CPU count)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

impl ConcurrencyConfig {
    pub fn worker_count(&self) -> usize {
        self.max_workers
            .filter(|&n| n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
    }
}

/// Load configuration from an optional file plus `LIT_REVIEW__*` environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

/// Look for a config file in the working directory, then the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("literature-review.toml");
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("literature-review").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.folder, PathBuf::from("papers"));
        assert_eq!(config.input.extension, "pdf");
        assert_eq!(config.extraction.max_pages, 20);
        assert_eq!(config.extraction.max_chars, 10_000);
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.citation.default_style, CitationStyle::Ieee);
        assert_eq!(config.citation.fallback_style, CitationStyle::Apa);
        assert_eq!(config.output.log_file, PathBuf::from("log.txt"));
    }

    #[test]
    fn test_backoff_policy_from_config() {
        let mut config = Config::default();
        config.generation.backoff_unit_ms = 250;
        let policy = config.backoff_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_style_resolution() {
        let citation = CitationConfig::default();
        assert_eq!(citation.resolve(None), (CitationStyle::Ieee, None));
        assert_eq!(citation.resolve(Some("mla")), (CitationStyle::Mla, None));

        let (style, notice) = citation.resolve(Some("Chicago"));
        assert_eq!(style, CitationStyle::Apa);
        assert_eq!(
            notice.as_deref(),
            Some("Invalid citation style. Defaulting to APA.")
        );
    }

    #[test]
    fn test_worker_count() {
        let mut concurrency = ConcurrencyConfig::default();
        assert!(concurrency.worker_count() >= 1);
        concurrency.max_workers = Some(2);
        assert_eq!(concurrency.worker_count(), 2);
        concurrency.max_workers = Some(0);
        assert!(concurrency.worker_count() >= 1);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[input]
folder = "corpus"

[citation]
default_style = "MLA"

[concurrency]
max_workers = 3
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.input.folder, PathBuf::from("corpus"));
        assert_eq!(config.input.extension, "pdf");
        assert_eq!(config.citation.default_style, CitationStyle::Mla);
        assert_eq!(config.concurrency.max_workers, Some(3));
        assert_eq!(config.extraction.max_chars, 10_000);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/literature-review.toml")));
        assert!(result.is_err());
    }
}
