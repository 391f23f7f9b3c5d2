//! Configuration file support for literature-review.
//!
//! # Configuration File Format
//!
//! ```toml
//! [input]
//! folder = "papers"
//! extension = "pdf"
//!
//! [extraction]
//! max_pages = 20
//! max_chars = 10000
//!
//! [generation]
//! model = "gemini-1.5-flash"
//! max_attempts = 3
//! backoff_unit_ms = 1000
//!
//! [metadata]
//! base_url = "https://api.crossref.org"
//! mailto = "you@example.org"
//!
//! [citation]
//! default_style = "IEEE"
//! fallback_style = "APA"
//!
//! [output]
//! summary_file = "literature_review.txt"
//! review_file = "full_literature_review.txt"
//! log_file = "log.txt"
//!
//! [concurrency]
//! max_workers = 4
//! ```
//!
//! The API key is never written; it is read from `GEMINI_API_KEY`.

use std::path::Path;

use super::Config;

impl Config {
    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let mut on_disk = self.clone();
        on_disk.generation.api_key = None;

        let content = toml::to_string_pretty(&on_disk)
            .map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Write a starter config file with every default spelled out
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<(), ConfigFileError> {
    if path.exists() && !force {
        return Err(ConfigFileError::Exists(path.display().to_string()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }
    Config::default().save(path)
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Config file already exists: {0} (use --force to overwrite)")]
    Exists(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use crate::utils::CitationStyle;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let toml_content = r#"
[input]
folder = "/tmp/papers"

[extraction]
max_pages = 5

[generation]
model = "gemini-1.5-pro"
backoff_unit_ms = 10

[citation]
default_style = "APA"
fallback_style = "MLA"

[output]
log_file = "errors.txt"
"#;

        let mut file = File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.input.folder, PathBuf::from("/tmp/papers"));
        assert_eq!(config.extraction.max_pages, 5);
        assert_eq!(config.extraction.max_chars, 10_000);
        assert_eq!(config.generation.model, "gemini-1.5-pro");
        assert_eq!(config.generation.backoff_unit_ms, 10);
        assert_eq!(config.citation.default_style, CitationStyle::Apa);
        assert_eq!(config.citation.fallback_style, CitationStyle::Mla);
        assert_eq!(config.output.log_file, PathBuf::from("errors.txt"));
        assert_eq!(
            config.output.summary_file,
            PathBuf::from("literature_review.txt")
        );
    }

    #[test]
    fn test_config_file_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.generation.api_key = Some("secret".to_string());
        config.concurrency.max_workers = Some(2);

        config.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret"));

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.concurrency.max_workers, Some(2));
    }

    #[test]
    fn test_write_default_config_respects_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_config(&path, false).unwrap();
        assert!(path.is_file());

        let again = write_default_config(&path, false);
        assert!(matches!(again, Err(ConfigFileError::Exists(_))));

        write_default_config(&path, true).unwrap();
        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.citation.default_style, CitationStyle::Ieee);
    }

    #[test]
    fn test_config_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/config.toml");
        let result = load_config(Some(&path));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");

        std::fs::write(&path, "invalid = toml = content").unwrap();

        let result = load_config(Some(&path));
        assert!(result.is_err());
    }
}
