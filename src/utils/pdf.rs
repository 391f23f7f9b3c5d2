//! PDF text extraction utilities.
//!
//! Text comes from the first pages of a document only. `lopdf` is used for
//! page-limited extraction; when it cannot read a file, `pdf-extract` is tried
//! on the whole document. Either way the caller bounds the result with
//! [`ExtractedText::bounded`](crate::models::ExtractedText::bounded).

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during PDF extraction
#[derive(Debug, Error)]
pub enum PdfExtractError {
    #[error("Failed to extract text from PDF: {0}")]
    ExtractionFailed(String),

    #[error("File not found or not a valid PDF: {0}")]
    InvalidFile(String),

    #[error("No extractable text in {0}")]
    NoText(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that turns a document on disk into plain text
///
/// Implementations are blocking; callers run them off the async executor.
pub trait TextExtractor: Send + Sync + std::fmt::Debug {
    /// Extract the text of at most `max_pages` pages
    fn extract(&self, path: &Path, max_pages: usize) -> Result<String, PdfExtractError>;
}

/// Default extractor backed by `lopdf`, with `pdf-extract` as fallback
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_with_lopdf(path: &Path, max_pages: usize) -> Result<String, PdfExtractError> {
        let document = lopdf::Document::load(path).map_err(|e| {
            PdfExtractError::ExtractionFailed(format!("lopdf failed to open {}: {}", path.display(), e))
        })?;

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().take(max_pages).collect();
        if page_numbers.is_empty() {
            return Ok(String::new());
        }

        let mut text = String::new();
        for page in page_numbers {
            match document.extract_text(&[page]) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Err(e) => {
                    tracing::debug!("Skipping page {} of {}: {}", page, path.display(), e);
                }
            }
        }
        Ok(text)
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path, max_pages: usize) -> Result<String, PdfExtractError> {
        if !path.exists() {
            return Err(PdfExtractError::InvalidFile(format!(
                "File not found: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(PdfExtractError::InvalidFile(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        if max_pages == 0 {
            return Ok(String::new());
        }

        match Self::extract_with_lopdf(path, max_pages) {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            primary => {
                if let Err(e) = &primary {
                    tracing::debug!("{}; trying pdf-extract", e);
                }
                // The fallback reads every page; the caller's character cap bounds it
                pdf_extract::extract_text(path)
                    .map_err(|e| PdfExtractError::ExtractionFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_nonexistent_file() {
        let result = PdfTextExtractor::new().extract(Path::new("/nonexistent/file.pdf"), 20);
        assert!(matches!(result, Err(PdfExtractError::InvalidFile(_))));
    }

    #[test]
    fn test_extract_directory_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfTextExtractor::new().extract(dir.path(), 20);
        assert!(matches!(result, Err(PdfExtractError::InvalidFile(_))));
    }

    #[test]
    fn test_extract_garbage_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        assert!(PdfTextExtractor::new().extract(&path, 20).is_err());
    }
}
