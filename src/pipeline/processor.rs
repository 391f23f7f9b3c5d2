//! Per-document pipeline: extract, summarize, cite, format.

use std::sync::Arc;

use crate::models::{Document, DocumentOutcome, ExtractedText, ProcessedEntry, Stage};
use crate::pipeline::{CitationResolver, Summarizer};
use crate::utils::{ErrorLog, PdfExtractError, TextExtractor};

/// Bounds on how much text is taken from each document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionLimits {
    pub max_pages: usize,
    pub max_chars: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_pages: 20,
            max_chars: 10_000,
        }
    }
}

/// Drives one document from extraction to a finished entry
///
/// Only extraction can stop a document. Summarization and citation failures
/// degrade to a marker string or the file name fallback.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    extractor: Arc<dyn TextExtractor>,
    summarizer: Summarizer,
    citations: CitationResolver,
    limits: ExtractionLimits,
}

impl DocumentProcessor {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        summarizer: Summarizer,
        citations: CitationResolver,
        limits: ExtractionLimits,
    ) -> Self {
        Self {
            extractor,
            summarizer,
            citations,
            limits,
        }
    }

    /// Extract bounded text on the blocking pool
    pub async fn extract(&self, document: &Document) -> Result<ExtractedText, PdfExtractError> {
        let extractor = Arc::clone(&self.extractor);
        let path = document.path().to_path_buf();
        let max_pages = self.limits.max_pages;

        let raw = tokio::task::spawn_blocking(move || extractor.extract(&path, max_pages))
            .await
            .map_err(|e| PdfExtractError::ExtractionFailed(format!("extraction task failed: {}", e)))??;

        let text = ExtractedText::bounded(&raw, self.limits.max_chars);
        if text.is_empty() {
            return Err(PdfExtractError::NoText(document.file_name()));
        }
        Ok(text)
    }

    /// Run the whole pipeline for one document
    pub async fn process(&self, document: &Document, log: &ErrorLog) -> DocumentOutcome {
        let file_name = document.file_name();
        let ordinal = document.ordinal;

        tracing::debug!("[{}] {}: {}", ordinal, file_name, Stage::Extracting);
        let text = match self.extract(document).await {
            Ok(text) => text,
            Err(e) => {
                log.log(format!("Error extracting text from {}: {}", file_name, e));
                tracing::debug!("[{}] {}: {}", ordinal, file_name, Stage::Skipped);
                return DocumentOutcome::Skipped;
            }
        };

        tracing::debug!(
            "[{}] {}: {} ({} chars)",
            ordinal,
            file_name,
            Stage::Summarizing,
            text.char_count()
        );
        let (summary, summary_failed) = self.summarizer.summarize_or_marker(text.as_str(), log).await;

        tracing::debug!("[{}] {}: {}", ordinal, file_name, Stage::ResolvingCitation);
        let citation = self
            .citations
            .resolve(text.as_str(), &file_name, ordinal, log)
            .await;

        tracing::debug!("[{}] {}: {}", ordinal, file_name, Stage::Formatting);
        let entry = ProcessedEntry {
            ordinal,
            in_text_summary: format!("{} {}", summary, citation.in_text),
            bibliography_line: citation.bibliography,
            summary_failed,
        };

        tracing::debug!("[{}] {}: {}", ordinal, file_name, Stage::Done);
        DocumentOutcome::Done(entry)
    }
}
