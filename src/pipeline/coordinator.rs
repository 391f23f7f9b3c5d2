//! Batch coordination: discovery, concurrent processing, and final assembly.

use futures_util::future::join_all;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::models::{Document, DocumentOutcome, ProcessedEntry};
use crate::pipeline::{
    CitationResolver, DocumentProcessor, DoiResolver, PhraseChooser, ReviewGenerator, Summarizer,
};
use crate::sources::{GenerationBackend, MetadataSource};
use crate::ui::BatchProgress;
use crate::utils::{write_review, CitationStyle, ErrorLog, SummaryFile, TextExtractor};

/// Errors that stop a run before any document is processed
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Folder '{}' does not exist.", .0.display())]
    MissingFolder(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Summary of a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub discovered: usize,
    pub processed: usize,
    pub skipped: usize,
    /// Entries kept with the failure marker in place of a summary
    pub summary_failures: usize,
    pub review_written: bool,
}

/// Per-run switches that don't belong in the config file
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Generate the final structured review after the batch
    pub generate_review: bool,
    /// Suppress progress lines
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            generate_review: true,
            quiet: false,
        }
    }
}

/// List documents in `folder` with the given extension, numbered 1..N
///
/// Only regular files directly inside `folder` are considered, in the order
/// the directory listing yields them.
pub fn discover_documents(folder: &Path, extension: &str) -> Result<Vec<Document>, RunError> {
    if !folder.is_dir() {
        return Err(RunError::MissingFolder(folder.to_path_buf()));
    }

    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(&suffix))
            .unwrap_or(false);
        if matches && path.is_file() {
            paths.push(path);
        }
    }

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| Document::new(path, i + 1))
        .collect())
}

/// Runs one batch of documents end to end
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    config: Config,
    processor: DocumentProcessor,
    review: ReviewGenerator,
}

impl BatchCoordinator {
    /// Wire the pipeline from its external collaborators
    pub fn new(
        config: Config,
        style: CitationStyle,
        extractor: Arc<dyn TextExtractor>,
        backend: Arc<dyn GenerationBackend>,
        metadata: Arc<dyn MetadataSource>,
    ) -> Self {
        Self::build(config, style, extractor, backend, metadata, None)
    }

    /// Like [`BatchCoordinator::new`], with a fixed opener choice
    pub fn with_chooser(
        config: Config,
        style: CitationStyle,
        extractor: Arc<dyn TextExtractor>,
        backend: Arc<dyn GenerationBackend>,
        metadata: Arc<dyn MetadataSource>,
        chooser: Arc<dyn PhraseChooser>,
    ) -> Self {
        Self::build(config, style, extractor, backend, metadata, Some(chooser))
    }

    fn build(
        config: Config,
        style: CitationStyle,
        extractor: Arc<dyn TextExtractor>,
        backend: Arc<dyn GenerationBackend>,
        metadata: Arc<dyn MetadataSource>,
        chooser: Option<Arc<dyn PhraseChooser>>,
    ) -> Self {
        let policy = config.backoff_policy();

        let mut summarizer = Summarizer::new(Arc::clone(&backend), policy);
        if let Some(chooser) = chooser {
            summarizer = summarizer.with_chooser(chooser);
        }
        let citations = CitationResolver::new(DoiResolver::new(metadata), style);
        let processor =
            DocumentProcessor::new(extractor, summarizer, citations, config.extraction_limits());

        Self {
            review: ReviewGenerator::new(backend, policy),
            processor,
            config,
        }
    }

    /// Process every document in the input folder
    pub async fn run(&self, options: RunOptions) -> Result<RunReport, RunError> {
        let documents =
            discover_documents(&self.config.input.folder, &self.config.input.extension)?;
        let discovered = documents.len();
        let progress = BatchProgress::new(discovered, options.quiet);

        if documents.is_empty() {
            progress.println("No PDFs found in the folder.");
            return Ok(RunReport::default());
        }

        let summary = Arc::new(SummaryFile::create(&self.config.output.summary_file)?);
        let log = Arc::new(ErrorLog::create(&self.config.output.log_file)?);

        progress.println(format!("Found {} PDFs. Processing...", discovered));

        let workers = self.config.concurrency.worker_count();
        tracing::debug!("Processing {} documents with {} workers", discovered, workers);
        let semaphore = Arc::new(Semaphore::new(workers));

        let handles: Vec<_> = documents
            .into_iter()
            .map(|document| {
                let processor = self.processor.clone();
                let semaphore = Arc::clone(&semaphore);
                let summary = Arc::clone(&summary);
                let log = Arc::clone(&log);
                let progress = progress.clone();

                tokio::spawn(async move {
                    // The semaphore is never closed
                    let _permit = semaphore.acquire_owned().await.ok();
                    let file_name = document.file_name();
                    progress.started(&file_name);

                    let outcome = processor.process(&document, &log).await;
                    if let Some(entry) = outcome.entry() {
                        if let Err(e) = summary.append_entry(&entry.in_text_summary) {
                            log.log(format!("Error writing summary for {}: {}", file_name, e));
                        }
                    }

                    progress.finished(&file_name, outcome.entry().is_none());
                    outcome
                })
            })
            .collect();

        let mut entries: Vec<ProcessedEntry> = Vec::with_capacity(discovered);
        let mut skipped = 0;
        for result in join_all(handles).await {
            match result {
                Ok(DocumentOutcome::Done(entry)) => entries.push(entry),
                Ok(DocumentOutcome::Skipped) => skipped += 1,
                Err(e) => {
                    log.log(format!("Document task failed: {}", e));
                    skipped += 1;
                }
            }
        }

        if let Err(e) =
            summary.append_bibliography(entries.iter().map(|e| e.bibliography_line.as_str()))
        {
            log.log(format!("Error writing bibliography: {}", e));
        }
        progress.finish(entries.len(), discovered);
        progress.println(format!(
            "Literature review saved to {}",
            self.config.output.summary_file.display()
        ));

        let review_written = if options.generate_review {
            self.assemble_review(&summary, &log, &progress).await
        } else {
            false
        };

        progress.println("\nProcessing complete!");

        Ok(RunReport {
            discovered,
            processed: entries.len(),
            skipped,
            summary_failures: entries.iter().filter(|e| e.summary_failed).count(),
            review_written,
        })
    }

    /// Generate the structured review from the summary file's current content
    async fn assemble_review(
        &self,
        summary: &SummaryFile,
        log: &ErrorLog,
        progress: &BatchProgress,
    ) -> bool {
        let content = match summary.read_back() {
            Ok(content) => content,
            Err(e) => {
                log.log(format!("Error reading summary file: {}", e));
                return false;
            }
        };

        let review = match self.review.generate(&content, log).await {
            Ok(review) => review,
            Err(e) => {
                log.log(format!("Error generating final literature review: {}", e));
                return false;
            }
        };

        let path = &self.config.output.review_file;
        if let Err(e) = write_review(path, &review) {
            log.log(format!("Error writing final literature review: {}", e));
            return false;
        }
        progress.println(format!(
            "\nStructured literature review generated and saved to {}",
            path.display()
        ));
        true
    }
}
