//! Mock collaborators for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{ReferenceData, Year};
use crate::sources::{GenerationBackend, MetadataSource, SourceError};
use crate::utils::{CallOutcome, PdfExtractError, TextExtractor};

/// A generation backend that replays scripted outcomes
///
/// Outcomes are consumed in order; once the script runs out every further
/// call returns the fallback outcome.
#[derive(Debug)]
pub struct MockGenerationBackend {
    script: Mutex<VecDeque<CallOutcome<String>>>,
    fallback: CallOutcome<String>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
    prompt_delays: Vec<(String, Duration)>,
    calls: AtomicUsize,
}

impl MockGenerationBackend {
    /// Always return `text`
    pub fn always(text: &str) -> Self {
        Self::scripted(Vec::new(), CallOutcome::Success(text.to_string()))
    }

    /// Replay `script`, then return `fallback`
    pub fn scripted(script: Vec<CallOutcome<String>>, fallback: CallOutcome<String>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            prompts: Mutex::new(Vec::new()),
            delay: None,
            prompt_delays: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep for `delay` on calls whose prompt contains `marker`
    ///
    /// Takes precedence over [`MockGenerationBackend::with_delay`].
    pub fn with_delay_for(mut self, marker: &str, delay: Duration) -> Self {
        self.prompt_delays.push((marker.to_string(), delay));
        self
    }

    /// Number of calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    fn id(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> CallOutcome<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let delay = self
            .prompt_delays
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, delay)| *delay)
            .or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// A metadata source backed by a fixed DOI table
#[derive(Debug, Default)]
pub struct MockMetadataSource {
    records: HashMap<String, ReferenceData>,
    lookups: AtomicUsize,
}

impl MockMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record for `doi`
    pub fn with_record(mut self, doi: &str, authors: &[&str], title: &str, year: Year) -> Self {
        self.records.insert(
            doi.to_string(),
            ReferenceData {
                authors: authors.iter().map(|a| a.to_string()).collect(),
                title: title.to_string(),
                year,
                doi: doi.to_string(),
            },
        );
        self
    }

    /// Number of lookups received so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for MockMetadataSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn lookup_doi(&self, doi: &str) -> Result<ReferenceData, SourceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(doi)
            .cloned()
            .ok_or_else(|| SourceError::Api(format!("mock lookup error for DOI {}: 404", doi)))
    }
}

/// An extractor that returns canned text keyed by file name
#[derive(Debug, Default)]
pub struct MockExtractor {
    texts: HashMap<String, String>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `text` for files named `file_name`; unknown files fail to extract
    pub fn with_text(mut self, file_name: &str, text: &str) -> Self {
        self.texts.insert(file_name.to_string(), text.to_string());
        self
    }
}

impl TextExtractor for MockExtractor {
    fn extract(&self, path: &Path, _max_pages: usize) -> Result<String, PdfExtractError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.texts
            .get(&name)
            .cloned()
            .ok_or_else(|| PdfExtractError::ExtractionFailed(format!("cannot read {}", name)))
    }
}

/// Shorthand for a successful outcome carrying `text`
pub fn success(text: &str) -> CallOutcome<String> {
    CallOutcome::Success(text.to_string())
}
