//! Summaries and the final structured review.
//!
//! Both go through a [`GenerationBackend`] with the same [`BackoffPolicy`].
//! Summaries additionally swap their canonical opener for a randomly chosen
//! synonym so consecutive entries don't all start the same way.

use rand::Rng;
use std::sync::Arc;

use crate::sources::GenerationBackend;
use crate::utils::{with_backoff, BackoffPolicy, ErrorLog, GenerationError};

/// Opener replaced in every generated summary
pub const CANONICAL_OPENER: &str = "This study";

/// Synonymous openers drawn from when replacing [`CANONICAL_OPENER`]
pub const INTRO_VARIATIONS: [&str; 8] = [
    "This study",
    "The research",
    "A recent study",
    "This investigation",
    "The analysis",
    "A recent examination",
    "This work",
    "The present study",
];

/// Source of the opener choice
pub trait PhraseChooser: Send + Sync + std::fmt::Debug {
    /// Pick an index in `0..count` (`count` is never zero)
    fn choose(&self, count: usize) -> usize;
}

/// Uniformly random choice
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPhrase;

impl PhraseChooser for RandomPhrase {
    fn choose(&self, count: usize) -> usize {
        rand::thread_rng().gen_range(0..count)
    }
}

/// Always the same index, for deterministic output
#[derive(Debug, Clone, Copy)]
pub struct FixedPhrase(pub usize);

impl PhraseChooser for FixedPhrase {
    fn choose(&self, count: usize) -> usize {
        self.0 % count
    }
}

/// Replace only the first occurrence of the canonical opener
pub fn vary_opener(summary: &str, chooser: &dyn PhraseChooser) -> String {
    if !summary.contains(CANONICAL_OPENER) {
        return summary.to_string();
    }
    let replacement = INTRO_VARIATIONS[chooser.choose(INTRO_VARIATIONS.len())];
    summary.replacen(CANONICAL_OPENER, replacement, 1)
}

fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following paper into a concise literature review entry (4-5 sentences). \
         Use a variety of introductory phrases like {} \
         to make each summary unique. Focus on the problem, methodology, key findings, and relevance:\n\n{}",
        INTRO_VARIATIONS.join(", "),
        text
    )
}

fn review_prompt(entries: &str, today: &str) -> String {
    format!(
        "You are an expert academic writer. Using the following literature review entries, \
         generate a structured literature review in the format of a research paper. \
         Include a header with the title 'LITERATURE REVIEW', the date {}, a numbered list of \
         literature review entries, and a bibliography section with properly formatted references. \
         Ensure that the review is cohesive, professional, and follows academic conventions. \
         Write it as paragraphs with no bullets, with an introduction and a conclusion.\n\n\
         Literature Review Entries:\n{}",
        today, entries
    )
}

/// Per-document summarizer
#[derive(Debug, Clone)]
pub struct Summarizer {
    backend: Arc<dyn GenerationBackend>,
    policy: BackoffPolicy,
    chooser: Arc<dyn PhraseChooser>,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn GenerationBackend>, policy: BackoffPolicy) -> Self {
        Self {
            backend,
            policy,
            chooser: Arc::new(RandomPhrase),
        }
    }

    /// Replace the random opener choice
    pub fn with_chooser(mut self, chooser: Arc<dyn PhraseChooser>) -> Self {
        self.chooser = chooser;
        self
    }

    /// Summarize extracted text
    ///
    /// Failures are already logged when this returns an error.
    pub async fn summarize(&self, text: &str, log: &ErrorLog) -> Result<String, GenerationError> {
        let prompt = summary_prompt(text);
        let (backend, prompt) = (self.backend.as_ref(), prompt.as_str());
        let summary = with_backoff(self.policy, log, "summary", move |_| backend.generate(prompt)).await?;
        Ok(vary_opener(&summary, self.chooser.as_ref()))
    }

    /// Summarize, collapsing any failure to its marker string
    ///
    /// Returns the text and whether it is a failure marker.
    pub async fn summarize_or_marker(&self, text: &str, log: &ErrorLog) -> (String, bool) {
        match self.summarize(text, log).await {
            Ok(summary) => (summary, false),
            Err(e) => (e.summary_marker().to_string(), true),
        }
    }
}

/// Generator for the final structured review
#[derive(Debug, Clone)]
pub struct ReviewGenerator {
    backend: Arc<dyn GenerationBackend>,
    policy: BackoffPolicy,
}

impl ReviewGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>, policy: BackoffPolicy) -> Self {
        Self { backend, policy }
    }

    /// Turn the summary file's content into one cohesive review
    pub async fn generate(&self, entries: &str, log: &ErrorLog) -> Result<String, GenerationError> {
        let today = chrono::Local::now().format("%B %-d, %Y").to_string();
        let prompt = review_prompt(entries, &today);
        let (backend, prompt) = (self.backend.as_ref(), prompt.as_str());
        with_backoff(self.policy, log, "final review", move |_| backend.generate(prompt)).await
    }
}
