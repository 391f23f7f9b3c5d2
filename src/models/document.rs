//! Document model: discovered input files and their processed entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// An input document with its 1-based ordinal
///
/// Ordinals are assigned once, at discovery, and never change afterwards.
/// They number the bibliography and the IEEE in-text brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Path to the document on disk
    pub path: PathBuf,

    /// 1-based position in discovery order
    pub ordinal: usize,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, ordinal: usize) -> Self {
        Self {
            path: path.into(),
            ordinal,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component, lossily converted
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Plain text extracted from the first pages of a document, bounded in length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Truncate to `max_chars` characters, then trim surrounding whitespace
    pub fn bounded(raw: &str, max_chars: usize) -> Self {
        let truncated: String = raw.chars().take(max_chars).collect();
        Self(truncated.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// The result of successfully processing one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedEntry {
    pub ordinal: usize,

    /// Summary text followed by the in-text citation
    pub in_text_summary: String,

    /// One bibliography line, prefixed with `[ordinal]`
    pub bibliography_line: String,

    /// Whether the summary is an error marker rather than generated prose
    pub summary_failed: bool,
}

/// Processing stages a document moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extracting,
    Summarizing,
    ResolvingCitation,
    Formatting,
    Done,
    Skipped,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extracting => "extracting",
            Stage::Summarizing => "summarizing",
            Stage::ResolvingCitation => "resolving-citation",
            Stage::Formatting => "formatting",
            Stage::Done => "done",
            Stage::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

/// Terminal state of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Done(ProcessedEntry),
    Skipped,
}

impl DocumentOutcome {
    pub fn entry(&self) -> Option<&ProcessedEntry> {
        match self {
            DocumentOutcome::Done(entry) => Some(entry),
            DocumentOutcome::Skipped => None,
        }
    }

    pub fn into_entry(self) -> Option<ProcessedEntry> {
        match self {
            DocumentOutcome::Done(entry) => Some(entry),
            DocumentOutcome::Skipped => None,
        }
    }
}
