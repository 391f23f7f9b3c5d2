//! Citation formatting in various styles.
//!
//! Supports APA, MLA, and IEEE in-text citations and bibliography lines, plus
//! the canonical DOI-backed bibliography line used whenever metadata resolves.
//! Formatting is write-only: the output is not meant to be parsed back.

use crate::models::{ReferenceData, NO_DATE};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

/// Citation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CitationStyle {
    /// APA author-date
    Apa,
    /// MLA author (date)
    Mla,
    /// IEEE numeric
    Ieee,
}

impl FromStr for CitationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "APA" => Ok(CitationStyle::Apa),
            "MLA" => Ok(CitationStyle::Mla),
            "IEEE" => Ok(CitationStyle::Ieee),
            other => Err(format!("unrecognized citation style: {}", other)),
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationStyle::Apa => write!(f, "APA"),
            CitationStyle::Mla => write!(f, "MLA"),
            CitationStyle::Ieee => write!(f, "IEEE"),
        }
    }
}

/// Format an in-text citation
///
/// APA: `(a, y)`, MLA: `a (y)`, IEEE: `[n]`
pub fn format_in_text(
    author: &str,
    year: impl fmt::Display,
    style: CitationStyle,
    ordinal: usize,
) -> String {
    match style {
        CitationStyle::Apa => format!("({}, {})", author, year),
        CitationStyle::Mla => format!("{} ({})", author, year),
        CitationStyle::Ieee => format!("[{}]", ordinal),
    }
}

/// Format a style-specific bibliography line
///
/// APA: `[n] a. (y). t.`, MLA: `[n] a. "t." (y).`, IEEE: `[n] a, "t", y.`
pub fn format_bibliography(
    author: &str,
    year: impl fmt::Display,
    title: &str,
    style: CitationStyle,
    ordinal: usize,
) -> String {
    match style {
        CitationStyle::Apa => format!("[{}] {}. ({}). {}.", ordinal, author, year, title),
        CitationStyle::Mla => format!("[{}] {}. \"{}.\" ({}).", ordinal, author, title, year),
        CitationStyle::Ieee => format!("[{}] {}, \"{}\", {}.", ordinal, author, title, year),
    }
}

/// Format the bibliography line for a DOI-resolved reference
///
/// The same layout is used for every style.
pub fn format_doi_bibliography(reference: &ReferenceData, ordinal: usize) -> String {
    format!(
        "[{}] {}. \"{}\", {}. DOI: {}.",
        ordinal,
        reference.authors_joined(),
        reference.title,
        reference.year,
        reference.doi
    )
}

/// Author, year, and title guessed from a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameCitation {
    pub author: String,
    /// The year token exactly as written, or the no-date marker
    pub year: String,
    pub title: String,
}

fn author_year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([A-Za-z]+)_(\d{4})").expect("valid author/year regex"))
}

/// Derive citation parts from a file name such as `Smith_2020.pdf`
///
/// Without an `Author_YYYY` token the extension-less stem becomes the author
/// and the year is unknown. The title is always the stem with underscores
/// replaced by spaces.
pub fn citation_from_filename(file_name: &str) -> FilenameCitation {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let title = stem.replace('_', " ");

    match author_year_pattern().captures(file_name) {
        Some(caps) => FilenameCitation {
            author: caps[1].to_string(),
            year: caps[2].to_string(),
            title,
        },
        None => FilenameCitation {
            author: stem,
            year: NO_DATE.to_string(),
            title,
        },
    }
}
