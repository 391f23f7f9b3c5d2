//! DOI detection in free text.

use regex::Regex;
use std::sync::OnceLock;

fn doi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b10\.\d{4,9}/[-._;()/:A-Z0-9]+\b").expect("valid DOI regex")
    })
}

/// Find the leftmost DOI-shaped substring in `text`
///
/// Only the syntactic shape is checked; the DOI may not exist.
pub fn find_doi(text: &str) -> Option<&str> {
    doi_pattern().find(text).map(|m| m.as_str())
}
