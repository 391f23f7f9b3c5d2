//! Bibliographic reference data resolved from a DOI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for a missing author family name
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Placeholder for a missing title
pub const NO_TITLE: &str = "No Title";

/// Marker rendered when a publication year is unknown
pub const NO_DATE: &str = "n.d.";

/// Publication year, or the "no date" marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Year {
    Known(i32),
    NoDate,
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Known(year) => write!(f, "{}", year),
            Year::NoDate => f.write_str(NO_DATE),
        }
    }
}

/// Reference data for a published work, as returned by a metadata service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Author family names, in listing order
    pub authors: Vec<String>,

    /// Work title
    pub title: String,

    /// Publication year
    pub year: Year,

    /// The DOI this reference was resolved from
    pub doi: String,
}

impl ReferenceData {
    /// Authors joined with ", " (or the unknown placeholder when none are listed)
    pub fn authors_joined(&self) -> String {
        if self.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            self.authors.join(", ")
        }
    }

    /// The portion of the joined author string before the first comma
    pub fn first_author(&self) -> String {
        let joined = self.authors_joined();
        joined.split(',').next().unwrap_or_default().to_string()
    }
}
