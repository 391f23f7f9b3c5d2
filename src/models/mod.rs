//! Core data models for documents, processed entries, and references.

mod document;
mod reference;

pub use document::{Document, DocumentOutcome, ExtractedText, ProcessedEntry, Stage};
pub use reference::{ReferenceData, Year, NO_DATE, NO_TITLE, UNKNOWN_AUTHOR};
