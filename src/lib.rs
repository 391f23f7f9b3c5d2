//! # Literature Review
//!
//! Summarize a folder of PDF papers into a cited literature review.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Document, ProcessedEntry, ReferenceData)
//! - [`sources`]: Text generation and DOI metadata services behind trait seams
//! - [`pipeline`]: Per-document processing and batch coordination
//! - [`utils`]: Citation formatting, DOI detection, PDF extraction, retry, output files
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal status lines and progress

pub mod config;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{BatchCoordinator, RunOptions, RunReport};
pub use utils::CitationStyle;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
