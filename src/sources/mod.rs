//! External services the pipeline depends on.
//!
//! Two trait seams cover the network side of processing a document:
//!
//! - [`GenerationBackend`]: an opaque text-to-text service used for both the
//!   per-document summaries and the final structured review. Each call reports
//!   a [`CallOutcome`] so the retry policy never sees raw status codes.
//! - [`MetadataSource`]: bibliographic lookup by DOI.
//!
//! [`GeminiBackend`] and [`CrossRefSource`] are the production
//! implementations; [`mock`] provides scripted stand-ins for tests.

mod crossref;
mod gemini;
pub mod mock;

pub use crossref::{reference_from_message, CrossRefSource, CROSSREF_API_BASE};
pub use gemini::{parse_generated_text, GeminiBackend, DEFAULT_MODEL, GEMINI_API_BASE};
pub use mock::{MockExtractor, MockGenerationBackend, MockMetadataSource};

use crate::models::ReferenceData;
use crate::utils::CallOutcome;
use async_trait::async_trait;

/// A text-generation service
#[async_trait]
pub trait GenerationBackend: Send + Sync + std::fmt::Debug {
    /// Identifier used in logs (e.g. "gemini")
    fn id(&self) -> &str;

    /// Issue one generation call for `prompt`
    ///
    /// Implementations must not retry; retrying is the caller's policy.
    async fn generate(&self, prompt: &str) -> CallOutcome<String>;
}

/// A bibliographic metadata service
#[async_trait]
pub trait MetadataSource: Send + Sync + std::fmt::Debug {
    /// Identifier used in logs (e.g. "crossref")
    fn id(&self) -> &str;

    /// Look up reference data for a DOI with a single request
    async fn lookup_doi(&self, doi: &str) -> Result<ReferenceData, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
