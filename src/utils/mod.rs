//! Utility modules supporting the review pipeline.
//!
//! - [`find_doi`]: Locate the first DOI-shaped identifier in extracted text
//! - [`CitationStyle`], [`format_in_text`], [`format_bibliography`]: Citation formatting
//! - [`citation_from_filename`]: Author/year heuristic for files without a DOI
//! - [`HttpClient`]: Shared HTTP client with sensible defaults
//! - [`TextExtractor`], [`PdfTextExtractor`]: Page-limited PDF text extraction
//! - [`with_backoff`], [`BackoffPolicy`], [`CallOutcome`]: Retry on rate limiting
//!   with exponential backoff
//! - [`ErrorLog`], [`SummaryFile`]: Serialized writers for the shared output files
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use literature_review::utils::{with_backoff, BackoffPolicy, CallOutcome, ErrorLog};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let log = ErrorLog::discard();
//! let result = with_backoff(BackoffPolicy::default(), &log, "summary", |_attempt| async {
//!     CallOutcome::Success("generated text".to_string())
//! })
//! .await;
//! assert!(result.is_ok());
//! # }
//! ```

mod cite;
mod doi;
mod http;
mod output;
mod pdf;
mod retry;

pub use cite::{
    citation_from_filename, format_bibliography, format_doi_bibliography, format_in_text,
    CitationStyle, FilenameCitation,
};
pub use doi::find_doi;
pub use http::HttpClient;
pub use output::{write_review, ErrorLog, SummaryFile};
pub use pdf::{PdfExtractError, PdfTextExtractor, TextExtractor};
pub use retry::{with_backoff, BackoffPolicy, CallOutcome, GenerationError};
