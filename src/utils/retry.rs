//! Retry utilities with exponential backoff for text-generation calls.
//!
//! The transport reports each attempt as a [`CallOutcome`]; the policy here
//! decides whether to return, wait, or give up, without ever looking at raw
//! status codes.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

use crate::utils::ErrorLog;

/// Outcome of a single external call, as classified by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<T> {
    /// The service answered OK and the expected payload was found
    Success(T),
    /// The service answered OK but the payload had an unexpected shape
    Malformed(String),
    /// The service asked us to slow down
    RateLimited,
    /// Any other failure (non-OK status or transport error)
    Failed {
        status: Option<u16>,
        detail: String,
    },
}

/// Errors from a generation call after the retry policy has run
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("unexpected response shape: {0}")]
    Parse(String),

    #[error("API error (status {}): {detail}", display_status(.status))]
    Api { status: Option<u16>, detail: String },

    #[error("rate limited on all {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },
}

fn display_status(status: &Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl GenerationError {
    /// Human-readable marker that replaces a summary's prose on failure
    pub fn summary_marker(&self) -> &'static str {
        match self {
            GenerationError::Parse(_) => "Error: Unable to parse summary.",
            GenerationError::Api { .. } => "Error: Unable to generate summary.",
            GenerationError::ExhaustedRetries { .. } => "Error: Failed after multiple attempts.",
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Maximum number of attempts (not retries)
    pub max_attempts: u32,
    /// One backoff time unit; attempt `n` (from 0) waits `unit * 2^n`
    pub unit: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            unit: Duration::from_secs(1),
        }
    }
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, unit: Duration) -> Self {
        Self { max_attempts, unit }
    }

    /// Delay after a rate-limited attempt (attempt numbers start at 0)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Execute a call, retrying only on rate limiting
///
/// `context` prefixes the log lines (e.g. "summary", "final review").
/// `Malformed` and `Failed` outcomes end the loop immediately.
pub async fn with_backoff<T, F, Fut>(
    policy: BackoffPolicy,
    log: &ErrorLog,
    context: &str,
    mut call: F,
) -> Result<T, GenerationError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = CallOutcome<T>>,
{
    for attempt in 0..policy.max_attempts {
        match call(attempt).await {
            CallOutcome::Success(value) => {
                if attempt > 0 {
                    tracing::info!(
                        "{} succeeded on attempt {} after rate limiting",
                        context,
                        attempt + 1
                    );
                }
                return Ok(value);
            }
            CallOutcome::Malformed(detail) => {
                log.log(format!("Unexpected {} response shape: {}", context, detail));
                return Err(GenerationError::Parse(detail));
            }
            CallOutcome::Failed { status, detail } => {
                let error = GenerationError::Api { status, detail };
                log.log(format!("{} failed: {}", context, error));
                return Err(error);
            }
            CallOutcome::RateLimited => {
                if attempt + 1 >= policy.max_attempts {
                    break;
                }
                let delay = policy.delay_for(attempt);
                log.log(format!(
                    "Rate limit exceeded in {}. Retrying in {:?}...",
                    context, delay
                ));
                sleep(delay).await;
            }
        }
    }

    let error = GenerationError::ExhaustedRetries {
        attempts: policy.max_attempts,
    };
    log.log(format!("{} failed: {}", context, error));
    Err(error)
}
