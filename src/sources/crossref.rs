//! CrossRef metadata source.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{ReferenceData, Year, NO_TITLE, UNKNOWN_AUTHOR};
use crate::sources::{MetadataSource, SourceError};
use crate::utils::HttpClient;

pub const CROSSREF_API_BASE: &str = "https://api.crossref.org";

/// CrossRef metadata source
///
/// Uses the CrossRef REST API (`/works/{doi}`) for DOI metadata lookup.
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl CrossRefSource {
    /// Create a source against `base_url`
    ///
    /// A `mailto` address routes requests to CrossRef's polite pool.
    pub fn new(
        base_url: impl Into<String>,
        mailto: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let user_agent = match mailto {
            Some(mail) => format!(
                "{} / {} (mailto:{})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                mail
            ),
            None => format!("{} / {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        };
        Ok(Self {
            client: Arc::new(HttpClient::with_user_agent(&user_agent, timeout)?),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MetadataSource for CrossRefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    async fn lookup_doi(&self, doi: &str) -> Result<ReferenceData, SourceError> {
        let url = format!("{}/works/{}", self.base_url, urlencoding::encode(doi));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch DOI: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(format!("DOI {} not found in CrossRef", doi)));
        }
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "CrossRef API error for DOI {}: {}",
                doi,
                status.as_u16()
            )));
        }

        let data: CRResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Ok(reference_from_message(&data.message, doi))
    }
}

/// Build reference data from a CrossRef `message` object
///
/// Every field is optional: a missing or oddly typed field degrades to its
/// placeholder instead of failing the lookup.
pub fn reference_from_message(message: &Value, doi: &str) -> ReferenceData {
    let authors = message
        .get("author")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .map(|author| {
                    author
                        .get("family")
                        .and_then(Value::as_str)
                        .unwrap_or(UNKNOWN_AUTHOR)
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default();

    let title = message
        .get("title")
        .and_then(Value::as_array)
        .and_then(|titles| titles.first())
        .and_then(Value::as_str)
        .unwrap_or(NO_TITLE)
        .to_string();

    let year = message
        .pointer("/issued/date-parts/0/0")
        .and_then(|part| match part {
            Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .map(Year::Known)
        .unwrap_or(Year::NoDate);

    ReferenceData {
        authors,
        title,
        year,
        doi: doi.to_string(),
    }
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CRResponse {
    #[serde(default)]
    message: Value,
}
