//! Google Gemini text-generation backend.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::sources::{GenerationBackend, SourceError};
use crate::utils::{CallOutcome, HttpClient};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: Arc<HttpClient>,
    endpoint: Url,
    model: String,
}

impl GeminiBackend {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let endpoint = Url::parse_with_params(
            &format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            &[("key", api_key)],
        )
        .map_err(|e| SourceError::InvalidRequest(format!("Invalid Gemini endpoint: {}", e)))?;

        Ok(Self {
            client: Arc::new(HttpClient::new(timeout)?),
            endpoint,
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body
pub fn parse_generated_text(body: &Value) -> Result<String, String> {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| "missing candidates[0].content.parts[0].text".to_string())
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn id(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> CallOutcome<String> {
        let payload = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = match self
            .client
            .post(self.endpoint.as_str())
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // The endpoint carries the API key
                let e = e.without_url();
                return CallOutcome::Failed {
                    status: e.status().map(|s| s.as_u16()),
                    detail: format!("Failed to reach Gemini: {}", e),
                }
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return CallOutcome::RateLimited;
        }
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return CallOutcome::Failed {
                status: Some(status.as_u16()),
                detail: body,
            };
        }

        match response.json::<Value>().await {
            Ok(body) => match parse_generated_text(&body) {
                Ok(text) => CallOutcome::Success(text),
                Err(detail) => CallOutcome::Malformed(detail),
            },
            Err(e) => CallOutcome::Malformed(format!("Failed to parse JSON: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn backend_for(server: &mockito::ServerGuard) -> GeminiBackend {
        GeminiBackend::new(&server.url(), DEFAULT_MODEL, "test-key", Duration::from_secs(5)).unwrap()
    }

    fn generate_path() -> Matcher {
        Matcher::Regex(r"^/models/gemini-1\.5-flash:generateContent".to_string())
    }

    #[test]
    fn test_parse_generated_text() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "Hello"}]}}]});
        assert_eq!(parse_generated_text(&body), Ok("Hello".to_string()));
        assert!(parse_generated_text(&json!({"candidates": []})).is_err());
        assert!(parse_generated_text(&json!({"error": "x"})).is_err());
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", generate_path())
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"parts": [{"text": "Summarize this"}]}]
            })))
            .with_status(200)
            .with_body(json!({"candidates": [{"content": {"parts": [{"text": "This study shows X."}]}}]}).to_string())
            .create_async()
            .await;

        let outcome = backend_for(&server).generate("Summarize this").await;

        mock.assert_async().await;
        assert_eq!(outcome, CallOutcome::Success("This study shows X.".to_string()));
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", generate_path())
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        assert_eq!(backend_for(&server).generate("x").await, CallOutcome::RateLimited);
    }

    #[tokio::test]
    async fn test_generate_other_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", generate_path())
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        assert_eq!(
            backend_for(&server).generate("x").await,
            CallOutcome::Failed {
                status: Some(403),
                detail: "API key not valid".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_generate_unexpected_shape() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", generate_path())
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        assert!(matches!(
            backend_for(&server).generate("x").await,
            CallOutcome::Malformed(_)
        ));
    }
}
