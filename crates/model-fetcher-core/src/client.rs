//! Model Fetch Client
//!
//! Issues `GET {base_url}/models` against an OpenAI-compatible endpoint and
//! classifies the outcome. One request per call, no retries.

use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, FetchError, FetchResult};
use crate::models::models_from_value;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Whether `url` is an absolute http(s) URL with a host.
pub fn validate_url(url: &str) -> bool {
    match reqwest::Url::parse(url.trim()) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().map_or(false, |h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// The model list endpoint for a base URL.
///
/// # Example
/// ```
/// use model_fetcher_core::client::models_endpoint;
/// assert_eq!(models_endpoint("https://api.openai.com/v1/"), "https://api.openai.com/v1/models");
/// ```
pub fn models_endpoint(base_url: &str) -> String {
    format!("{}/models", base_url.trim().trim_end_matches('/'))
}

#[derive(Debug, Clone)]
pub struct ModelClient {
    http: reqwest::Client,
    timeout_secs: u64,
}

impl ModelClient {
    /// Client with the default 30 second timeout
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Client with a custom timeout. Zero is bumped to one second so every
    /// request stays bounded.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let timeout_secs = timeout_secs.max(1);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("model-fetcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                FetchError::new(ErrorKind::NetworkError, format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { http, timeout_secs })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Fetch the model list. The bearer header is sent only when the key is
    /// non-empty.
    pub async fn fetch(&self, base_url: &str, api_key: &str) -> FetchResult {
        let base_url = base_url.trim();
        if !validate_url(base_url) {
            return Err(FetchError::invalid_url(base_url));
        }

        let endpoint = models_endpoint(base_url);
        debug!("Fetching models from {}", endpoint);

        let mut request = self.http.get(&endpoint).header(ACCEPT, "application/json");
        let api_key = api_key.trim();
        if !api_key.is_empty() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Model fetch from {} failed: {}", endpoint, e);
            FetchError::network(&e, self.timeout_secs)
        })?;

        let status = response.status().as_u16();
        if status != 200 {
            warn!("Model fetch from {} returned status {}", endpoint, status);
            return Err(FetchError::from_status(status, &endpoint));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::parse(e)
            } else {
                FetchError::network(&e, self.timeout_secs)
            }
        })?;
        let models = models_from_value(&body)?;

        info!("Fetched {} models from {}", models.len(), endpoint);
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://api.openai.com/v1"));
        assert!(validate_url("http://localhost:8080"));
        assert!(validate_url("  http://127.0.0.1:1234/v1  "));
        assert!(!validate_url(""));
        assert!(!validate_url("api.openai.com/v1"));
        assert!(!validate_url("ftp://example.com"));
        assert!(!validate_url("file:///etc/passwd"));
    }

    #[test]
    fn test_models_endpoint() {
        assert_eq!(models_endpoint("https://h/v1"), "https://h/v1/models");
        assert_eq!(models_endpoint("https://h/v1///"), "https://h/v1/models");
        assert_eq!(models_endpoint("http://h:1"), "http://h:1/models");
    }

    #[test]
    fn test_zero_timeout_is_bounded() {
        let client = ModelClient::with_timeout(0).unwrap();
        assert_eq!(client.timeout_secs(), 1);
    }
}
