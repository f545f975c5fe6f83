//! The remote analysis call and its HTTP implementation.

use crate::{TransportResponse, UpstreamConfig};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;
use textguard_core::ChatPayload;
use textguard_error::{ConfigError, HttpError, TextGuardResult};
use tracing::{debug, error, instrument};

/// One request/response exchange with the analysis service.
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status, and `Err` only for transport failures. Classifying statuses is
/// the executor's job.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Sends one payload.
    async fn call(&self, payload: &ChatPayload) -> Result<TransportResponse, HttpError>;

    /// Transport name for logs and metrics.
    fn name(&self) -> &str;
}

/// Chat-completions transport over HTTPS with bearer authentication.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    api_key: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Creates a transport with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    #[instrument(skip(api_key), fields(url = %config.url()))]
    pub fn new(config: &UpstreamConfig, api_key: impl Into<String>) -> TextGuardResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;

        debug!("Creating HTTP transport");
        Ok(Self {
            client,
            url: config.url().clone(),
            api_key: api_key.into(),
        })
    }

    /// Creates a transport reading the API key from the configured
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the variable is unset.
    pub fn from_env(config: &UpstreamConfig) -> TextGuardResult<Self> {
        let api_key = std::env::var(config.api_key_env()).map_err(|e| {
            ConfigError::new(format!("{} not set: {}", config.api_key_env(), e))
        })?;
        Self::new(config, api_key)
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    #[instrument(skip(self, payload), fields(model = %payload.model))]
    async fn call(&self, payload: &ChatPayload) -> Result<TransportResponse, HttpError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send request to analysis service");
                HttpError::new(format!("Request failed: {}", e))
            })?;

        let status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers());
        let body = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read response body");
            HttpError::new(format!("Failed to read response body: {}", e))
        })?;

        debug!(status, ?retry_after, body_len = body.len(), "Received response");
        Ok(TransportResponse {
            status,
            body,
            retry_after,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Reads a `Retry-After` header given in seconds.
///
/// HTTP-date values and values too large for a `Duration` are ignored; the
/// executor falls back to its default rate-limit delay.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(2)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("0.5"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_millis(500)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("1e30"));
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("-3"));
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("inf"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let transport = HttpTransport::new(&UpstreamConfig::default(), "sk-secret").unwrap();
        assert!(!format!("{:?}", transport).contains("sk-secret"));
    }
}
