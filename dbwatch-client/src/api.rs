//! Low-level backend client: envelope-typed GET and config POST.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{ApiResult, ClientError, RequestError};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8085";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The backend's response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope of a 2xx response.
    ///
    /// `success: false` becomes a [`RequestError`] carrying `status` and the
    /// server's `error` or `message` text.
    pub fn into_result(self, endpoint: &str, status: u16) -> ApiResult<T> {
        if !self.success {
            let reason = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "request failed".to_string());
            return Err(RequestError::new("GET", endpoint, Some(status), reason).into());
        }
        self.data
            .ok_or_else(|| ClientError::parse(endpoint, "envelope carried no data"))
    }
}

/// HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// GET an enveloped endpoint and decode its `data` as `T`.
    pub async fn get_envelope<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let (status, body) = self.get_body(endpoint).await?;
        if !status.is_success() {
            return Err(RequestError::new(
                "GET",
                endpoint,
                Some(status.as_u16()),
                failure_text(status, &body),
            )
            .into());
        }

        let envelope: ApiResponse<Value> =
            serde_json::from_str(&body).map_err(|e| ClientError::parse(endpoint, e))?;
        let data = envelope.into_result(endpoint, status.as_u16())?;
        serde_json::from_value(data).map_err(|e| ClientError::parse(endpoint, e))
    }

    /// GET an enveloped endpoint whose `data` is plain text.
    pub async fn get_text(&self, endpoint: &str) -> ApiResult<String> {
        self.get_envelope(endpoint).await
    }

    /// GET an endpoint that answers with bare JSON rather than an envelope.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let (status, body) = self.get_body(endpoint).await?;
        if !status.is_success() {
            return Err(RequestError::new(
                "GET",
                endpoint,
                Some(status.as_u16()),
                failure_text(status, &body),
            )
            .into());
        }
        serde_json::from_str(&body).map_err(|e| ClientError::parse(endpoint, e))
    }

    /// POST `{"config": text}` to `endpoint`.
    ///
    /// Success is decided by the status code alone. The response body is
    /// only read to report a failure.
    pub async fn post_config(&self, endpoint: &str, text: &str) -> ApiResult<()> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(&ConfigBody { config: text })
            .send()
            .await
            .map_err(|e| ClientError::transport(endpoint, e))?;

        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "POST");
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(RequestError::new(
            "POST",
            endpoint,
            Some(status.as_u16()),
            failure_text(status, &body),
        )
        .into())
    }

    async fn get_body(&self, endpoint: &str) -> ApiResult<(StatusCode, String)> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| ClientError::transport(endpoint, e))?;

        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "GET");
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(endpoint, e))?;
        Ok((status, body))
    }
}

#[derive(Serialize)]
struct ConfigBody<'a> {
    config: &'a str,
}

// Prefer the envelope's error text, then the raw body, then the status reason.
fn failure_text(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiResponse<Value>>(body) {
        if let Some(text) = envelope.error.or(envelope.message) {
            return text;
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

/// Builder for ApiClient.
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Set the backend base URL (default: "http://localhost:8085").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> ApiResult<ApiClient> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ApiClient { client, base_url })
    }
}
