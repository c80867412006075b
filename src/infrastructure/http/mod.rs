//! HTTP client seam
//!
//! All outbound traffic (model APIs, credential probes, tool APIs) goes
//! through `HttpClientTrait` so callers can be exercised against a scripted
//! client in tests.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;

use crate::domain::DomainError;

/// Stream type for raw response bodies
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Transport-level errors, kept separate from the domain taxonomy so each
/// caller can classify statuses for its own provider
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response: {message}")]
    Decode { message: String },
}

impl HttpError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Status and body of a response, success or not
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Map an HTTP failure into the domain taxonomy for a named provider
///
/// 401/403/429 and other 4xx are upstream rejections; transport failures
/// and 5xx mean the upstream is unavailable.
pub fn upstream_error(provider: &str, error: HttpError) -> DomainError {
    match error {
        HttpError::Transport { message } => DomainError::upstream_unavailable(provider, message),
        HttpError::Status { status, body } if status >= 500 => {
            DomainError::upstream_unavailable(provider, format!("HTTP {}: {}", status, body))
        }
        HttpError::Status { status, body } => {
            DomainError::upstream_rejected(provider, format!("HTTP {}: {}", status, body))
        }
        HttpError::Decode { message } => DomainError::upstream_unavailable(provider, message),
    }
}

/// Trait for HTTP operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    /// POST a JSON body, erroring on any non-2xx status
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpError>;

    /// POST a JSON body and stream the response bytes
    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, HttpError>;

    /// GET a JSON document, erroring on any non-2xx status
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, HttpError>;

    /// GET a text document, erroring on any non-2xx status
    async fn get_text(&self, url: &str, headers: Vec<(&str, &str)>) -> Result<String, HttpError>;

    /// GET returning status and body verbatim; errors only on transport failure
    async fn get_raw(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<RawResponse, HttpError>;

    /// POST returning status and body verbatim; errors only on transport failure
    async fn post_raw(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<RawResponse, HttpError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn apply_headers(
        mut request: reqwest::RequestBuilder,
        headers: Vec<(&str, &str)>,
    ) -> reqwest::RequestBuilder {
        for (key, value) in headers {
            request = request.header(key, value);
        }
        request
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, HttpError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(HttpError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn into_raw(response: reqwest::Response) -> RawResponse {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        RawResponse { status, body }
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpError> {
        let request = Self::apply_headers(self.client.post(url), headers);
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| HttpError::transport(e.to_string()))?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| HttpError::decode(e.to_string()))
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, HttpError> {
        let request = Self::apply_headers(self.client.post(url), headers);
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| HttpError::transport(e.to_string()))?;

        let response = Self::check_status(response).await?;

        use futures::StreamExt;
        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(|e| HttpError::transport(e.to_string())));

        Ok(Box::pin(stream))
    }

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, HttpError> {
        let request = Self::apply_headers(self.client.get(url), headers);
        let response = request
            .send()
            .await
            .map_err(|e| HttpError::transport(e.to_string()))?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| HttpError::decode(e.to_string()))
    }

    async fn get_text(&self, url: &str, headers: Vec<(&str, &str)>) -> Result<String, HttpError> {
        let request = Self::apply_headers(self.client.get(url), headers);
        let response = request
            .send()
            .await
            .map_err(|e| HttpError::transport(e.to_string()))?;

        let response = Self::check_status(response).await?;
        response
            .text()
            .await
            .map_err(|e| HttpError::decode(e.to_string()))
    }

    async fn get_raw(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<RawResponse, HttpError> {
        let request = Self::apply_headers(self.client.get(url), headers);
        let response = request
            .send()
            .await
            .map_err(|e| HttpError::transport(e.to_string()))?;

        Ok(Self::into_raw(response).await)
    }

    async fn post_raw(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<RawResponse, HttpError> {
        let request = Self::apply_headers(self.client.post(url), headers);
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| HttpError::transport(e.to_string()))?;

        Ok(Self::into_raw(response).await)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_classification() {
        let rejected = upstream_error(
            "openai",
            HttpError::Status {
                status: 401,
                body: "bad key".to_string(),
            },
        );
        assert!(matches!(rejected, DomainError::UpstreamRejected { .. }));

        let rate_limited = upstream_error(
            "openai",
            HttpError::Status {
                status: 429,
                body: "slow down".to_string(),
            },
        );
        assert!(matches!(rate_limited, DomainError::UpstreamRejected { .. }));

        let unavailable = upstream_error(
            "openai",
            HttpError::Status {
                status: 503,
                body: "overloaded".to_string(),
            },
        );
        assert!(matches!(
            unavailable,
            DomainError::UpstreamUnavailable { .. }
        ));

        let transport = upstream_error("openai", HttpError::transport("connection refused"));
        assert!(matches!(transport, DomainError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn test_raw_response_success() {
        let ok = RawResponse {
            status: 204,
            body: String::new(),
        };
        assert!(ok.is_success());

        let not_found = RawResponse {
            status: 404,
            body: String::new(),
        };
        assert!(!not_found.is_success());
    }
}
