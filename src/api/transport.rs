//! HTTP transport seam
//!
//! The summary source is written against the [`Transport`] trait so the
//! fetch/cache/coalescing layer can be tested without a network.
//! [`HttpTransport`] is the production implementation.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::error::Error;

const USER_AGENT: &str = "wikilookup/0.1.0 (https://github.com/wikilookup/wikilookup)";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Transport-level errors, distinct from normalization outcomes
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream returned a non-2xx status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Response body could not be read or parsed as JSON
    #[error("Invalid response body: {0}")]
    Body(String),
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Fetch(err.to_string())
    }
}

/// Async HTTP GET capability returning a JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with `query` appended, expecting a JSON body.
    ///
    /// Success-with-body and failure-without-usable-body must surface as
    /// the two distinguishable outcomes of the returned `Result`.
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<Value, TransportError>;
}

/// Production transport backed by [`reqwest::Client`]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> std::result::Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<Value, TransportError> {
        tracing::debug!(url = %url, "dispatching GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}
