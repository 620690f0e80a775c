//! Outbound HTTP calls to other services.
//!
//! A non-2xx status is a normal reply. Only transport failures, timeouts and
//! unreadable bodies are errors. Calls are never retried.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, Method, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::Endpoint;
use crate::wire::FlatObject;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownstreamError {
    #[error("downstream call timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("undecodable downstream reply: {0}")]
    Decode(String),
}

/// Status and raw body of a completed downstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamReply {
    pub status: StatusCode,
    pub body: String,
}

impl DownstreamReply {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn flat_body(&self) -> Result<FlatObject, DownstreamError> {
        FlatObject::decode(&self.body).map_err(|e| DownstreamError::Decode(e.to_string()))
    }
}

/// Anything that can carry a request to another service.
#[async_trait]
pub trait Downstream: Send + Sync {
    async fn send(
        &self,
        method: Method,
        endpoint: &Endpoint,
        path: &str,
        body: Option<&str>,
    ) -> Result<DownstreamReply, DownstreamError>;
}

/// reqwest-backed [`Downstream`] with a connect timeout and an overall timeout.
#[derive(Clone)]
pub struct DownstreamProxy {
    client: reqwest::Client,
}

impl DownstreamProxy {
    pub fn new(timeout: Duration) -> Result<Self, DownstreamError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| DownstreamError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

fn classify(error: reqwest::Error) -> DownstreamError {
    if error.is_timeout() {
        DownstreamError::Timeout
    } else {
        DownstreamError::Transport(error.to_string())
    }
}

#[async_trait]
impl Downstream for DownstreamProxy {
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    async fn send(
        &self,
        method: Method,
        endpoint: &Endpoint,
        path: &str,
        body: Option<&str>,
    ) -> Result<DownstreamReply, DownstreamError> {
        let url = format!("http://{endpoint}{path}");
        let mut request = self
            .client
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body.filter(|body| !body.is_empty()) {
            request = request.body(body.to_string());
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Downstream call failed");
            classify(e)
        })?;
        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        debug!(status = status.as_u16(), "Downstream replied");
        Ok(DownstreamReply::new(status, body))
    }
}
