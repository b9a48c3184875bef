//! HTTP Optimizer Client - Implementation of OptimizerClient over reqwest.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpOptimizerConfig::new("http://127.0.0.1:8000")
//!     .with_api_key("token")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let client = HttpOptimizerClient::new(config)?;
//! ```
//!
//! Every request carries the configured timeout. A request that exceeds
//! it fails with `OptimizerError::Timeout`; the caller decides whether to
//! try again.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::job::{JobId, StatusReport};
use crate::domain::wizard::OptimizationRequest;
use crate::ports::{OptimizerClient, OptimizerError};

/// Configuration for the HTTP optimizer client.
#[derive(Debug, Clone)]
pub struct HttpOptimizerConfig {
    /// Base URL of the optimizer service, without a trailing path.
    pub base_url: String,
    /// Optional bearer token.
    api_key: Option<Secret<String>>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpOptimizerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    pub fn with_secret_api_key(mut self, api_key: Option<Secret<String>>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

/// Optimizer service client.
pub struct HttpOptimizerClient {
    config: HttpOptimizerConfig,
    client: Client,
}

impl HttpOptimizerClient {
    pub fn new(config: HttpOptimizerConfig) -> Result<Self, OptimizerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OptimizerError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, OptimizerError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OptimizerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn map_transport_error(e: reqwest::Error) -> OptimizerError {
    if e.is_timeout() {
        OptimizerError::Timeout
    } else if e.is_connect() {
        OptimizerError::Transport(format!("Connection failed: {}", e))
    } else if e.is_decode() {
        OptimizerError::InvalidResponse(e.to_string())
    } else {
        OptimizerError::Transport(e.to_string())
    }
}

#[async_trait]
impl OptimizerClient for HttpOptimizerClient {
    async fn submit(&self, request: &OptimizationRequest) -> Result<JobId, OptimizerError> {
        tracing::debug!(url = %self.url("/optimize"), "submitting optimization request");

        let response = self
            .send(self.client.post(self.url("/optimize")).json(request))
            .await?;
        let body: SubmitResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                OptimizerError::Timeout
            } else {
                OptimizerError::InvalidResponse(e.to_string())
            }
        })?;

        JobId::new(body.job_id).map_err(|e| OptimizerError::InvalidResponse(e.to_string()))
    }

    async fn status(&self, job_id: &JobId) -> Result<StatusReport, OptimizerError> {
        let url = self.url(&format!("/status/{}", job_id));
        let response = self.send(self.client.get(url)).await?;
        response.json::<StatusReport>().await.map_err(|e| {
            if e.is_timeout() {
                OptimizerError::Timeout
            } else {
                OptimizerError::InvalidResponse(e.to_string())
            }
        })
    }
}
