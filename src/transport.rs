//! HTTP transport backed by `reqwest`.
//!
//! Sends `POST` requests with a JSON body and returns the status plus the
//! raw response text. No retries: a failed request is reported once and a
//! new user action is needed to try again.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::models::TransportResponse;
use crate::traits::Transport;

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse> {
        tracing::debug!(url, "POST");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        tracing::debug!(url, status, bytes = text.len(), "response");
        Ok(TransportResponse::new(status, text))
    }
}
