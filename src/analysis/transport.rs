//! Wire types and the transport seam for the inference service

use super::http_client::{build_client, inference_client};
use crate::config::{ScreeningConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const PREDICT_PATH: &str = "/api/v1/predict";
pub const HEALTH_PATH: &str = "/health";

/// Body of `POST /api/v1/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Base64 without any `data:` prefix
    pub image_base64: String,
    pub mime_type: String,
    pub preprocessing_method: String,
}

/// Successful body of `POST /api/v1/predict`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub diagnosis: String,
    pub confidence: f64,
    /// Kept loose so an unexpected category never fails the parse
    #[serde(rename = "riskLevel", default)]
    pub risk_level: Value,
    pub recommendations: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    #[serde(alias = "model_loaded")]
    pub model_loaded: bool,
}

/// Status and body exactly as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Carries requests to the inference service
///
/// `Err` means nothing usable came back (connection refused, timeout);
/// HTTP error statuses are returned as `Ok` so the caller can read the body.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    async fn predict(&self, request: &PredictRequest) -> Result<RawResponse, String>;

    async fn health(&self) -> Result<RawResponse, String>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ScreeningConfig) -> Result<Self, String> {
        let client = if config.request_timeout == Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS) {
            inference_client().clone()
        } else {
            build_client(config.request_timeout)
                .map_err(|e| format!("Failed to create HTTP client: {}", e))?
        };

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read(response: reqwest::Response) -> Result<RawResponse, String> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response body: {}", e))?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl InferenceTransport for HttpTransport {
    async fn predict(&self, request: &PredictRequest) -> Result<RawResponse, String> {
        let url = format!("{}{}", self.base_url, PREDICT_PATH);
        tracing::debug!("[Analysis] POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        Self::read(response).await
    }

    async fn health(&self) -> Result<RawResponse, String> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        Self::read(response).await
    }
}
