//! reqwest implementation of `AssistantApi`.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use helper_core::config::ApiConfig;
use helper_core::types::{AskRequest, AskResponse, HealthStatus, IngestReport, MetricsResponse};

use crate::api::AssistantApi;
use crate::error::ApiError;

const ASK_PATH: &str = "/api/ask";
const INGEST_PATH: &str = "/api/ingest";
const METRICS_PATH: &str = "/api/metrics";
const HEALTH_PATH: &str = "/api/health";

/// HTTP+JSON client for the RAG backend.
///
/// Stateless apart from the pooled connection inside `reqwest::Client`, so a
/// single instance can be shared behind an `Arc` by every controller. No
/// request timeout is configured: a call that never settles stays pending.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("helper/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::transport(format!("failed to build HTTP client: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!(base_url = %base_url, "HTTP API client created");
        Ok(Self { client, base_url })
    }

    /// Create a client from the `[api]` configuration section.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a JSON body, normalising every failure.
    async fn call<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        tracing::debug!(method = %method, path, "Backend request");

        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = %method, path, error = %e, "Backend request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::warn!(path, error = %e, "Failed to read backend response body");
            ApiError::from(e)
        })?;

        if !status.is_success() {
            let err = ApiError::from_status_body(status.as_u16(), &text);
            tracing::warn!(path, status = status.as_u16(), error = %err, "Backend returned an error status");
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(path, error = %e, "Malformed backend response");
            ApiError::decode(format!("invalid response from {}: {}", path, e))
        })
    }
}

#[async_trait]
impl AssistantApi for HttpApiClient {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        self.call(Method::POST, ASK_PATH, Some(request)).await
    }

    async fn ingest(&self) -> Result<IngestReport, ApiError> {
        let report: IngestReport = self.call::<_, ()>(Method::POST, INGEST_PATH, None).await?;
        tracing::info!(
            indexed_docs = report.indexed_docs,
            indexed_chunks = report.indexed_chunks,
            "Backend ingestion finished"
        );
        Ok(report)
    }

    async fn metrics(&self) -> Result<MetricsResponse, ApiError> {
        self.call::<_, ()>(Method::GET, METRICS_PATH, None).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.call::<_, ()>(Method::GET, HEALTH_PATH, None).await
    }
}
