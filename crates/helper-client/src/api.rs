//! The backend capability injected into the controllers.

use async_trait::async_trait;

use helper_core::types::{AskRequest, AskResponse, HealthStatus, IngestReport, MetricsResponse};

use crate::error::ApiError;

/// Remote operations offered by the RAG backend.
///
/// Implementations hold no conversation or admin state; one instance is
/// shared by every controller.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Ask a question and receive a cited answer.
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError>;

    /// Trigger ingestion of the backend's sample corpus.
    async fn ingest(&self) -> Result<IngestReport, ApiError>;

    /// Fetch index and latency metrics.
    async fn metrics(&self) -> Result<MetricsResponse, ApiError>;

    /// Backend liveness check.
    async fn health(&self) -> Result<HealthStatus, ApiError>;
}
