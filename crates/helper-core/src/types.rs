//! Domain and wire types shared by the API client and both controllers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Embedding model shown when the backend does not report one.
pub const DEFAULT_EMBEDDING_MODEL: &str = "local-384";
/// LLM model shown when the backend does not report one.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

// =============================================================================
// Conversation
// =============================================================================

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Pointer to the document an answer drew from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl Citation {
    /// Chip label: the title, followed by the section when present.
    pub fn label(&self) -> String {
        source_label(&self.title, self.section.as_deref())
    }
}

/// Verbatim evidence passage backing an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub text: String,
}

impl Chunk {
    /// Evidence header: the title, followed by the section when present.
    pub fn label(&self) -> String {
        source_label(&self.title, self.section.as_deref())
    }
}

fn source_label(title: &str, section: Option<&str>) -> String {
    match section {
        Some(section) if !section.is_empty() => format!("{} — {}", title, section),
        _ => title.to_string(),
    }
}

/// Per-answer latency figures reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerTimings {
    pub retrieval_ms: f64,
    pub generation_ms: f64,
}

/// One conversation entry.
///
/// Turns are immutable once appended to a session; fields are public for
/// reading, and the constructors below are the only way the controllers
/// build them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<Chunk>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timings: Option<AnswerTimings>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// The user's question, verbatim.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    /// A successful answer carrying its citations and evidence.
    pub fn answer(response: AskResponse) -> Self {
        Self {
            citations: Some(response.citations),
            chunks: Some(response.chunks),
            timings: Some(response.metrics),
            ..Self::new(Role::Assistant, response.answer)
        }
    }

    /// An assistant turn describing a failed ask.
    pub fn error(message: impl fmt::Display) -> Self {
        Self::new(Role::Assistant, format!("Error: {}", message))
    }

    fn new(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            citations: None,
            chunks: None,
            timings: None,
            created_at: Utc::now(),
        }
    }

    /// Citations attached to this turn, empty for user and error turns.
    pub fn citations(&self) -> &[Citation] {
        self.citations.as_deref().unwrap_or_default()
    }

    /// Evidence chunks attached to this turn, empty for user and error turns.
    pub fn chunks(&self) -> &[Chunk] {
        self.chunks.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Body of `POST /api/ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question, as typed.
    pub query: String,
    /// Number of chunks to retrieve; the backend default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            query: question.into(),
            k: None,
        }
    }

    pub fn with_top_k(mut self, k: u32) -> Self {
        self.k = Some(k);
        self
    }
}

/// Body returned by `POST /api/ask`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub metrics: AnswerTimings,
}

/// Acknowledgement returned by `POST /api/ingest`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestReport {
    pub indexed_docs: u64,
    pub indexed_chunks: u64,
}

/// Body returned by `GET /api/metrics`. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsResponse {
    pub total_docs: Option<u64>,
    pub total_chunks: Option<u64>,
    pub avg_retrieval_latency_ms: Option<f64>,
    pub avg_generation_latency_ms: Option<f64>,
    pub embedding_model: Option<String>,
    pub llm_model: Option<String>,
}

/// Body returned by `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Last known backend state, with consumer-side defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_documents: u64,
    pub total_chunks: u64,
    pub avg_retrieval_latency_ms: f64,
    pub avg_generation_latency_ms: f64,
    pub embedding_model: String,
    pub llm_model: String,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        MetricsResponse::default().into()
    }
}

impl From<MetricsResponse> for MetricsSnapshot {
    fn from(resp: MetricsResponse) -> Self {
        Self {
            total_documents: resp.total_docs.unwrap_or(0),
            total_chunks: resp.total_chunks.unwrap_or(0),
            avg_retrieval_latency_ms: resp.avg_retrieval_latency_ms.unwrap_or(0.0).max(0.0),
            avg_generation_latency_ms: resp.avg_generation_latency_ms.unwrap_or(0.0).max(0.0),
            embedding_model: resp
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            llm_model: resp
                .llm_model
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        }
    }
}

/// Display-ready metric values for the admin view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsView {
    pub total_docs: u64,
    pub total_chunks: u64,
    pub retrieval_latency: String,
    pub generation_latency: String,
    pub embedding_model: String,
    pub llm_model: String,
}

impl MetricsView {
    /// Build the view, falling back to defaults when no snapshot was fetched yet.
    pub fn from_snapshot(snapshot: Option<&MetricsSnapshot>) -> Self {
        let fallback;
        let snapshot = match snapshot {
            Some(s) => s,
            None => {
                fallback = MetricsSnapshot::default();
                &fallback
            }
        };
        Self {
            total_docs: snapshot.total_documents,
            total_chunks: snapshot.total_chunks,
            retrieval_latency: format!("{}ms", snapshot.avg_retrieval_latency_ms),
            generation_latency: format!("{}ms", snapshot.avg_generation_latency_ms),
            embedding_model: snapshot.embedding_model.clone(),
            llm_model: snapshot.llm_model.clone(),
        }
    }

    /// Labelled rows in display order.
    pub fn rows(&self) -> [(&'static str, String); 6] {
        [
            ("Total Documents", self.total_docs.to_string()),
            ("Average Retrieval Latency", self.retrieval_latency.clone()),
            ("Embedding Model", self.embedding_model.clone()),
            ("Total Chunks", self.total_chunks.to_string()),
            ("Average Generation Latency", self.generation_latency.clone()),
            ("LLM Model", self.llm_model.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> AskResponse {
        serde_json::from_str(
            r#"{
                "query": "Can a customer return a damaged blender after 20 days?",
                "answer": "Yes, within policy X",
                "citations": [{"title": "Returns Policy"}],
                "chunks": [{"title": "Returns Policy", "text": "Items may be returned within 30 days..."}],
                "metrics": {"retrieval_ms": 12.5, "generation_ms": 40.0}
            }"#,
        )
        .unwrap()
    }

    // ---- Role ----

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    // ---- Labels ----

    #[test]
    fn test_citation_label_without_section() {
        let c = Citation {
            title: "Returns Policy".to_string(),
            section: None,
        };
        assert_eq!(c.label(), "Returns Policy");
    }

    #[test]
    fn test_chunk_label_with_section() {
        let c = Chunk {
            title: "Warranty".to_string(),
            section: Some("Exclusions".to_string()),
            text: "Water damage is not covered.".to_string(),
        };
        assert_eq!(c.label(), "Warranty — Exclusions");
    }

    #[test]
    fn test_empty_section_is_ignored() {
        let c = Citation {
            title: "Shipping".to_string(),
            section: Some(String::new()),
        };
        assert_eq!(c.label(), "Shipping");
    }

    // ---- Turn ----

    #[test]
    fn test_user_turn_has_no_evidence() {
        let t = Turn::user("hello");
        assert_eq!(t.role, Role::User);
        assert_eq!(t.content, "hello");
        assert!(t.citations.is_none());
        assert!(t.chunks.is_none());
        assert!(t.citations().is_empty());
    }

    #[test]
    fn test_answer_turn_carries_citations_and_chunks() {
        let t = Turn::answer(sample_response());
        assert_eq!(t.role, Role::Assistant);
        assert_eq!(t.content, "Yes, within policy X");
        assert_eq!(t.citations().len(), 1);
        assert_eq!(t.citations()[0].label(), "Returns Policy");
        assert_eq!(t.chunks().len(), 1);
        assert_eq!(t.chunks()[0].text, "Items may be returned within 30 days...");
        assert_eq!(t.timings.unwrap().retrieval_ms, 12.5);
    }

    #[test]
    fn test_error_turn_content() {
        let t = Turn::error("timeout");
        assert_eq!(t.role, Role::Assistant);
        assert_eq!(t.content, "Error: timeout");
        assert!(t.citations.is_none());
        assert!(t.chunks.is_none());
        assert!(t.timings.is_none());
    }

    #[test]
    fn test_turn_ids_are_unique() {
        assert_ne!(Turn::user("a").id, Turn::user("a").id);
    }

    // ---- Wire ----

    #[test]
    fn test_ask_request_omits_unset_k() {
        let json = serde_json::to_string(&AskRequest::new("where is my order?")).unwrap();
        assert_eq!(json, r#"{"query":"where is my order?"}"#);

        let json = serde_json::to_string(&AskRequest::new("q").with_top_k(6)).unwrap();
        assert_eq!(json, r#"{"query":"q","k":6}"#);
    }

    #[test]
    fn test_ask_response_minimal_payload() {
        let resp: AskResponse = serde_json::from_str(r#"{"answer": "No."}"#).unwrap();
        assert_eq!(resp.answer, "No.");
        assert!(resp.citations.is_empty());
        assert!(resp.chunks.is_empty());
        assert_eq!(resp.metrics, AnswerTimings::default());
    }

    #[test]
    fn test_ask_response_without_answer_is_rejected() {
        let result = serde_json::from_str::<AskResponse>(r#"{"citations": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_ingest_report_defaults() {
        let report: IngestReport = serde_json::from_str("{}").unwrap();
        assert_eq!(report, IngestReport::default());
        let report: IngestReport =
            serde_json::from_str(r#"{"indexed_docs": 6, "indexed_chunks": 42}"#).unwrap();
        assert_eq!(report.indexed_chunks, 42);
    }

    #[test]
    fn test_health_status() {
        let h: HealthStatus = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert!(h.is_ok());
        assert!(!HealthStatus {
            status: "degraded".to_string()
        }
        .is_ok());
    }

    // ---- Metrics ----

    #[test]
    fn test_snapshot_applies_defaults_for_missing_fields() {
        let resp: MetricsResponse = serde_json::from_str(r#"{"total_docs": 3}"#).unwrap();
        let snap = MetricsSnapshot::from(resp);
        assert_eq!(snap.total_documents, 3);
        assert_eq!(snap.total_chunks, 0);
        assert_eq!(snap.avg_retrieval_latency_ms, 0.0);
        assert_eq!(snap.embedding_model, "local-384");
        assert_eq!(snap.llm_model, "gpt-4o-mini");
    }

    #[test]
    fn test_snapshot_keeps_reported_values() {
        let resp = MetricsResponse {
            total_docs: Some(6),
            total_chunks: Some(120),
            avg_retrieval_latency_ms: Some(8.25),
            avg_generation_latency_ms: Some(310.0),
            embedding_model: Some("all-MiniLM-L6-v2".to_string()),
            llm_model: Some("stub".to_string()),
        };
        let snap = MetricsSnapshot::from(resp);
        assert_eq!(snap.total_chunks, 120);
        assert_eq!(snap.embedding_model, "all-MiniLM-L6-v2");
        assert_eq!(snap.llm_model, "stub");
    }

    #[test]
    fn test_view_without_snapshot_uses_defaults() {
        let view = MetricsView::from_snapshot(None);
        assert_eq!(view.total_docs, 0);
        assert_eq!(view.total_chunks, 0);
        assert_eq!(view.retrieval_latency, "0ms");
        assert_eq!(view.generation_latency, "0ms");
        assert_eq!(view.embedding_model, "local-384");
        assert_eq!(view.llm_model, "gpt-4o-mini");
    }

    #[test]
    fn test_view_formats_latencies() {
        let snap = MetricsSnapshot {
            avg_retrieval_latency_ms: 12.5,
            avg_generation_latency_ms: 40.0,
            ..MetricsSnapshot::default()
        };
        let view = MetricsView::from_snapshot(Some(&snap));
        assert_eq!(view.retrieval_latency, "12.5ms");
        assert_eq!(view.generation_latency, "40ms");
    }

    #[test]
    fn test_view_rows_order() {
        let view = MetricsView::from_snapshot(None);
        let labels: Vec<&str> = view.rows().iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec![
                "Total Documents",
                "Average Retrieval Latency",
                "Embedding Model",
                "Total Chunks",
                "Average Generation Latency",
                "LLM Model",
            ]
        );
    }
}
