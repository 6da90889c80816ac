//! HTTP client tests against an in-process axum stand-in for the backend.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use helper_client::{ApiErrorKind, AssistantApi, HttpApiClient};
use helper_core::types::{AskRequest, MetricsSnapshot};

// =============================================================================
// Helpers
// =============================================================================

/// Serve `router` on an ephemeral port and return a client pointed at it.
async fn serve(router: Router) -> HttpApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    HttpApiClient::new(format!("http://{}", addr)).unwrap()
}

/// An address nothing is listening on.
async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn backend() -> Router {
    Router::new()
        .route(
            "/api/ask",
            post(|Json(body): Json<Value>| async move {
                let query = body["query"].as_str().unwrap_or_default().to_string();
                if query.trim().is_empty() {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": "Query cannot be empty"})),
                    );
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "query": query,
                        "answer": "Yes, within policy X",
                        "citations": [{"title": "Returns Policy", "section": null}],
                        "chunks": [{
                            "title": "Returns Policy",
                            "section": null,
                            "text": "Items may be returned within 30 days..."
                        }],
                        "metrics": {"retrieval_ms": 3.5, "generation_ms": 21.0}
                    })),
                )
            }),
        )
        .route(
            "/api/ingest",
            post(|| async { Json(json!({"indexed_docs": 6, "indexed_chunks": 48})) }),
        )
        .route(
            "/api/metrics",
            get(|| async {
                Json(json!({
                    "total_docs": 6,
                    "total_chunks": 48,
                    "avg_retrieval_latency_ms": 4.2,
                    "avg_generation_latency_ms": 18.0
                }))
            }),
        )
        .route("/api/health", get(|| async { Json(json!({"status": "ok"})) }))
}

// =============================================================================
// Happy paths
// =============================================================================

#[tokio::test]
async fn test_ask_returns_answer_with_citations() {
    let client = serve(backend()).await;
    let resp = client
        .ask(&AskRequest::new("Can a customer return a damaged blender after 20 days?"))
        .await
        .unwrap();

    assert_eq!(resp.answer, "Yes, within policy X");
    assert_eq!(resp.citations.len(), 1);
    assert_eq!(resp.citations[0].title, "Returns Policy");
    assert!(resp.citations[0].section.is_none());
    assert_eq!(resp.chunks[0].text, "Items may be returned within 30 days...");
    assert_eq!(resp.metrics.retrieval_ms, 3.5);
}

#[tokio::test]
async fn test_ask_sends_query_and_top_k() {
    let router = Router::new().route(
        "/api/ask",
        post(|Json(body): Json<Value>| async move {
            Json(json!({"answer": format!("{}|{}", body["query"], body["k"])}))
        }),
    );
    let client = serve(router).await;

    let resp = client.ask(&AskRequest::new("shipping?").with_top_k(7)).await.unwrap();
    assert_eq!(resp.answer, "\"shipping?\"|7");

    let resp = client.ask(&AskRequest::new("shipping?")).await.unwrap();
    assert_eq!(resp.answer, "\"shipping?\"|null");
    assert!(resp.citations.is_empty());
}

#[tokio::test]
async fn test_ingest_returns_report() {
    let client = serve(backend()).await;
    let report = client.ingest().await.unwrap();
    assert_eq!(report.indexed_docs, 6);
    assert_eq!(report.indexed_chunks, 48);
}

#[tokio::test]
async fn test_metrics_partial_payload_gets_consumer_defaults() {
    let client = serve(backend()).await;
    let resp = client.metrics().await.unwrap();
    assert_eq!(resp.total_docs, Some(6));
    assert!(resp.embedding_model.is_none());

    let snap = MetricsSnapshot::from(resp);
    assert_eq!(snap.total_chunks, 48);
    assert_eq!(snap.embedding_model, "local-384");
    assert_eq!(snap.llm_model, "gpt-4o-mini");
}

#[tokio::test]
async fn test_health() {
    let client = serve(backend()).await;
    assert!(client.health().await.unwrap().is_ok());
}

// =============================================================================
// Error normalisation
// =============================================================================

#[tokio::test]
async fn test_error_status_uses_detail_message() {
    let client = serve(backend()).await;
    let err = client.ask(&AskRequest::new("   ")).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Status(400));
    assert_eq!(err.to_string(), "Query cannot be empty");
}

#[tokio::test]
async fn test_missing_route_is_status_error() {
    let client = serve(Router::new()).await;
    let err = client.metrics().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Status(404));
    assert!(err.message.starts_with("HTTP 404"));
}

#[tokio::test]
async fn test_internal_error_without_body() {
    let router = Router::new().route(
        "/api/ingest",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let client = serve(router).await;
    let err = client.ingest().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Status(500));
    assert_eq!(err.message, "HTTP 500: Internal Server Error");
}

#[tokio::test]
async fn test_malformed_payload_is_decode_error() {
    let router = Router::new().route("/api/ask", post(|| async { "definitely not json" }));
    let client = serve(router).await;
    let err = client.ask(&AskRequest::new("hello")).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Decode);
    assert!(err.message.contains("/api/ask"));
}

#[tokio::test]
async fn test_wrong_shape_is_decode_error() {
    let router = Router::new().route(
        "/api/ask",
        post(|| async { Json(json!({"citations": []})) }),
    );
    let client = serve(router).await;
    let err = client.ask(&AskRequest::new("hello")).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Decode);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let addr = closed_addr().await;
    let client = HttpApiClient::new(format!("http://{}", addr)).unwrap();
    let err = client.metrics().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Transport);
    assert!(err.message.contains("/api/metrics"));
    assert!(
        err.message.to_lowercase().contains("connection refused"),
        "cause missing from {:?}",
        err.message
    );
}

#[tokio::test]
async fn test_html_error_page_is_truncated() {
    let page = format!("<html><body>{}</body></html>", "x".repeat(5000));
    let router = Router::new().route(
        "/api/metrics",
        get(move || async move { (StatusCode::BAD_GATEWAY, page) }),
    );
    let client = serve(router).await;
    let err = client.metrics().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Status(502));
    assert!(err.message.starts_with("HTTP 502: <html>"));
    assert!(err.message.ends_with("..."));
    assert!(err.message.chars().count() < 300);
}
