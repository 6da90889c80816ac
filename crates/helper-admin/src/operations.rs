//! Ingest action and metrics snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use helper_client::AssistantApi;
use helper_core::types::{IngestReport, MetricsSnapshot, MetricsView};

use crate::error::AdminError;
use crate::gate::{BusyGate, GateState};

/// Result of a `run_ingest` call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestRun {
    /// Another ingest was outstanding; nothing was sent.
    Skipped,
    /// Ingest and the following metrics refresh both succeeded.
    Completed(IngestReport),
}

/// Owns the metrics snapshot and the ingest gate for one admin view.
pub struct AdminOperations {
    api: Arc<dyn AssistantApi>,
    gate: BusyGate,
    snapshot: Mutex<Option<MetricsSnapshot>>,
    activated: AtomicBool,
}

impl AdminOperations {
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self {
            api,
            gate: BusyGate::new(),
            snapshot: Mutex::new(None),
            activated: AtomicBool::new(false),
        }
    }

    /// Lifecycle hook for the admin view becoming active.
    ///
    /// Performs the initial metrics load the first time it is called and
    /// returns its result; later calls return `None` without a request.
    pub async fn activate(&self) -> Option<Result<MetricsSnapshot, AdminError>> {
        if self.activated.swap(true, Ordering::SeqCst) {
            return None;
        }
        tracing::debug!("Admin view activated, loading metrics");
        Some(self.refresh_metrics().await)
    }

    /// Fetch metrics and replace the snapshot wholesale.
    ///
    /// On failure the previous snapshot is kept and the error returned.
    /// Not gated: may run at any time, including during an ingest, and the
    /// last response to arrive wins.
    pub async fn refresh_metrics(&self) -> Result<MetricsSnapshot, AdminError> {
        match self.api.metrics().await {
            Ok(response) => {
                let snapshot = MetricsSnapshot::from(response);
                tracing::info!(
                    total_documents = snapshot.total_documents,
                    total_chunks = snapshot.total_chunks,
                    "Metrics refreshed"
                );
                *self.lock_snapshot() = Some(snapshot.clone());
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!(kind = %e.kind, error = %e, "Metrics refresh failed");
                Err(AdminError::Refresh(e))
            }
        }
    }

    /// Run one ingest, then refresh metrics, then reopen the gate.
    ///
    /// A call while another ingest is outstanding returns
    /// `IngestRun::Skipped`. The refresh is attempted whatever the ingest
    /// outcome; an ingest failure takes precedence over a refresh failure
    /// in the returned error.
    pub async fn run_ingest(&self) -> Result<IngestRun, AdminError> {
        let Some(_guard) = self.gate.try_enter() else {
            tracing::debug!("Ingest already running, ignoring request");
            return Ok(IngestRun::Skipped);
        };

        tracing::info!("Ingest started");
        let ingested = self.api.ingest().await;
        let refreshed = self.refresh_metrics().await;

        match (ingested, refreshed) {
            (Ok(report), Ok(_)) => {
                tracing::info!(
                    indexed_docs = report.indexed_docs,
                    indexed_chunks = report.indexed_chunks,
                    "Ingest completed"
                );
                Ok(IngestRun::Completed(report))
            }
            (Ok(_), Err(refresh_err)) => Err(refresh_err),
            (Err(e), refreshed) => {
                tracing::warn!(
                    kind = %e.kind,
                    error = %e,
                    refreshed = refreshed.is_ok(),
                    "Ingest failed"
                );
                Err(AdminError::Ingest(e))
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.current()
    }

    /// Last successfully fetched snapshot, if any.
    pub fn snapshot(&self) -> Option<MetricsSnapshot> {
        self.lock_snapshot().clone()
    }

    /// Display values, with defaults when nothing was fetched yet.
    pub fn view(&self) -> MetricsView {
        MetricsView::from_snapshot(self.lock_snapshot().as_ref())
    }

    fn lock_snapshot(&self) -> MutexGuard<'_, Option<MetricsSnapshot>> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Tests
// =============================================================================
