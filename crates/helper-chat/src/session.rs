//! Turn history and the in-flight question lifecycle.
//!
//! Lifecycle of one `submit`:
//! - user turn appended, `pending` set, draft cleared
//! - ask issued (the only suspension point)
//! - exactly one assistant turn appended, answer or error
//! - `pending` cleared
//!
//! Dropping the `submit` future mid-call still settles the question with a
//! `"Error: request cancelled"` turn.
//!
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`, so interleaved futures see `pending` as the only re-entrancy gate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use helper_client::{ApiError, AssistantApi};
use helper_core::config::ChatConfig;
use helper_core::types::{AskRequest, Turn};

/// Message of the error turn appended when a question is abandoned mid-call.
pub const CANCELLED_MESSAGE: &str = "request cancelled";

/// Why a `submit` call was absorbed without issuing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The text was empty or whitespace only.
    Empty,
    /// Another question is still outstanding.
    Pending,
}

/// Result of a `submit` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// An answer turn was appended.
    Answered,
    /// An error turn was appended; the original failure is attached.
    Failed(ApiError),
    /// Nothing was appended and no request was made.
    Rejected(RejectReason),
}

#[derive(Debug, Default)]
struct SessionState {
    turns: Vec<Turn>,
    pending: bool,
    draft: String,
}

/// One conversation against the backend.
pub struct ConversationSession {
    api: Arc<dyn AssistantApi>,
    config: ChatConfig,
    state: Mutex<SessionState>,
}

impl ConversationSession {
    /// Create an empty session that asks through `api`.
    pub fn new(api: Arc<dyn AssistantApi>, config: ChatConfig) -> Self {
        Self {
            api,
            config,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Ask `text` and append the outcome to the history.
    ///
    /// Empty input and calls made while a question is outstanding are
    /// no-ops. Otherwise exactly one user turn and, once the backend call
    /// settles, exactly one assistant turn are appended. Failures become an
    /// `"Error: <message>"` turn; nothing is retried.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring empty question");
            return SubmitOutcome::Rejected(RejectReason::Empty);
        }

        {
            let mut state = self.lock();
            if state.pending {
                tracing::debug!("Ignoring question while another is pending");
                return SubmitOutcome::Rejected(RejectReason::Pending);
            }
            state.turns.push(Turn::user(text));
            state.pending = true;
            state.draft.clear();
        }
        let pending = PendingGuard::new(&self.state);

        tracing::info!(question_len = text.len(), top_k = self.config.top_k, "Submitting question");
        let request = AskRequest::new(text).with_top_k(self.config.top_k);
        let result = self.api.ask(&request).await;

        match result {
            Ok(response) => {
                tracing::info!(
                    citations = response.citations.len(),
                    chunks = response.chunks.len(),
                    "Answer received"
                );
                pending.settle(Turn::answer(response));
                SubmitOutcome::Answered
            }
            Err(err) => {
                tracing::warn!(kind = %err.kind, error = %err, "Question failed");
                pending.settle(Turn::error(&err));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Replace the uncommitted input buffer. Allowed at any time.
    pub fn update_draft(&self, text: impl Into<String>) {
        self.lock().draft = text.into();
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    /// Whether a question is outstanding.
    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// Copy of the history in display order.
    pub fn turns(&self) -> Vec<Turn> {
        self.lock().turns.clone()
    }

    pub fn turn_count(&self) -> usize {
        self.lock().turns.len()
    }

    pub fn last_turn(&self) -> Option<Turn> {
        self.lock().turns.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Closes the outstanding question when dropped.
///
/// `settle` appends the assistant turn and clears `pending`. If the `submit`
/// future is dropped before the ask returns, the drop appends a
/// cancellation error turn instead, so the user turn still gets its answer
/// and the session accepts new questions.
struct PendingGuard<'a> {
    state: &'a Mutex<SessionState>,
    settled: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(state: &'a Mutex<SessionState>) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    fn settle(mut self, turn: Turn) {
        let mut state = lock_state(self.state);
        state.turns.push(turn);
        state.pending = false;
        self.settled = true;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::warn!("Question dropped before the backend answered");
        let mut state = lock_state(self.state);
        state.turns.push(Turn::error(CANCELLED_MESSAGE));
        state.pending = false;
    }
}

// =============================================================================
// Tests
// =============================================================================
