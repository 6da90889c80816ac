//! Conversation session controller.
//!
//! Drives the single-question/single-answer lifecycle against the backend
//! and keeps the append-only turn history shown by the chat view.

pub mod session;

pub use session::{ConversationSession, RejectReason, SubmitOutcome, CANCELLED_MESSAGE};
