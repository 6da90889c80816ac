//! Error types for admin operations.

use helper_client::ApiError;
use helper_core::error::HelperError;

use crate::gate::GateState;

/// Errors surfaced by the admin controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdminError {
    #[error("ingest failed: {0}")]
    Ingest(ApiError),
    #[error("metrics refresh failed: {0}")]
    Refresh(ApiError),
    #[error("invalid gate transition: {from} -> {to}")]
    InvalidTransition { from: GateState, to: GateState },
}

impl AdminError {
    /// The underlying backend failure, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AdminError::Ingest(e) | AdminError::Refresh(e) => Some(e),
            AdminError::InvalidTransition { .. } => None,
        }
    }
}

impl From<AdminError> for HelperError {
    fn from(err: AdminError) -> Self {
        HelperError::Admin(err.to_string())
    }
}
