//! Busy gate around the ingest action.
//!
//! Two states with two valid transitions:
//! - Idle -> Ingesting (ingest accepted)
//! - Ingesting -> Idle (ingest and its metrics refresh have both settled)
//!
//! A request to enter while Ingesting is absorbed, never queued.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::AdminError;

/// State of the ingest gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateState {
    /// No ingest outstanding.
    Idle,
    /// An ingest call, or the refresh that follows it, is outstanding.
    Ingesting,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Idle => write!(f, "Idle"),
            GateState::Ingesting => write!(f, "Ingesting"),
        }
    }
}

impl GateState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &GateState) -> bool {
        matches!(
            (self, target),
            (GateState::Idle, GateState::Ingesting) | (GateState::Ingesting, GateState::Idle)
        )
    }
}

/// Mutual-exclusion flag for the ingest action.
#[derive(Debug)]
pub struct BusyGate {
    state: Mutex<GateState>,
}

impl Default for BusyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyGate {
    /// Create a gate in the `Idle` state.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
        }
    }

    pub fn current(&self) -> GateState {
        *self.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.current() == GateState::Ingesting
    }

    /// Attempt a validated transition to `target`.
    pub fn transition(&self, target: GateState) -> Result<(), AdminError> {
        let mut state = self.lock();
        if state.can_transition_to(&target) {
            tracing::debug!("Ingest gate: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(AdminError::InvalidTransition {
                from: *state,
                to: target,
            })
        }
    }

    /// Close the gate, returning a guard that reopens it on drop.
    ///
    /// Returns `None` when the gate is already closed.
    pub fn try_enter(&self) -> Option<GateGuard<'_>> {
        self.transition(GateState::Ingesting).ok()?;
        Some(GateGuard { gate: self })
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the gate closed; reopens it when dropped, on every exit path.
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a BusyGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.gate.transition(GateState::Idle) {
            tracing::warn!(error = %e, "Ingest gate was not closed on release");
        }
    }
}
