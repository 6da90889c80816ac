//! Admin operations controller.
//!
//! Serialises the ingest action behind a busy gate and keeps the metrics
//! snapshot current, refreshing it after every ingest before the gate opens.

pub mod error;
pub mod gate;
pub mod operations;

pub use error::AdminError;
pub use gate::{BusyGate, GateGuard, GateState};
pub use operations::{AdminOperations, IngestRun};
