//! Shared domain types, configuration, and errors for the Policy & Product Helper client.

pub mod config;
pub mod error;
pub mod types;

pub use config::HelperConfig;
pub use error::{HelperError, Result};
pub use types::*;
