//! Client for the Policy & Product Helper backend.
//!
//! Exposes the `AssistantApi` capability consumed by the chat and admin
//! controllers, and an HTTP implementation over reqwest. Every failure is
//! normalised into a single `ApiError` carrying a human-readable message.

pub mod api;
pub mod error;
pub mod http;

pub use api::AssistantApi;
pub use error::{ApiError, ApiErrorKind};
pub use http::HttpApiClient;
