use thiserror::Error;

/// Top-level error type for the helper client.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for HelperError` so that `?` works across
/// crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HelperError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Admin error: {0}")]
    Admin(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for HelperError {
    fn from(err: toml::de::Error) -> Self {
        HelperError::Config(err.to_string())
    }
}

/// A specialized `Result` type for helper operations.
pub type Result<T> = std::result::Result<T, HelperError>;
