use thiserror::Error;

/// Top-level error type for Zion.
///
/// Subsystem crates define their own error types and implement
/// `From<ZionError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ZionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ZionError {
    fn from(err: toml::de::Error) -> Self {
        ZionError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ZionError {
    fn from(err: toml::ser::Error) -> Self {
        ZionError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ZionError {
    fn from(err: serde_json::Error) -> Self {
        ZionError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Zion operations.
pub type Result<T> = std::result::Result<T, ZionError>;
