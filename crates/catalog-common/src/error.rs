//! Error types for catalog building and merging.

use thiserror::Error;

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Primary error type for catalog operations.
///
/// Unparseable assets never surface here; parsers report them as
/// [`crate::ParseOutcome::Invalid`] instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    // === Table Errors ===
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid value for column '{column}': {value}")]
    InvalidValue { column: String, value: String },

    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to fetch remote catalog: {0}")]
    Remote(String),
}

impl CatalogError {
    /// Shorthand for an [`CatalogError::InvalidConfig`] error.
    pub fn config(message: impl Into<String>) -> Self {
        CatalogError::InvalidConfig(message.into())
    }

    /// Whether this error was raised before any scanning or writing began.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidConfig(_) | CatalogError::Glob { .. } | CatalogError::ThreadPool(_)
        )
    }
}
