//! Error types for NetCDF parsing operations.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File could not be opened as NetCDF
    #[error("Failed to open NetCDF file {path}: {message}")]
    Open { path: String, message: String },

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Time units or calendar that cannot be decoded
    #[error("Cannot decode time axis: {0}")]
    TimeDecode(String),
}
