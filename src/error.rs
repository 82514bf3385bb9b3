//! Error types for the carbon request shell.

use carbon_resolve::ResolveError;

/// Top-level error type for carbon.
#[derive(Debug, thiserror::Error)]
pub enum CarbonError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Resolution error from the engine.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Report rendering error.
    #[error("report error: {0}")]
    Report(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Host channel read/write error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CarbonError>;
