//! Error types for the carbon-resolve crate.
//!
//! Messages are stable and never include provider secrets. Only
//! [`ResolveError::NoCredentialsAvailable`] and [`ResolveError::Config`]
//! abort a resolution; every other variant is absorbed per item.

/// Errors that can occur while resolving items against ranking providers.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// An input item could not be canonicalised.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The primary provider exhausted every attempt without an accepted payload.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A single secondary provider call failed.
    #[error("provider call failed: {0}")]
    ProviderCallFailed(String),

    /// No usable credential exists, so no provider call can be attempted.
    #[error("no credentials available: {0}")]
    NoCredentialsAvailable(String),

    /// A provider response could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// An HTTP request to a provider failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid resolution configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl ResolveError {
    /// Returns `true` if this error must abort the whole resolution.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NoCredentialsAvailable(_) | Self::Config(_))
    }
}

/// Convenience type alias for carbon-resolve results.
pub type Result<T> = std::result::Result<T, ResolveError>;
