//! Error types for the solis-api crate.

/// Errors from the portal capability layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The supplied portal configuration is unusable
    #[error("Invalid portal configuration: {0}")]
    InvalidConfig(String),

    /// An HTTP round-trip failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The portal accepted the request but rejected its content
    #[error("Portal rejected the request: {0}")]
    Portal(String),

    /// A portal response could not be interpreted
    #[error("Failed to parse portal response: {0}")]
    Parse(String),
}

/// Convenience type alias for Results using ApiError.
pub type Result<T> = std::result::Result<T, ApiError>;
