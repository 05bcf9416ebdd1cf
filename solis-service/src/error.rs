//! Error types for the solis-service crate.

/// Errors from the polling service.
///
/// Only construction can fail; a running service reports trouble through
/// [`CycleStatus`](crate::CycleStatus) and the log, never through errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The supplied portal configuration matched no usable API client
    #[error("Portal configuration rejected: {0}")]
    Config(#[from] solis_api::ApiError),
}

/// Convenience type alias for Results using ServiceError.
pub type Result<T> = std::result::Result<T, ServiceError>;
