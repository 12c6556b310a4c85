//! Error types reported by external collaborators.

use thiserror::Error;

/// Error returned by a [`StreamFetcher`](crate::StreamFetcher).
///
/// A failed fetch is never fatal: the registry logs it and completes the
/// handle without a payload, so playback keeps the original data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The alternate source answered with a non-success status.
    #[error("{client} not available with response code: {status}")]
    Unavailable {
        /// Name of the client the request was sent as.
        client: String,
        /// HTTP status code of the response.
        status: u16,
    },

    /// The response could not be parsed into streaming data.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Network interaction error.
    #[error(transparent)]
    Connection(Box<dyn std::error::Error + Send + Sync>),

    /// The fetch was cancelled by the registry's timeout policy.
    #[error("fetch timed out")]
    Timeout,
}

/// Error returned by a [`TokenWarmup`](crate::TokenWarmup).
#[derive(Debug, Error)]
pub enum WarmupError {
    /// The platform cannot host the token generator.
    #[error("token generator is not supported on this platform")]
    Unsupported,

    /// Visitor data needed for the token could not be obtained.
    #[error("visitor data is missing")]
    MissingVisitorData,

    /// Any other failure in the warm-up path.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
