//! Error types for coordinator operations.

use thiserror::Error;

/// Error raised inside a coordinator operation.
///
/// Never returned to callers: every operation converts it into its
/// pass-through value after logging.
#[derive(Debug, Error)]
pub enum OverrideError {
    /// The request URI could not be parsed.
    #[error("invalid uri: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// A collaborator returned data the coordinator cannot use.
    #[error("unexpected state: {0}")]
    UnexpectedState(String),
}
