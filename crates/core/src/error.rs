//! Error types for the Wellspring domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Service failures are
//! fatal for the current user-initiated operation only: the caller surfaces
//! them inline and the session transcript stays untouched for that turn.
//! There are no retries and no partial-failure recovery anywhere.

use thiserror::Error;

/// A failure talking to one of the external backends (search, completion,
/// document storage). Always fatal for the operation that issued the call.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Backend request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The backend answered, but the payload did not parse into the expected
    /// result structure. Never partially recovered.
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}
