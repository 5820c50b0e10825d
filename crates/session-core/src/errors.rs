//! Error types for session-core operations.

use crate::types::ClientSessionId;
use thiserror::Error;

/// Errors produced by session lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The session was closed and can no longer be mutated.
    #[error("Session {0} is closed")]
    SessionClosed(ClientSessionId),
}

/// Result type for session-core operations.
pub type Result<T> = std::result::Result<T, SessionError>;
