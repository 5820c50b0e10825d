//! Identifier and state types shared across the session layer.
//!
//! RTSP carries session identity as opaque string tokens. The proxy mints its
//! own tokens for the client leg and records whatever the upstream server
//! issues for the server leg, so the two namespaces get distinct newtypes to
//! keep them from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Session identifier the proxy hands to the client.
///
/// Generated as a uniformly random unsigned 64-bit integer rendered in
/// decimal (see [`crate::generator`]); unique among registered client IDs for
/// as long as the owning session is live.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClientSessionId(pub String);

impl ClientSessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientSessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ClientSessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Session identifier issued by the upstream media server.
///
/// Opaque to the proxy: stored and matched byte-for-byte, never validated
/// beyond uniqueness among registered server IDs.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ServerSessionId(pub String);

impl ServerSessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ServerSessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ServerSessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Synchronization source token for a track's RTP stream, as carried in the
/// RTSP `Transport` header. Opaque at this layer.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ssrc(pub String);

impl Ssrc {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ssrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Ssrc {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Ssrc {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle of a proxied session.
///
/// ```text
/// Created ──set_server_session_id──▶ Bound ──close──▶ Closed
///    │                                                   ▲
///    └──────────────────── close ────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum SessionState {
    /// Client ID registered, no server ID yet.
    Created,
    /// Both client and server IDs registered.
    Bound,
    /// Terminal: tracks closed, IDs deregistered.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Created => write!(f, "Created"),
            SessionState::Bound => write!(f, "Bound"),
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}
