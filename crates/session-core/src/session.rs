//! Proxied RTSP session.
//!
//! A [`ProxySession`] ties one client-facing RTSP session to one
//! server-facing RTSP session and owns the media tracks relayed between them.
//! It is created when a SETUP arrives from a client, bound when the upstream
//! server answers with its own session ID, and closed on TEARDOWN or timeout.
//!
//! ```text
//!  SETUP from client          SETUP reply from server        TEARDOWN
//!        │                             │                         │
//!        ▼                             ▼                         ▼
//!   create()                set_server_session_id()           close()
//!   mint client ID,         register server ID,           close tracks,
//!   register client ID      state Created -> Bound        drop registrations
//! ```
//!
//! All state transitions run under the session's own lock, and identifier
//! changes update the shared [`SessionRegistry`] from inside that critical
//! section, so the registry never points at a closed session and never holds
//! a stale identifier.

use crate::errors::{Result, SessionError};
use crate::generator;
use crate::registry::SessionRegistry;
use crate::track::{Track, TrackFactory};
use crate::types::{ClientSessionId, ServerSessionId, SessionState, Ssrc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Mutable session state, guarded by the session lock.
struct SessionInner {
    /// ID the proxy issued to the client. Always registered while the
    /// session is open.
    client_id: ClientSessionId,

    /// ID the upstream server issued, once known.
    server_id: Option<ServerSessionId>,

    state: SessionState,

    /// Media tracks keyed by their SDP control URL.
    tracks: HashMap<String, Arc<dyn Track>>,
}

/// One client-to-server session pair and its media tracks.
///
/// Shared as `Arc<ProxySession>`: the registry holds one reference per
/// identifier, request handlers hold theirs for the duration of a request.
/// [`close`](Self::close) drops the registry's references, after which the
/// session is unreachable by ID and freed once the last handler lets go.
pub struct ProxySession {
    registry: Arc<SessionRegistry>,
    track_factory: Arc<dyn TrackFactory>,

    /// Handle to our own `Arc`, for re-registering under new identifiers.
    self_handle: Weak<ProxySession>,

    inner: RwLock<SessionInner>,
}

impl ProxySession {
    /// Creates a session, minting a fresh client session ID and registering
    /// it in `registry`.
    ///
    /// The ID is drawn at random and reserved atomically; a candidate already
    /// held by a live session is discarded and redrawn.
    pub fn create(
        registry: Arc<SessionRegistry>,
        track_factory: Arc<dyn TrackFactory>,
    ) -> Arc<Self> {
        loop {
            let candidate = generator::random_client_session_id();
            let session = Arc::new_cyclic(|handle| Self {
                registry: Arc::clone(&registry),
                track_factory: Arc::clone(&track_factory),
                self_handle: handle.clone(),
                inner: RwLock::new(SessionInner {
                    client_id: candidate.clone(),
                    server_id: None,
                    state: SessionState::Created,
                    tracks: HashMap::new(),
                }),
            });
            if registry.try_reserve_client_id(&candidate, &session) {
                debug!("Created proxy session {}", candidate);
                return session;
            }
            // Collision: drop this instance and roll a new candidate.
        }
    }

    /// ID the proxy issued to the client.
    pub async fn client_session_id(&self) -> ClientSessionId {
        self.inner.read().await.client_id.clone()
    }

    /// ID the upstream server issued, if the session is bound.
    pub async fn server_session_id(&self) -> Option<ServerSessionId> {
        self.inner.read().await.server_id.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.read().await.state == SessionState::Closed
    }

    /// Track registered under `control_url`, if any.
    pub async fn track(&self, control_url: &str) -> Option<Arc<dyn Track>> {
        self.inner.read().await.tracks.get(control_url).map(Arc::clone)
    }

    pub async fn track_count(&self) -> usize {
        self.inner.read().await.tracks.len()
    }

    /// Replaces the client-leg identifier.
    ///
    /// The old registry entry is removed before the new one is inserted, so a
    /// lookup never resolves the session under an identifier it no longer
    /// has.
    pub async fn set_client_session_id(&self, id: ClientSessionId) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.state == SessionState::Closed {
            return Err(SessionError::SessionClosed(inner.client_id.clone()));
        }
        let this = self.upgrade_handle();
        let old = std::mem::replace(&mut inner.client_id, id.clone());
        self.registry.remove_client_entry(&old, self);
        self.registry.register_client(id.clone(), this);
        debug!("Session {} renamed client ID to {}", old, id);
        Ok(())
    }

    /// Records the server-leg identifier and registers the session under it,
    /// moving the session to [`SessionState::Bound`].
    ///
    /// A previously recorded server ID is deregistered first.
    pub async fn set_server_session_id(&self, id: ServerSessionId) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.state == SessionState::Closed {
            return Err(SessionError::SessionClosed(inner.client_id.clone()));
        }
        let this = self.upgrade_handle();
        if let Some(old) = inner.server_id.replace(id.clone()) {
            self.registry.remove_server_entry(&old, self);
        }
        self.registry.register_server(id.clone(), this);
        if inner.state == SessionState::Created {
            inner.state = SessionState::Bound;
        }
        debug!("Session {} bound to server session {}", inner.client_id, id);
        Ok(())
    }

    /// Creates a track for `control_url` and registers it in the session,
    /// recording the server's SSRC on it when one is already known.
    ///
    /// A track already registered under the same control URL is closed and
    /// replaced.
    pub async fn add_track(
        &self,
        control_url: &str,
        server_ssrc: Option<Ssrc>,
    ) -> Result<Arc<dyn Track>> {
        let mut inner = self.inner.write().await;
        if inner.state == SessionState::Closed {
            return Err(SessionError::SessionClosed(inner.client_id.clone()));
        }
        let track = self.track_factory.create_track(control_url).await;
        if let Some(ssrc) = server_ssrc {
            track.set_server_ssrc(ssrc).await;
        }
        if let Some(previous) = inner.tracks.insert(control_url.to_string(), Arc::clone(&track)) {
            // Same control URL set up twice; the displaced track must stop
            // relaying before the new one takes over.
            previous.close().await;
        }
        debug!("Session {} added track {}", inner.client_id, control_url);
        Ok(track)
    }

    /// Closes the session: closes every track, marks the session
    /// [`SessionState::Closed`] and removes both identifier registrations.
    ///
    /// Idempotent; calling it on a closed session does nothing. The whole
    /// teardown runs under one acquisition of the session lock, so no caller
    /// can observe a session that is closed but still registered.
    pub async fn close(&self) {
        let mut inner = self.inner.write().await;
        if inner.state == SessionState::Closed {
            return;
        }
        for (_, track) in inner.tracks.drain() {
            track.close().await;
        }
        inner.state = SessionState::Closed;
        self.registry
            .unregister(&inner.client_id, inner.server_id.as_ref(), self);
        info!("Closed proxy session {}", inner.client_id);
    }

    /// Strong reference to ourselves, for handing to the registry.
    fn upgrade_handle(&self) -> Arc<ProxySession> {
        // Cannot fail: &self proves a strong reference is still alive.
        self.self_handle
            .upgrade()
            .expect("live session has a strong reference")
    }
}

impl fmt::Debug for ProxySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ProxySession");
        match self.inner.try_read() {
            Ok(inner) => s
                .field("client_id", &inner.client_id)
                .field("server_id", &inner.server_id)
                .field("state", &inner.state)
                .field("tracks", &inner.tracks.len())
                .finish(),
            Err(_) => s.finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::RelayTrackFactory;

    fn new_session() -> (Arc<SessionRegistry>, Arc<ProxySession>) {
        let registry = Arc::new(SessionRegistry::new());
        let session = ProxySession::create(Arc::clone(&registry), Arc::new(RelayTrackFactory));
        (registry, session)
    }

    #[tokio::test]
    async fn test_create_registers_client_id() {
        let (registry, session) = new_session();
        let id = session.client_session_id().await;

        assert_eq!(session.state().await, SessionState::Created);
        let found = registry.by_client_id(&id).unwrap();
        assert!(Arc::ptr_eq(&found, &session));
    }

    #[tokio::test]
    async fn test_binding_moves_state() {
        let (registry, session) = new_session();

        session.set_server_session_id("srv-42".into()).await.unwrap();
        assert_eq!(session.state().await, SessionState::Bound);
        assert_eq!(session.server_session_id().await, Some("srv-42".into()));

        let found = registry.by_server_id(&"srv-42".into()).unwrap();
        assert!(Arc::ptr_eq(&found, &session));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_mutation() {
        let (_registry, session) = new_session();
        let id = session.client_session_id().await;
        session.close().await;

        let err = session.set_server_session_id("srv-1".into()).await.unwrap_err();
        assert_eq!(err, SessionError::SessionClosed(id));
    }
}
