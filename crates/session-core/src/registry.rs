//! Session registry.
//!
//! Requests on the client leg carry the proxy-issued session ID while
//! responses on the server leg carry the upstream server's ID, so the proxy
//! has to resolve a session from either token. The registry keeps one
//! concurrent map per namespace, both pointing at the same
//! [`ProxySession`](crate::session::ProxySession) values.
//!
//! The registry is plain shared state: create one per proxy instance and hand
//! an `Arc` of it to whoever resolves or creates sessions. Sessions insert and
//! remove their own entries as their identifiers change; lookups never block
//! on a session's internal lock.

use crate::session::ProxySession;
use crate::types::{ClientSessionId, ServerSessionId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Concurrent map from session identifiers (both namespaces) to live
/// sessions.
#[derive(Default)]
pub struct SessionRegistry {
    /// Sessions keyed by the ID the proxy issued to the client.
    by_client_id: DashMap<ClientSessionId, Arc<ProxySession>>,

    /// Sessions keyed by the ID the upstream server issued.
    by_server_id: DashMap<ServerSessionId, Arc<ProxySession>>,

    /// Sessions ever registered.
    total_created: AtomicU64,

    /// Sessions closed so far.
    total_closed: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a session by the client-leg identifier.
    pub fn by_client_id(&self, id: &ClientSessionId) -> Option<Arc<ProxySession>> {
        self.by_client_id.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Resolves a session by the server-leg identifier.
    pub fn by_server_id(&self, id: &ServerSessionId) -> Option<Arc<ProxySession>> {
        self.by_server_id.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Reserves `id` for `session` if no session holds it yet.
    ///
    /// Checking and inserting happen under one map entry, so two sessions
    /// drawing the same candidate cannot both win.
    pub(crate) fn try_reserve_client_id(
        &self,
        id: &ClientSessionId,
        session: &Arc<ProxySession>,
    ) -> bool {
        match self.by_client_id.entry(id.clone()) {
            Entry::Occupied(_) => {
                debug!("Client session ID {} already reserved", id);
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(session));
                self.total_created.fetch_add(1, Ordering::Relaxed);
                true
            }
        }
    }

    /// Registers `session` under a client-leg identifier, replacing any
    /// previous holder of that key.
    pub(crate) fn register_client(&self, id: ClientSessionId, session: Arc<ProxySession>) {
        self.by_client_id.insert(id, session);
    }

    /// Registers `session` under a server-leg identifier, replacing any
    /// previous holder of that key.
    pub(crate) fn register_server(&self, id: ServerSessionId, session: Arc<ProxySession>) {
        debug!("Registered server session ID {}", id);
        self.by_server_id.insert(id, session);
    }

    /// Removes the client-leg entry for `id`, but only if it still points at
    /// `session`. A key that was since re-registered to another session is
    /// left alone.
    pub(crate) fn remove_client_entry(&self, id: &ClientSessionId, session: &ProxySession) {
        let ptr = session as *const ProxySession;
        self.by_client_id
            .remove_if(id, |_, existing| std::ptr::eq(Arc::as_ptr(existing), ptr));
    }

    /// Removes the server-leg entry for `id`, but only if it still points at
    /// `session`.
    pub(crate) fn remove_server_entry(&self, id: &ServerSessionId, session: &ProxySession) {
        let ptr = session as *const ProxySession;
        self.by_server_id
            .remove_if(id, |_, existing| std::ptr::eq(Arc::as_ptr(existing), ptr));
    }

    /// Drops every entry belonging to a session that is closing.
    pub(crate) fn unregister(
        &self,
        client_id: &ClientSessionId,
        server_id: Option<&ServerSessionId>,
        session: &ProxySession,
    ) {
        self.remove_client_entry(client_id, session);
        if let Some(server_id) = server_id {
            self.remove_server_entry(server_id, session);
        }
        self.total_closed.fetch_add(1, Ordering::Relaxed);
        debug!("Unregistered session {}", client_id);
    }

    /// Number of sessions currently registered on the client leg.
    pub fn active_sessions(&self) -> usize {
        self.by_client_id.len()
    }

    /// Snapshot of registry counters.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            client_ids: self.by_client_id.len(),
            server_ids: self.by_server_id.len(),
            total_created: self.total_created.load(Ordering::Relaxed),
            total_closed: self.total_closed.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("client_ids", &self.by_client_id.len())
            .field("server_ids", &self.by_server_id.len())
            .finish()
    }
}

/// Registry counters, for diagnostics and shutdown checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    /// Entries in the client-leg map.
    pub client_ids: usize,
    /// Entries in the server-leg map.
    pub server_ids: usize,
    /// Sessions ever created.
    pub total_created: u64,
    /// Sessions closed.
    pub total_closed: u64,
}
