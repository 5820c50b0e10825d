//! Shared test doubles for session tests.
//!
//! `CountingTrack` stands in for the relay track and records every lifecycle
//! call, so tests can assert that sessions drive their tracks exactly once
//! and in the right order.

use async_trait::async_trait;
use rtspx_session_core::{ProxySession, SessionRegistry, Ssrc, Track, TrackFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Track double that counts lifecycle calls instead of relaying media.
#[derive(Debug)]
pub struct CountingTrack {
    control_url: String,
    close_count: AtomicUsize,
    last_ssrc: Mutex<Option<Ssrc>>,
}

impl CountingTrack {
    pub fn new(control_url: &str) -> Self {
        Self {
            control_url: control_url.to_string(),
            close_count: AtomicUsize::new(0),
            last_ssrc: Mutex::new(None),
        }
    }

    /// Control URL this track was created for.
    pub fn control_url(&self) -> &str {
        &self.control_url
    }

    /// How many times `close` was called.
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    /// Most recent SSRC recorded on this track.
    pub fn last_ssrc(&self) -> Option<Ssrc> {
        self.last_ssrc.lock().unwrap().clone()
    }
}

#[async_trait]
impl Track for CountingTrack {
    async fn set_server_ssrc(&self, ssrc: Ssrc) {
        *self.last_ssrc.lock().unwrap() = Some(ssrc);
    }

    async fn close(&self) {
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory producing [`CountingTrack`]s and remembering every one it made.
#[derive(Debug, Default)]
pub struct CountingTrackFactory {
    created: Mutex<Vec<Arc<CountingTrack>>>,
}

impl CountingTrackFactory {
    /// Every track this factory has created, in creation order.
    pub fn created(&self) -> Vec<Arc<CountingTrack>> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackFactory for CountingTrackFactory {
    async fn create_track(&self, control_url: &str) -> Arc<dyn Track> {
        let track = Arc::new(CountingTrack::new(control_url));
        self.created.lock().unwrap().push(Arc::clone(&track));
        track
    }
}

/// Creates a session wired to the given registry and counting factory.
///
/// Keeps the concrete factory handle for `created()` assertions while the
/// session gets its `Arc<dyn TrackFactory>` view.
pub fn create_session(
    registry: &Arc<SessionRegistry>,
    factory: &Arc<CountingTrackFactory>,
) -> Arc<ProxySession> {
    ProxySession::create(Arc::clone(registry), factory.clone() as Arc<dyn TrackFactory>)
}
