//! Media track abstraction.
//!
//! A session owns one track per media description in the presentation (audio,
//! video), keyed by the track's control URL from the SDP. The session layer
//! only drives track lifecycle; the actual packet relay lives behind the
//! [`Track`] trait so transports can be swapped without touching session
//! bookkeeping.

use crate::types::Ssrc;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// One proxied media stream within a session.
///
/// The session only ever drives a track through these two operations.
/// Implementations must not call back into the session that owns them from
/// either; the session holds its own lock while driving the track.
#[async_trait]
pub trait Track: fmt::Debug + Send + Sync {
    /// Records the SSRC the upstream server assigned to this track's RTP
    /// stream.
    async fn set_server_ssrc(&self, ssrc: Ssrc);

    /// Stops relaying and releases the track's resources. Idempotent.
    async fn close(&self);
}

/// Creates tracks for a session.
///
/// Injected into [`ProxySession::create`](crate::session::ProxySession::create)
/// so tests can substitute instrumented tracks for the relay implementation.
#[async_trait]
pub trait TrackFactory: fmt::Debug + Send + Sync {
    /// Builds the track for `control_url`.
    async fn create_track(&self, control_url: &str) -> Arc<dyn Track>;
}

/// Default [`Track`] implementation backing the RTP/RTCP relay.
#[derive(Debug)]
pub struct RelayTrack {
    control_url: String,
    server_ssrc: RwLock<Option<Ssrc>>,
    closed: AtomicBool,
}

impl RelayTrack {
    pub fn new(control_url: &str) -> Self {
        Self {
            control_url: control_url.to_string(),
            server_ssrc: RwLock::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Control URL this track was set up with.
    pub fn control_url(&self) -> &str {
        &self.control_url
    }

    /// SSRC last reported by the upstream server, if any.
    pub async fn server_ssrc(&self) -> Option<Ssrc> {
        self.server_ssrc.read().await.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Track for RelayTrack {
    async fn set_server_ssrc(&self, ssrc: Ssrc) {
        debug!("Track {}: server SSRC {}", self.control_url, ssrc);
        *self.server_ssrc.write().await = Some(ssrc);
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Closed track {}", self.control_url);
    }
}

/// Factory producing [`RelayTrack`]s.
#[derive(Debug, Default)]
pub struct RelayTrackFactory;

#[async_trait]
impl TrackFactory for RelayTrackFactory {
    async fn create_track(&self, control_url: &str) -> Arc<dyn Track> {
        Arc::new(RelayTrack::new(control_url))
    }
}
