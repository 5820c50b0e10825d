//! # RTSPX Session Core
//!
//! Session identity bridging for the RTSPX streaming proxy.
//!
//! An RTSP proxy terminates two sessions per viewer: one with the client and
//! one with the upstream media server, each under its own session ID. This
//! crate owns that pairing. It mints the client-leg IDs, records the
//! server-leg IDs, resolves incoming messages to their session from either
//! ID, and drives the lifecycle of the media tracks relayed in between.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────┐
//!   client ID ──────▶│   SessionRegistry   │◀────── server ID
//!                    │ by_client_id        │
//!                    │ by_server_id        │
//!                    └──────────┬──────────┘
//!                               │ Arc<ProxySession>
//!                               ▼
//!                    ┌─────────────────────┐
//!                    │    ProxySession     │
//!                    │ ids, state,         │──▶ Track (audio)
//!                    │ track table         │──▶ Track (video)
//!                    └─────────────────────┘
//! ```
//!
//! The registry is injected, not global: each proxy instance builds its own
//! and shares it by `Arc`. Sessions keep their registrations consistent from
//! inside their own critical sections, so lookups are always either a live
//! session or `None`, never a closed one.
//!
//! ## Usage
//!
//! ```rust
//! use rtspx_session_core::{ProxySession, RelayTrackFactory, SessionRegistry, Ssrc};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = Arc::new(SessionRegistry::new());
//!
//! // SETUP from a client: mint a session with a fresh client-leg ID.
//! let session = ProxySession::create(Arc::clone(&registry), Arc::new(RelayTrackFactory));
//!
//! // SETUP reply from the server: record its session ID and the track.
//! session.set_server_session_id("661885263".into()).await.unwrap();
//! session
//!     .add_track("rtsp://cam.example/stream/trackID=1", Some(Ssrc::from("3A2F")))
//!     .await
//!     .unwrap();
//!
//! // Later messages resolve the session from either leg's ID.
//! let client_id = session.client_session_id().await;
//! assert!(registry.by_client_id(&client_id).is_some());
//!
//! // TEARDOWN: tracks close, both IDs drop out of the registry.
//! session.close().await;
//! assert!(registry.by_client_id(&client_id).is_none());
//! # }
//! ```

pub mod errors;
pub mod generator;
pub mod registry;
pub mod session;
pub mod track;
pub mod types;

pub use errors::{Result, SessionError};
pub use registry::{RegistryStats, SessionRegistry};
pub use session::ProxySession;
pub use track::{RelayTrack, RelayTrackFactory, Track, TrackFactory};
pub use types::{ClientSessionId, ServerSessionId, SessionState, Ssrc};
