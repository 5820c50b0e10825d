//! Walks one proxied session through the SETUP / reply / TEARDOWN flow.
//!
//! Run with:
//! ```bash
//! RUST_LOG=debug cargo run --example session_flow
//! ```

use rtspx_session_core::{ProxySession, RelayTrackFactory, SessionRegistry, Ssrc};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let registry = Arc::new(SessionRegistry::new());

    // Client sends SETUP: mint a session and a client-leg ID for it.
    let session = ProxySession::create(Arc::clone(&registry), Arc::new(RelayTrackFactory));
    let client_id = session.client_session_id().await;
    info!("Issued client session ID {}", client_id);

    // Upstream server answers with its own session ID and per-track SSRCs.
    session.set_server_session_id("661885263".into()).await?;
    session
        .add_track("rtsp://cam.example/stream/trackID=1", Some(Ssrc::from("3A2F")))
        .await?;
    session
        .add_track("rtsp://cam.example/stream/trackID=2", Some(Ssrc::from("9B10")))
        .await?;
    info!(
        "Session bound: state={} tracks={}",
        session.state().await,
        session.track_count().await
    );

    // Messages on either leg resolve to the same session.
    let from_client = registry.by_client_id(&client_id);
    let from_server = registry.by_server_id(&"661885263".into());
    info!(
        "Lookups: client leg {} server leg {}",
        from_client.is_some(),
        from_server.is_some()
    );

    // Client sends TEARDOWN: tracks close, both IDs vanish.
    session.close().await;
    let stats = registry.stats();
    info!(
        "After teardown: active={} created={} closed={}",
        registry.active_sessions(),
        stats.total_created,
        stats.total_closed
    );

    Ok(())
}
