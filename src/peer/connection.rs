//! Peer connection factory
//!
//! Builds the `RTCPeerConnection` from a resolved signaling configuration
//! and wires the single inbound-track handler to the track router. No
//! network I/O happens here; construction failures propagate to the caller
//! as fatal startup errors.

use crate::error::{Error, Result};
use crate::media::TrackRouter;
use crate::signaling::protocol::SignalingConfig;
use std::sync::Arc;
use tracing::debug;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::RTCPeerConnection;

/// Map the signaling wire configuration onto the WebRTC stack's
/// configuration
pub(crate) fn rtc_configuration(config: &SignalingConfig) -> RTCConfiguration {
    let ice_servers: Vec<RTCIceServer> = config
        .ice_servers
        .iter()
        .map(|server| {
            #[allow(clippy::needless_update)]
            RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
                ..Default::default()
            }
        })
        .collect();

    RTCConfiguration {
        ice_servers,
        ..Default::default()
    }
}

/// Create the peer connection and register the inbound-track handler
pub(crate) async fn create_connection(
    config: &SignalingConfig,
    router: Arc<TrackRouter>,
) -> Result<Arc<RTCPeerConnection>> {
    // MediaEngine with default codecs (Opus audio, VP8/VP9/H.264 video)
    let mut media_engine = MediaEngine::default();
    media_engine
        .register_default_codecs()
        .map_err(|e| Error::PeerConnectionError(format!("failed to register codecs: {}", e)))?;

    let registry = register_default_interceptors(Registry::new(), &mut media_engine)
        .map_err(|e| Error::PeerConnectionError(format!("failed to register interceptors: {}", e)))?;

    let api = APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build();

    let pc = Arc::new(
        api.new_peer_connection(rtc_configuration(config))
            .await
            .map_err(|e| {
                Error::PeerConnectionError(format!("failed to create peer connection: {}", e))
            })?,
    );

    // Exactly one track listener; tracks may arrive at any point relative
    // to negotiation completion.
    pc.on_track(Box::new(move |track, _receiver, _transceiver| {
        let router = Arc::clone(&router);
        Box::pin(async move {
            router.route(track);
        })
    }));

    pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
        debug!(?state, "peer connection state changed");
        Box::pin(async {})
    }));

    Ok(pc)
}
