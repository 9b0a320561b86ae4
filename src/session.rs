//! Session lifecycle controller
//!
//! Owns the single peer connection and its negotiation phase. `start()`
//! runs the negotiation engine once; `stop()` closes the connection after a
//! short grace delay so in-flight media setup can settle. Neither call
//! cancels the other: a negotiation racing a stop may still complete or
//! fail against the closing connection, which the design accepts.

use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::media::{MediaSink, TrackRouter};
use crate::peer::negotiation::{NegotiationPhase, Negotiator, PhaseCell};
use crate::signaling::client::SignalingClient;
use crate::signaling::protocol::SignalingConfig;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use webrtc::peer_connection::RTCPeerConnection;

/// A single receive-only viewer session
///
/// Exactly one per client instance. Terminal negotiation phases are
/// permanent: retrying after a failure means constructing a new `Session`.
pub struct Session {
    /// Session name, used as the log tag
    name: String,

    /// Unique identifier for this session instance
    connection_id: String,

    /// Crate configuration
    config: ViewerConfig,

    /// Signaling client shared with the negotiation engine
    signaling: SignalingClient,

    /// Router owning the media sinks
    router: Arc<TrackRouter>,

    /// Peer connection slot; filled by the negotiation engine at
    /// connection creation, emptied by `stop()`
    connection: Arc<RwLock<Option<Arc<RTCPeerConnection>>>>,

    /// Current negotiation phase
    phase: Arc<RwLock<NegotiationPhase>>,

    /// Configuration the signaling server resolved for this session
    resolved_config: RwLock<Option<SignalingConfig>>,
}

impl Session {
    /// Create a session for the given sinks
    ///
    /// # Arguments
    ///
    /// * `config` - Validated before use
    /// * `video_sink` - Sink for the inbound video track
    /// * `audio_sink` - Optional sink for inbound audio; when `None`, no
    ///   audio is requested from the server
    pub fn new(
        config: ViewerConfig,
        video_sink: Arc<dyn MediaSink>,
        audio_sink: Option<Arc<dyn MediaSink>>,
    ) -> Result<Self> {
        config.validate()?;

        let signaling = SignalingClient::new(config.server_url.clone(), config.http_timeout())?;
        let router = Arc::new(TrackRouter::new(video_sink, audio_sink));
        let connection_id = uuid::Uuid::new_v4().to_string();

        info!(
            name = %config.session_name,
            connection_id = %connection_id,
            server_url = %config.server_url,
            "creating session"
        );

        Ok(Self {
            name: config.session_name.clone(),
            connection_id,
            config,
            signaling,
            router,
            connection: Arc::new(RwLock::new(None)),
            phase: Arc::new(RwLock::new(NegotiationPhase::Idle)),
            resolved_config: RwLock::new(None),
        })
    }

    /// Session name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unique identifier of this session instance
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Current negotiation phase
    pub async fn phase(&self) -> NegotiationPhase {
        *self.phase.read().await
    }

    /// The live peer connection, if any
    pub async fn connection(&self) -> Option<Arc<RTCPeerConnection>> {
        self.connection.read().await.clone()
    }

    /// Configuration chosen for this session, once negotiation has
    /// resolved it
    pub async fn resolved_config(&self) -> Option<SignalingConfig> {
        self.resolved_config.read().await.clone()
    }

    /// Negotiate the session
    ///
    /// Runs the full phase machine; on success the session is `Complete`
    /// and media flows into the sinks as the server attaches tracks. On
    /// failure the phase is `Failed` (permanently) and the error is
    /// returned after logging.
    #[instrument(skip(self), fields(session = %self.name))]
    pub async fn start(&self) -> Result<()> {
        debug!("start()");

        {
            let phase = self.phase.read().await;
            if *phase != NegotiationPhase::Idle {
                return Err(Error::SessionError(format!(
                    "session {} cannot start from phase {}",
                    self.name, *phase
                )));
            }
        }

        let negotiator = Negotiator::new(
            self.signaling.clone(),
            Arc::clone(&self.router),
            PhaseCell::new(Arc::clone(&self.phase)),
            Arc::clone(&self.connection),
            self.config.ice_timeout(),
        );

        let resolved = negotiator.run().await?;
        *self.resolved_config.write().await = Some(resolved);

        info!("negotiation complete, session established");
        Ok(())
    }

    /// Tear the session down
    ///
    /// Waits the configured grace delay, then closes and releases the
    /// connection. Calling this with no live connection is a no-op.
    #[instrument(skip(self), fields(session = %self.name))]
    pub async fn stop(&self) -> Result<()> {
        debug!(grace = ?self.config.stop_grace(), "stop()");
        tokio::time::sleep(self.config.stop_grace()).await;

        let Some(pc) = self.connection.write().await.take() else {
            warn!("stop() with no live connection, nothing to close");
            return Ok(());
        };

        pc.close()
            .await
            .map_err(|e| Error::PeerConnectionError(format!("failed to close connection: {}", e)))?;

        info!("connection closed");
        Ok(())
    }
}
