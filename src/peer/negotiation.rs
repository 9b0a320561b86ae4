//! Negotiation state machine
//!
//! Drives a fresh peer connection to an established receive-only session:
//! resolve configuration, create the connection, declare recvonly
//! transceivers, create and apply the local offer, wait out ICE gathering,
//! run the single HTTP offer/answer round trip, and apply the answer. One
//! suspension point per phase; every failure path ends in the absorbing
//! `Failed` phase with the error logged and surfaced to the caller.

use crate::error::{Error, Result};
use crate::media::TrackRouter;
use crate::peer::{connection, ice};
use crate::signaling::client::SignalingClient;
use crate::signaling::protocol::SignalingConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error};
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;

/// Phase of the negotiation state machine
///
/// Transitions run strictly forward; `Failed` is reachable from any
/// non-terminal phase. `Complete` and `Failed` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    /// No negotiation has run yet
    Idle,
    /// Resolving configuration and creating the connection
    ConfiguringConnection,
    /// Declaring transceivers and applying the local offer
    CreatingOffer,
    /// Waiting for ICE candidate gathering to finish
    GatheringCandidates,
    /// Offer/answer round trip with the signaling server
    ExchangingWithServer,
    /// Remote description applied, session established
    Complete,
    /// Negotiation failed, session unusable
    Failed,
}

impl NegotiationPhase {
    /// Whether this phase is terminal
    pub fn is_terminal(self) -> bool {
        matches!(self, NegotiationPhase::Complete | NegotiationPhase::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            NegotiationPhase::Idle => 0,
            NegotiationPhase::ConfiguringConnection => 1,
            NegotiationPhase::CreatingOffer => 2,
            NegotiationPhase::GatheringCandidates => 3,
            NegotiationPhase::ExchangingWithServer => 4,
            NegotiationPhase::Complete => 5,
            NegotiationPhase::Failed => 6,
        }
    }

    /// Whether the machine may move from `self` to `next`
    pub(crate) fn can_advance_to(self, next: NegotiationPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            NegotiationPhase::Failed => true,
            _ => next.rank() == self.rank() + 1,
        }
    }
}

impl fmt::Display for NegotiationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationPhase::Idle => "Idle",
            NegotiationPhase::ConfiguringConnection => "ConfiguringConnection",
            NegotiationPhase::CreatingOffer => "CreatingOffer",
            NegotiationPhase::GatheringCandidates => "GatheringCandidates",
            NegotiationPhase::ExchangingWithServer => "ExchangingWithServer",
            NegotiationPhase::Complete => "Complete",
            NegotiationPhase::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

/// Shared phase slot with transition enforcement
#[derive(Clone)]
pub(crate) struct PhaseCell {
    phase: Arc<RwLock<NegotiationPhase>>,
}

impl PhaseCell {
    pub(crate) fn new(phase: Arc<RwLock<NegotiationPhase>>) -> Self {
        Self { phase }
    }

    pub(crate) async fn get(&self) -> NegotiationPhase {
        *self.phase.read().await
    }

    /// Move to the next phase, rejecting anything but the legal successor
    pub(crate) async fn advance(&self, next: NegotiationPhase) -> Result<()> {
        let mut phase = self.phase.write().await;
        if !phase.can_advance_to(next) {
            return Err(Error::SessionError(format!(
                "illegal negotiation transition {} -> {}",
                *phase, next
            )));
        }
        debug!(from = %*phase, to = %next, "negotiation phase transition");
        *phase = next;
        Ok(())
    }

    /// Move to `Failed` unless already terminal
    pub(crate) async fn fail(&self) {
        let mut phase = self.phase.write().await;
        if !phase.is_terminal() {
            debug!(from = %*phase, "negotiation phase transition to Failed");
            *phase = NegotiationPhase::Failed;
        }
    }
}

/// Declare the receive-only transceivers, video always and audio on demand
///
/// Must run before offer creation: the transceiver set determines which
/// media kinds the server is asked to send.
pub(crate) async fn add_recv_transceivers(pc: &RTCPeerConnection, want_audio: bool) -> Result<()> {
    pc.add_transceiver_from_kind(
        RTPCodecType::Video,
        Some(RTCRtpTransceiverInit {
            direction: RTCRtpTransceiverDirection::Recvonly,
            send_encodings: vec![],
        }),
    )
    .await
    .map_err(|e| Error::PeerConnectionError(format!("failed to add video transceiver: {}", e)))?;

    if want_audio {
        pc.add_transceiver_from_kind(
            RTPCodecType::Audio,
            Some(RTCRtpTransceiverInit {
                direction: RTCRtpTransceiverDirection::Recvonly,
                send_encodings: vec![],
            }),
        )
        .await
        .map_err(|e| {
            Error::PeerConnectionError(format!("failed to add audio transceiver: {}", e))
        })?;
    }

    Ok(())
}

/// One-shot negotiation driver
///
/// All collaborators are injected; the driver publishes the connection into
/// the session's slot as soon as it exists so the lifecycle controller can
/// tear it down even mid-negotiation.
pub(crate) struct Negotiator {
    signaling: SignalingClient,
    router: Arc<TrackRouter>,
    phase: PhaseCell,
    connection: Arc<RwLock<Option<Arc<RTCPeerConnection>>>>,
    ice_timeout: Duration,
}

impl Negotiator {
    pub(crate) fn new(
        signaling: SignalingClient,
        router: Arc<TrackRouter>,
        phase: PhaseCell,
        connection: Arc<RwLock<Option<Arc<RTCPeerConnection>>>>,
        ice_timeout: Duration,
    ) -> Self {
        Self {
            signaling,
            router,
            phase,
            connection,
            ice_timeout,
        }
    }

    /// Run the machine to `Complete`, or log and leave it in `Failed`
    pub(crate) async fn run(&self) -> Result<SignalingConfig> {
        match self.drive().await {
            Ok(config) => Ok(config),
            Err(error) => {
                let phase = self.phase.get().await;
                error!(%error, %phase, "negotiation failed");
                self.phase.fail().await;
                // A failed session holds no connection; close whatever was
                // already created.
                if let Some(pc) = self.connection.write().await.take() {
                    if let Err(close_error) = pc.close().await {
                        debug!(%close_error, "close after failed negotiation");
                    }
                }
                Err(error)
            }
        }
    }

    async fn drive(&self) -> Result<SignalingConfig> {
        self.phase
            .advance(NegotiationPhase::ConfiguringConnection)
            .await?;
        // Config fetch errors are absorbed into the default; only
        // connection construction can fail this phase.
        let config = self.signaling.fetch_config().await;
        let pc = connection::create_connection(&config, Arc::clone(&self.router)).await?;
        *self.connection.write().await = Some(Arc::clone(&pc));

        self.phase.advance(NegotiationPhase::CreatingOffer).await?;
        add_recv_transceivers(&pc, self.router.wants_audio()).await?;
        let offer = pc
            .create_offer(None)
            .await
            .map_err(|e| Error::SdpError(format!("failed to create offer: {}", e)))?;
        pc.set_local_description(offer)
            .await
            .map_err(|e| Error::SdpError(format!("failed to set local description: {}", e)))?;

        self.phase
            .advance(NegotiationPhase::GatheringCandidates)
            .await?;
        ice::wait_for_gathering_complete(&pc, self.ice_timeout).await?;

        self.phase
            .advance(NegotiationPhase::ExchangingWithServer)
            .await?;
        let local = pc.local_description().await.ok_or_else(|| {
            Error::SdpError("no local description after gathering".to_string())
        })?;
        let answer = self.signaling.exchange_offer(&local).await?;

        pc.set_remote_description(answer)
            .await
            .map_err(|e| Error::SdpError(format!("failed to set remote description: {}", e)))?;
        self.phase.advance(NegotiationPhase::Complete).await?;

        Ok(config)
    }
}
