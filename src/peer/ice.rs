//! ICE gathering completion wait
//!
//! The signaling exchange is non-trickle: the offer is sent only once the
//! local description carries every gathered candidate. The wait below is a
//! one-shot condition keyed on the gathering state. Order matters: check,
//! subscribe, re-check — a completion that fires between the first check
//! and the subscription must not leave the wait hanging, and an
//! already-complete state must resolve without touching the handler at all.

use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tracing::debug;
use webrtc::ice_transport::ice_gatherer_state::RTCIceGathererState;
use webrtc::ice_transport::ice_gathering_state::RTCIceGatheringState;
use webrtc::peer_connection::RTCPeerConnection;

/// Wait until the connection's ICE gathering state is complete
///
/// Resolves immediately when gathering has already finished; otherwise
/// waits for the state-change notification, bounded by `timeout`. The
/// handler is replaced with a no-op before returning, so repeated waits
/// never stack listeners.
pub(crate) async fn wait_for_gathering_complete(
    pc: &Arc<RTCPeerConnection>,
    timeout: Duration,
) -> Result<()> {
    if pc.ice_gathering_state() == RTCIceGatheringState::Complete {
        debug!("ICE gathering already complete");
        return Ok(());
    }

    let (tx, rx) = oneshot::channel::<()>();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let notifier = Arc::clone(&tx);

    pc.on_ice_gathering_state_change(Box::new(move |state: RTCIceGathererState| {
        let notifier = Arc::clone(&notifier);
        Box::pin(async move {
            if state == RTCIceGathererState::Complete {
                if let Some(tx) = notifier.lock().await.take() {
                    let _ = tx.send(());
                }
            }
        })
    }));

    // Completion may have raced the subscription; without this re-check the
    // notification would already be gone and the wait would only end at the
    // timeout.
    if pc.ice_gathering_state() == RTCIceGatheringState::Complete {
        clear_handler(pc);
        debug!("ICE gathering completed during subscription");
        return Ok(());
    }

    let result = tokio::time::timeout(timeout, rx).await;
    clear_handler(pc);

    match result {
        Ok(Ok(())) => {
            debug!("ICE gathering complete");
            Ok(())
        }
        Ok(Err(_)) => Err(Error::IceGatheringError(
            "gathering notifier dropped before completion".to_string(),
        )),
        Err(_) => Err(Error::OperationTimeout(format!(
            "ICE gathering did not complete within {:?}",
            timeout
        ))),
    }
}

/// Unsubscribe by swapping in a no-op handler (the handler slot holds one
/// callback at a time)
fn clear_handler(pc: &Arc<RTCPeerConnection>) {
    pc.on_ice_gathering_state_change(Box::new(|_| Box::pin(async {})));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::sink::MediaSink;
    use crate::media::TrackRouter;
    use crate::peer::connection::create_connection;
    use crate::signaling::protocol::SignalingConfig;
    use webrtc::track::track_remote::TrackRemote;

    struct NoopSink;

    impl MediaSink for NoopSink {
        fn label(&self) -> &str {
            "noop"
        }

        fn attach(&self, _track: Arc<TrackRemote>) {}
    }

    async fn connection_without_ice_servers() -> Arc<RTCPeerConnection> {
        let config = SignalingConfig {
            sdp_semantics: "unified-plan".to_string(),
            ice_servers: vec![],
        };
        let router = Arc::new(TrackRouter::new(
            Arc::new(NoopSink) as Arc<dyn MediaSink>,
            None,
        ));
        create_connection(&config, router).await.unwrap()
    }

    #[tokio::test]
    async fn test_wait_resolves_after_gathering_starts() {
        let pc = connection_without_ice_servers().await;
        pc.add_transceiver_from_kind(
            webrtc::rtp_transceiver::rtp_codec::RTPCodecType::Video,
            None,
        )
        .await
        .unwrap();

        let offer = pc.create_offer(None).await.unwrap();
        pc.set_local_description(offer).await.unwrap();

        wait_for_gathering_complete(&pc, Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(pc.ice_gathering_state(), RTCIceGatheringState::Complete);
        pc.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_resolves_immediately_when_already_complete() {
        let pc = connection_without_ice_servers().await;
        pc.add_transceiver_from_kind(
            webrtc::rtp_transceiver::rtp_codec::RTPCodecType::Video,
            None,
        )
        .await
        .unwrap();

        let offer = pc.create_offer(None).await.unwrap();
        let mut done = pc.gathering_complete_promise().await;
        pc.set_local_description(offer).await.unwrap();
        let _ = done.recv().await;

        // Gathering is complete before the wait starts: the immediate path.
        let start = std::time::Instant::now();
        wait_for_gathering_complete(&pc, Duration::from_secs(10))
            .await
            .unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        pc.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_times_out_when_gathering_never_starts() {
        // No local description set: gathering stays in New forever.
        let pc = connection_without_ice_servers().await;

        let result = wait_for_gathering_complete(&pc, Duration::from_millis(200)).await;
        assert!(matches!(result, Err(Error::OperationTimeout(_))));
        pc.close().await.unwrap();
    }
}
