//! Media sinks
//!
//! A [`MediaSink`] is the native rendition of a playback surface: it takes
//! ownership of an inbound remote track and consumes its RTP. The crate
//! ships [`RtpChannelSink`], which forwards packets into a bounded channel
//! for the host to drain; decoders or recorders implement the trait
//! themselves.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use webrtc::rtp::packet::Packet;
use webrtc::track::track_remote::TrackRemote;

/// Consumer of one kind of inbound media
pub trait MediaSink: Send + Sync {
    /// Identifier used in routing logs
    fn label(&self) -> &str;

    /// Take over an inbound remote track
    ///
    /// Called once per routed track; implementations typically spawn a
    /// reader task that runs until the track ends.
    fn attach(&self, track: Arc<TrackRemote>);
}

/// Sink that forwards RTP packets into a bounded mpsc channel
pub struct RtpChannelSink {
    label: String,
    tx: mpsc::Sender<Packet>,
}

impl RtpChannelSink {
    /// Create a sink and the receiving end of its packet channel
    ///
    /// # Arguments
    ///
    /// * `label` - Identifier used in logs
    /// * `capacity` - Channel capacity; the reader task awaits when full
    pub fn channel(label: impl Into<String>, capacity: usize) -> (Arc<Self>, mpsc::Receiver<Packet>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Arc::new(Self {
                label: label.into(),
                tx,
            }),
            rx,
        )
    }
}

impl MediaSink for RtpChannelSink {
    fn label(&self) -> &str {
        &self.label
    }

    fn attach(&self, track: Arc<TrackRemote>) {
        let tx = self.tx.clone();
        let label = self.label.clone();

        tokio::spawn(async move {
            loop {
                match track.read_rtp().await {
                    Ok((packet, _attributes)) => {
                        if tx.send(packet).await.is_err() {
                            debug!(sink = %label, "packet receiver dropped, stopping reader");
                            break;
                        }
                    }
                    Err(error) => {
                        let msg = error.to_string().to_lowercase();
                        if msg.contains("eof") || msg.contains("closed") {
                            debug!(sink = %label, "track ended");
                            break;
                        }
                        warn!(sink = %label, %error, "RTP read error");
                    }
                }
            }
        });
    }
}
