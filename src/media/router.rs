//! Inbound track routing
//!
//! Demultiplexes remote tracks by kind: video goes to the video sink,
//! audio goes to the audio sink when one is configured and is otherwise
//! discarded (the track stays in the connection but nothing consumes it).

use crate::media::sink::MediaSink;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_remote::TrackRemote;

/// Media kind of an inbound track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Audio track
    Audio,
    /// Video track
    Video,
}

impl TrackKind {
    pub(crate) fn from_codec_type(kind: RTPCodecType) -> Option<Self> {
        match kind {
            RTPCodecType::Audio => Some(TrackKind::Audio),
            RTPCodecType::Video => Some(TrackKind::Video),
            _ => None,
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Video => write!(f, "video"),
        }
    }
}

/// Router dispatching inbound tracks to the session's sinks
pub struct TrackRouter {
    video_sink: Arc<dyn MediaSink>,
    audio_sink: Option<Arc<dyn MediaSink>>,
}

impl TrackRouter {
    /// Create a router for the given sinks
    ///
    /// The video sink is mandatory; omitting the audio sink means inbound
    /// audio is not requested during negotiation and any audio track that
    /// arrives anyway is discarded.
    pub fn new(video_sink: Arc<dyn MediaSink>, audio_sink: Option<Arc<dyn MediaSink>>) -> Self {
        Self {
            video_sink,
            audio_sink,
        }
    }

    /// Whether an audio sink was configured
    pub fn wants_audio(&self) -> bool {
        self.audio_sink.is_some()
    }

    /// Sink responsible for the given kind, if any
    pub(crate) fn sink_for(&self, kind: TrackKind) -> Option<Arc<dyn MediaSink>> {
        match kind {
            TrackKind::Video => Some(Arc::clone(&self.video_sink)),
            TrackKind::Audio => self.audio_sink.clone(),
        }
    }

    /// Route one inbound track to its sink
    pub fn route(&self, track: Arc<TrackRemote>) {
        let Some(kind) = TrackKind::from_codec_type(track.kind()) else {
            warn!("inbound track with unspecified kind, ignoring");
            return;
        };

        match self.sink_for(kind) {
            Some(sink) => {
                debug!(%kind, sink = sink.label(), "attaching inbound track");
                sink.attach(track);
            }
            None => {
                debug!(%kind, "no sink configured, discarding inbound track");
            }
        }
    }
}
