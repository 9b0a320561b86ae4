//! Receive-only WebRTC viewer client
//!
//! Establishes a one-way audio/video session with a remote media server,
//! coordinating setup through an HTTP offer/answer exchange. The client
//! only consumes media: it declares receive-only transceivers, sends one
//! fully gathered (non-trickle) offer, applies the server's answer, and
//! hands inbound tracks to caller-supplied sinks.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Session (lifecycle: start/stop, owns the connection)│
//! │  ├─ SignalingClient (GET /config, POST /offer)       │
//! │  ├─ Negotiator (phase machine:                       │
//! │  │     configure → offer → gather → exchange → done) │
//! │  └─ TrackRouter (inbound tracks → MediaSink by kind) │
//! │     ↓                                                │
//! │  webrtc::RTCPeerConnection                           │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use rtc_viewer::{RtpChannelSink, Session, ViewerConfig};
//!
//! # async fn example() -> rtc_viewer::Result<()> {
//! let config = ViewerConfig::new("http://localhost:8888").with_session_name("lobby");
//! let (video_sink, mut video_packets) = RtpChannelSink::channel("video", 256);
//!
//! let session = Session::new(config, video_sink, None)?;
//! session.start().await?;
//!
//! while let Some(packet) = video_packets.recv().await {
//!     // decode / record / forward
//!     let _ = packet;
//! }
//!
//! session.stop().await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod media;
pub mod signaling;

mod peer;
mod session;

// Re-exports for public API
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use media::{MediaSink, RtpChannelSink, TrackKind, TrackRouter};
pub use peer::NegotiationPhase;
pub use session::Session;
pub use signaling::{IceServerEntry, SignalingClient, SignalingConfig};

/// Get the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
