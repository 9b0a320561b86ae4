//! Viewer binary entry point
//!
//! Connects to a signaling server, negotiates a receive-only session, and
//! drains inbound RTP into log counters until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Connect to a local media server
//! cargo run --bin viewer -- --server-url http://localhost:8888
//!
//! # Request audio as well, with a custom log tag
//! cargo run --bin viewer -- \
//!   --server-url http://localhost:8888 \
//!   --session-name lobby \
//!   --audio
//! ```

use anyhow::Context;
use clap::Parser;
use rtc_viewer::{MediaSink, RtpChannelSink, Session, ViewerConfig};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use webrtc::rtp::packet::Packet;

/// Receive-only WebRTC viewer
///
/// Negotiates a one-way media session over HTTP signaling and consumes the
/// inbound tracks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Signaling server base URL
    #[arg(
        long,
        default_value = "http://127.0.0.1:8888",
        env = "VIEWER_SERVER_URL"
    )]
    server_url: String,

    /// Session name used as the log tag
    #[arg(long, default_value = "client", env = "VIEWER_SESSION_NAME")]
    session_name: String,

    /// Also request an inbound audio track
    #[arg(long, default_value_t = false, env = "VIEWER_AUDIO")]
    audio: bool,

    /// Maximum seconds to wait for ICE gathering
    #[arg(long, default_value_t = 30, env = "VIEWER_ICE_TIMEOUT_SECS")]
    ice_timeout_secs: u32,
}

/// Log a running packet count for one media kind
fn spawn_packet_counter(kind: &'static str, mut packets: mpsc::Receiver<Packet>) {
    tokio::spawn(async move {
        let mut count: u64 = 0;
        while let Some(_packet) = packets.recv().await {
            count += 1;
            if count % 500 == 0 {
                info!(kind, count, "inbound RTP packets");
            }
        }
        info!(kind, count, "track ended");
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = ViewerConfig::new(args.server_url)
        .with_session_name(&args.session_name)
        .with_ice_timeout_secs(args.ice_timeout_secs);

    let (video_sink, video_packets) = RtpChannelSink::channel("video", 256);
    spawn_packet_counter("video", video_packets);

    let audio_sink = if args.audio {
        let (sink, audio_packets) = RtpChannelSink::channel("audio", 256);
        spawn_packet_counter("audio", audio_packets);
        Some(sink as Arc<dyn MediaSink>)
    } else {
        None
    };

    let session =
        Session::new(config, video_sink, audio_sink).context("failed to create session")?;

    session.start().await.context("negotiation failed")?;
    info!("session established, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    session.stop().await.context("failed to stop session")?;

    Ok(())
}
