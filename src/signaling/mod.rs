//! HTTP offer/answer signaling
//!
//! Covers both halves of the wire protocol: configuration retrieval
//! (`GET /config`) and the single non-trickle offer/answer round trip
//! (`POST /offer`).

pub mod client;
pub mod protocol;

pub use client::SignalingClient;
pub use protocol::{IceServerEntry, SignalingConfig};
