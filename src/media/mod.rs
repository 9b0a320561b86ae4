//! Inbound media handling
//!
//! Routes remote tracks to caller-supplied sinks by media kind.

pub mod router;
pub mod sink;

pub use router::{TrackKind, TrackRouter};
pub use sink::{MediaSink, RtpChannelSink};
