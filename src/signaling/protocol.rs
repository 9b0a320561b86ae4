//! Signaling wire types
//!
//! The `/config` body mirrors the browser `RTCConfiguration` dictionary
//! shape; offer and answer bodies are `RTCSessionDescription` serialized
//! directly (`{"sdp": ..., "type": ...}`).

use serde::{Deserialize, Serialize};

/// STUN server used when the signaling server provides no configuration
pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";

/// SDP semantics mode of the fallback configuration
pub const DEFAULT_SDP_SEMANTICS: &str = "unified-plan";

/// Connection configuration served by `GET /config`
///
/// Chosen once per session: either the server-provided body, verbatim, or
/// [`SignalingConfig::default`] when retrieval fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalingConfig {
    /// SDP semantics mode (informational; the media stack is unified-plan)
    pub sdp_semantics: String,

    /// ICE servers to use for candidate gathering
    pub ice_servers: Vec<IceServerEntry>,
}

/// One ICE server entry in a [`SignalingConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerEntry {
    /// Server URLs (stun: or turn:)
    pub urls: Vec<String>,

    /// Username for TURN authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Credential for TURN authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            sdp_semantics: DEFAULT_SDP_SEMANTICS.to_string(),
            ice_servers: vec![IceServerEntry {
                urls: vec![DEFAULT_STUN_SERVER.to_string()],
                username: None,
                credential: None,
            }],
        }
    }
}
