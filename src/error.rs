//! Error types for the viewer client

/// Result type alias using the viewer Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while establishing or tearing down a session
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Signaling exchange error
    #[error("Signaling error: {0}")]
    SignalingError(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// SDP negotiation error
    #[error("SDP negotiation error: {0}")]
    SdpError(String),

    /// WebRTC peer connection error
    #[error("Peer connection error: {0}")]
    PeerConnectionError(String),

    /// ICE gathering error
    #[error("ICE gathering error: {0}")]
    IceGatheringError(String),

    /// Operation timeout
    #[error("Operation timeout: {0}")]
    OperationTimeout(String),

    /// Session lifecycle error
    #[error("Session error: {0}")]
    SessionError(String),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error came out of the signaling exchange
    pub fn is_signaling_error(&self) -> bool {
        matches!(self, Error::SignalingError(_) | Error::HttpError(_))
    }

    /// Check if this error is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::InvalidConfig(_))
    }
}
