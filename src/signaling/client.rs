//! HTTP signaling client
//!
//! One `GET /config` to resolve the connection configuration and one
//! `POST /offer` carrying the complete (fully gathered) offer. There is no
//! trickle path and no retry; a failed offer exchange fails the
//! negotiation, while a failed config fetch is absorbed into the default
//! configuration.

use crate::error::{Error, Result};
use crate::signaling::protocol::SignalingConfig;
use std::time::Duration;
use tracing::{debug, warn};
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// HTTP client for the signaling endpoints
#[derive(Debug, Clone)]
pub struct SignalingClient {
    /// Base URL (e.g., "http://localhost:8888")
    base_url: String,

    /// Reqwest HTTP client
    http: reqwest::Client,
}

impl SignalingClient {
    /// Create a new signaling client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server base URL (e.g., "http://localhost:8888")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        if base_url.is_empty() {
            return Err(Error::SignalingError(
                "signaling base_url cannot be empty".to_string(),
            ));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::SignalingError(format!(
                "signaling base_url must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::SignalingError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, http })
    }

    /// URL of the configuration endpoint
    pub fn config_url(&self) -> String {
        format!("{}/config", self.base_url)
    }

    /// URL of the offer endpoint
    pub fn offer_url(&self) -> String {
        format!("{}/offer", self.base_url)
    }

    /// Resolve the connection configuration
    ///
    /// Any failure (connect error, non-2xx status, malformed body) is
    /// absorbed into [`SignalingConfig::default`]; this never errors.
    pub async fn fetch_config(&self) -> SignalingConfig {
        match self.try_fetch_config().await {
            Ok(config) => {
                debug!(url = %self.config_url(), "using server-provided configuration");
                config
            }
            Err(error) => {
                warn!(%error, "config fetch failed, falling back to default configuration");
                SignalingConfig::default()
            }
        }
    }

    async fn try_fetch_config(&self) -> Result<SignalingConfig> {
        let response = self
            .http
            .get(self.config_url())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Exchange the local offer for the server's answer
    ///
    /// Posts `{"sdp": ..., "type": "offer"}` and decodes the answer body
    /// into a description directly applicable as the remote description.
    pub async fn exchange_offer(
        &self,
        offer: &RTCSessionDescription,
    ) -> Result<RTCSessionDescription> {
        debug!(url = %self.offer_url(), "posting offer");

        let response = self
            .http
            .post(self.offer_url())
            .json(offer)
            .send()
            .await?
            .error_for_status()?;

        let answer = response.json::<RTCSessionDescription>().await?;
        debug!("received answer");

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_url() {
        let result = SignalingClient::new("ws://localhost:8888", Duration::from_secs(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_url() {
        let result = SignalingClient::new("", Duration::from_secs(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoint_urls_trim_trailing_slash() {
        let client = SignalingClient::new("http://localhost:8888/", Duration::from_secs(1))
            .unwrap();
        assert_eq!(client.config_url(), "http://localhost:8888/config");
        assert_eq!(client.offer_url(), "http://localhost:8888/offer");
    }
}
