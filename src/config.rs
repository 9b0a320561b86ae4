//! Configuration for the viewer client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for a viewer [`Session`](crate::Session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Signaling server base URL (http:// or https://)
    pub server_url: String,

    /// Session name, used as the per-instance log tag
    pub session_name: String,

    /// HTTP request timeout in milliseconds (default: 30000)
    pub http_timeout_ms: u64,

    /// Maximum time to wait for ICE gathering in seconds (default: 30)
    pub ice_timeout_secs: u32,

    /// Grace delay before closing the connection on stop, in milliseconds
    /// (default: 500)
    pub stop_grace_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8888".to_string(),
            session_name: "client".to_string(),
            http_timeout_ms: 30_000,
            ice_timeout_secs: 30,
            stop_grace_ms: 500,
        }
    }
}

impl ViewerConfig {
    /// Create a configuration for the given signaling server, with defaults
    /// for everything else
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Default::default()
        }
    }

    /// Set the session name
    ///
    /// Useful for chaining with [`ViewerConfig::new`].
    pub fn with_session_name(mut self, session_name: &str) -> Self {
        self.session_name = session_name.to_string();
        self
    }

    /// Set the ICE gathering timeout
    pub fn with_ice_timeout_secs(mut self, ice_timeout_secs: u32) -> Self {
        self.ice_timeout_secs = ice_timeout_secs;
        self
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `server_url` is empty or not an HTTP(S) URL
    /// - `session_name` is empty
    /// - `ice_timeout_secs` is not in range 1-300
    pub fn validate(&self) -> crate::Result<()> {
        use crate::Error;

        if self.server_url.is_empty() {
            return Err(Error::InvalidConfig(
                "server_url cannot be empty".to_string(),
            ));
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "server_url must start with http:// or https://, got {}",
                self.server_url
            )));
        }

        if self.session_name.is_empty() {
            return Err(Error::InvalidConfig(
                "session_name cannot be empty".to_string(),
            ));
        }

        if self.ice_timeout_secs == 0 || self.ice_timeout_secs > 300 {
            return Err(Error::InvalidConfig(format!(
                "ice_timeout_secs must be in range 1-300, got {}",
                self.ice_timeout_secs
            )));
        }

        Ok(())
    }

    /// HTTP request timeout as a [`Duration`]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// ICE gathering timeout as a [`Duration`]
    pub fn ice_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.ice_timeout_secs))
    }

    /// Stop grace delay as a [`Duration`]
    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_server_url_fails() {
        let mut config = ViewerConfig::default();
        config.server_url.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_server_url_scheme_fails() {
        let config = ViewerConfig::new("ws://localhost:8888");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_session_name_fails() {
        let config = ViewerConfig::default().with_session_name("");
        // builder accepts it; validation rejects it
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_ice_timeout_fails() {
        let config = ViewerConfig::default().with_ice_timeout_secs(0);
        assert!(config.validate().is_err());

        let config = ViewerConfig::default().with_ice_timeout_secs(301);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_chain() {
        let config = ViewerConfig::new("https://media.example.org")
            .with_session_name("lobby")
            .with_ice_timeout_secs(10);
        assert!(config.validate().is_ok());
        assert_eq!(config.server_url, "https://media.example.org");
        assert_eq!(config.session_name, "lobby");
        assert_eq!(config.ice_timeout(), Duration::from_secs(10));
        assert_eq!(config.stop_grace(), Duration::from_millis(500));
    }

    #[test]
    fn test_config_serialization() {
        let config = ViewerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ViewerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.server_url, deserialized.server_url);
    }
}
