//! Network client configuration.

use std::path::Path;
use std::time::Duration;

use illanet_tick::{RetryOrder, RetryPolicy};
use illanet_transport::TcpOptions;
use serde::{Deserialize, Serialize};

use crate::{IllanetError, ReconnectPolicy};

// ---------------------------------------------------------------------------
// NetConfig
// ---------------------------------------------------------------------------

/// Settings for a [`NetClient`](crate::NetClient).
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// { "connect_timeout_ms": 3000, "retry": { "max_attempts": 50 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Upper bound for one connection attempt.
    pub connect_timeout_ms: u64,

    /// Size of each socket read.
    pub read_buffer_size: usize,

    /// Disable Nagle's algorithm on the game socket.
    pub nodelay: bool,

    /// Retries of a failed connect in `connect_with_retry`.
    pub reconnect: ReconnectPolicy,

    /// When a message that keeps asking for a retry is given up.
    pub retry: RetryPolicy,

    /// Whether a retrying message holds back the messages behind it.
    pub retry_order: RetryOrder,

    /// Rate of the update loop for hosts without a renderer, in Hz.
    pub update_rate_hz: u32,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            read_buffer_size: 8 * 1024,
            nodelay: true,
            reconnect: ReconnectPolicy::default(),
            retry: RetryPolicy::default(),
            retry_order: RetryOrder::HeadOfLine,
            update_rate_hz: 60,
        }
    }
}

impl NetConfig {
    /// Parses a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, IllanetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IllanetError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Socket options derived from this config.
    pub fn tcp_options(&self) -> TcpOptions {
        TcpOptions {
            connect_timeout: self.connect_timeout(),
            read_buffer_size: self.read_buffer_size,
            nodelay: self.nodelay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_partial_keeps_defaults() {
        let config = NetConfig::from_json(r#"{ "connect_timeout_ms": 2500 }"#).unwrap();

        assert_eq!(config.connect_timeout(), Duration::from_millis(2500));
        assert_eq!(config.read_buffer_size, NetConfig::default().read_buffer_size);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.retry.max_age, Some(RetryPolicy::DEFAULT_MAX_AGE));
        assert_eq!(config.retry_order, RetryOrder::HeadOfLine);
    }

    #[test]
    fn test_from_json_nested_policies() {
        let config = NetConfig::from_json(
            r#"{
                "reconnect": { "max_attempts": 0 },
                "retry": { "max_attempts": 3, "max_age": null },
                "retry_order": "Deferred"
            }"#,
        )
        .unwrap();

        assert_eq!(config.reconnect.max_attempts, 0);
        assert_eq!(config.reconnect.initial_delay_ms, ReconnectPolicy::default().initial_delay_ms);
        assert_eq!(config.retry.max_attempts, Some(3));
        assert_eq!(config.retry_order, RetryOrder::Deferred);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = NetConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, IllanetError::Config(_)));
    }

    #[test]
    fn test_tcp_options_follow_config() {
        let config = NetConfig {
            connect_timeout_ms: 1234,
            read_buffer_size: 512,
            nodelay: false,
            ..NetConfig::default()
        };
        let options = config.tcp_options();
        assert_eq!(options.connect_timeout, Duration::from_millis(1234));
        assert_eq!(options.read_buffer_size, 512);
        assert!(!options.nodelay);
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.json");
        std::fs::write(&path, r#"{ "update_rate_hz": 20 }"#).unwrap();

        let config = NetConfig::load(&path).unwrap();

        assert_eq!(config.update_rate_hz, 20);
    }
}
