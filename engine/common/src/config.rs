//! Runtime configuration

use crate::constants::net::{DEFAULT_FEED_PORT, DEFAULT_FIX_PORT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// FIX session configuration.
///
/// Owned by exactly one `FixSession` instance for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixConfig {
    /// Our CompID (tag 49 on outbound messages)
    pub sender_comp_id: String,
    /// Counterparty CompID (tag 56 on outbound messages)
    pub target_comp_id: String,
    /// Counterparty host
    pub host: String,
    /// Counterparty port
    pub port: u16,
    /// Heartbeat interval (tag 108)
    pub heartbeat_interval: Duration,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            sender_comp_id: "CLIENT".to_string(),
            target_comp_id: "BROKER".to_string(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_FIX_PORT,
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

/// Market-data listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// UDP port to bind
    pub port: u16,
    /// Bind address
    pub bind_addr: String,
}

impl FeedConfig {
    /// Listener on the given port, bound to all interfaces
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            bind_addr: "0.0.0.0".to_string(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::with_port(DEFAULT_FEED_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_config_serde() -> Result<(), Box<dyn std::error::Error>> {
        let cfg = FixConfig::default();
        let json = serde_json::to_string(&cfg)?;
        let decoded: FixConfig = serde_json::from_str(&json)?;
        assert_eq!(decoded.sender_comp_id, cfg.sender_comp_id);
        assert_eq!(decoded.heartbeat_interval, cfg.heartbeat_interval);
        Ok(())
    }

    #[test]
    fn test_feed_config_default() {
        let cfg = FeedConfig::default();
        assert_eq!(cfg.port, DEFAULT_FEED_PORT);
        assert_eq!(cfg.bind_addr, "0.0.0.0");
    }
}
