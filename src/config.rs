//! Configuration management
//!
//! Loads the relay configuration from `config.toml` with `CHAT_RELAY_*`
//! environment overrides. `server_ip` and `server_port` are required;
//! a missing key is a fatal startup error raised before the listener
//! starts.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::error::StartupError;
use crate::protocol::DEFAULT_READ_BUFFER_SIZE;

/// Relay server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// IP address to bind the listener to.
    pub server_ip: String,

    /// Port to listen on.
    pub server_port: u16,

    /// Maximum failed handshake attempts before the connection is
    /// dropped. `None` preserves the base protocol, which has no limit.
    #[serde(default)]
    pub max_auth_retries: Option<u32>,

    /// Per-read deadline in seconds. `None` preserves the base protocol,
    /// which lets a read block its worker indefinitely.
    #[serde(default)]
    pub io_timeout_secs: Option<u64>,

    /// Cap on a single socket read. Messages larger than this are not
    /// reassembled.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

impl RelayConfig {
    /// Load configuration from `config.toml` with environment overrides.
    pub fn load() -> Result<Self, StartupError> {
        let settings = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(Environment::with_prefix("CHAT_RELAY"))
            .build()?;

        let config: RelayConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server_ip.is_empty() {
            return Err(config::ConfigError::Message(
                "server_ip cannot be empty".into(),
            ));
        }

        if self.server_port == 0 {
            return Err(config::ConfigError::Message(
                "server_port cannot be 0".into(),
            ));
        }

        if self.read_buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "read_buffer_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Listen address as `ip:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_ip, self.server_port)
    }

    /// Per-read deadline, if one is configured.
    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_secs.map(Duration::from_secs)
    }
}
