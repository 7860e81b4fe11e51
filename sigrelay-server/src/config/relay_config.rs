use anyhow::{Context, bail};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Startup settings for the relay. Read once and shared immutably.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    pub listen_addr: SocketAddr,
    /// Registered peers allowed at once.
    pub max_connections: usize,
    /// Capacity of every peer's outbound queue.
    pub max_queue_depth: usize,
    pub idle_timeout_secs: u64,
    /// How long a closing connection may spend flushing its queue.
    pub close_grace_ms: u64,
    /// Consecutive malformed frames tolerated before a forced disconnect.
    pub max_protocol_violations: u32,
    pub registry_channel_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            max_connections: 1024,
            max_queue_depth: 64,
            idle_timeout_secs: 60,
            close_grace_ms: 1000,
            max_protocol_violations: 3,
            registry_channel_capacity: 256,
        }
    }
}

impl RelayConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let config: RelayConfig = toml::from_str(raw).context("invalid relay configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_connections == 0 {
            bail!("max_connections must be at least 1");
        }
        if self.max_queue_depth == 0 {
            bail!("max_queue_depth must be at least 1");
        }
        if self.idle_timeout_secs == 0 {
            bail!("idle_timeout_secs must be at least 1");
        }
        if self.max_protocol_violations == 0 {
            bail!("max_protocol_violations must be at least 1");
        }
        if self.registry_channel_capacity == 0 {
            bail!("registry_channel_capacity must be at least 1");
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }
}
