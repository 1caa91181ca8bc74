use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_sweep_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL for external access (e.g., "https://fleet.example.com").
    /// Used for install-script download URLs. If not set, URLs are derived
    /// from request headers.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Whether administrator-facing tenancy routes are active. The public
    /// agent registration route stays reachable regardless.
    #[serde(default = "default_true")]
    pub tenancy_enabled: bool,
    /// Interval between sweeps of expired install-script entries, in seconds.
    #[serde(default = "default_sweep_secs")]
    pub install_sweep_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn install_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.install_sweep_secs.max(1))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base_url: None,
            tenancy_enabled: true,
            install_sweep_secs: default_sweep_secs(),
        }
    }
}
