//! Client configuration.
//!
//! Layered with the `config` crate: built-in defaults, the global file
//! `$XDG_CONFIG_HOME/nsgcli/config.toml`, an explicit `--config` file, then
//! `NSGCLI__SECTION__KEY` environment variables. CLI flags are applied last by
//! the caller.

mod facade;
mod merge;
mod paths;
mod sources;

use crate::format::FormatterConfig;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

pub use facade::ConfigLoader;
pub use paths::{config_home, global_config_path};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "NSGCLI";

fn default_base_url() -> String {
    "http://localhost:9100".to_string()
}

fn default_network() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    180
}

/// Where and how to reach the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Protocol, host and port, e.g. `https://nsg-server:9100`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API access token.
    #[serde(default)]
    pub token: Option<String>,

    /// Network id.
    #[serde(default = "default_network")]
    pub network: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            network: default_network(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub format: FormatterConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
