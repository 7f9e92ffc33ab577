//! Configuration for the item API

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{Error, Result};

/// Entry matching any origin, method or header.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Apply the CORS layer at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Allowed origins; `*` matches every origin
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`
    #[serde(default = "default_true")]
    pub allow_credentials: bool,

    /// Allowed methods; `*` allows all
    #[serde(default = "default_wildcard")]
    pub allow_methods: Vec<String>,

    /// Allowed request headers; `*` allows all
    #[serde(default = "default_wildcard")]
    pub allow_headers: Vec<String>,

    /// Preflight cache lifetime in seconds
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_origins: default_allow_origins(),
            allow_credentials: true,
            allow_methods: default_wildcard(),
            allow_headers: default_wildcard(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                Error::Config(format!(
                    "invalid listen address {}:{}: {}",
                    self.server.host, self.server.port, e
                ))
            })
    }

    fn validate(&self) -> Result<()> {
        if self.cors.enabled && self.cors.allow_origins.is_empty() {
            return Err(Error::Config(
                "cors.allow_origins must not be empty when cors is enabled".into(),
            ));
        }
        Ok(())
    }
}

impl CorsConfig {
    /// Whether the origin list contains the wildcard entry
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|o| o == WILDCARD)
    }

    /// The contradictory wildcard-plus-credentials combination
    pub fn is_wildcard_with_credentials(&self) -> bool {
        self.allow_credentials && self.allows_any_origin()
    }
}

// Default value functions

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

fn default_allow_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string(), WILDCARD.to_string()]
}

fn default_wildcard() -> Vec<String> {
    vec![WILDCARD.to_string()]
}

fn default_max_age_secs() -> u64 {
    600
}
