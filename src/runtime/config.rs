//! Server configuration.

use std::net::{SocketAddr, ToSocketAddrs};
use thiserror::Error;

/// Default listen address: all interfaces, port 8080.
pub const DEFAULT_ADDR: &str = ":8080";
/// Default base path for protocol traffic.
pub const DEFAULT_BASE_PATH: &str = "/mcp";
/// Default request body limit (4 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid listen address '{0}'")]
    InvalidAddr(String),
}

/// Immutable server configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address, `host:port` or `:port`.
    pub addr: String,
    /// Shared bearer token; `None` disables the access gate.
    pub token: Option<String>,
    /// Normalised base path, e.g. `/mcp`.
    pub base_path: String,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Whether to serve `/_health`.
    pub enable_health: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            token: None,
            base_path: DEFAULT_BASE_PATH.to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            enable_health: true,
        }
    }
}

impl ServerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listen address.
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Set the bearer token. An empty token disables the gate.
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set the base path.
    pub fn base_path(mut self, path: impl AsRef<str>) -> Self {
        self.base_path = normalize_base_path(path.as_ref());
        self
    }

    /// Set the body size limit.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Enable or disable `/_health`.
    pub fn enable_health(mut self, enabled: bool) -> Self {
        self.enable_health = enabled;
        self
    }

    /// Resolve the listen address. `:port` binds all interfaces.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        };

        addr.to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ConfigError::InvalidAddr(self.addr.clone()))
    }

    /// Whether `path` is the base path or below it.
    pub fn matches_base_path(&self, path: &str) -> bool {
        if self.base_path == "/" {
            return true;
        }
        match path.strip_prefix(self.base_path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Add a leading `/`, drop trailing ones.
fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{}", trimmed)
}
