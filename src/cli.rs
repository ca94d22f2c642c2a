//! Command line flags, each with an environment variable fallback.

use crate::runtime::{ServerConfig, DEFAULT_ADDR, DEFAULT_BASE_PATH, DEFAULT_MAX_BODY_SIZE};
use clap::Parser;

/// Stateless text utilities served as MCP tools over streamable HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "toolbelt", version, about, long_about = None)]
pub struct Cli {
    /// HTTP listen address (host:port or :port)
    #[arg(long, env = "TOOLBELT_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Bearer token required for access (recommended)
    #[arg(long, env = "TOOLBELT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base path for MCP traffic
    #[arg(long, env = "TOOLBELT_PATH", default_value = DEFAULT_BASE_PATH)]
    pub path: String,

    /// Maximum request body size in bytes
    #[arg(long, env = "TOOLBELT_MAX_BODY_SIZE", default_value_t = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: usize,

    /// Disable the /_health endpoint
    #[arg(long)]
    pub no_health: bool,
}

impl Cli {
    /// Build the immutable server configuration.
    pub fn into_config(self) -> ServerConfig {
        ServerConfig::new()
            .addr(self.addr)
            .token(self.token)
            .base_path(self.path)
            .max_body_size(self.max_body_size)
            .enable_health(!self.no_health)
    }
}
