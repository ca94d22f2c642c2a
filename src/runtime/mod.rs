//! HTTP runtime: configuration, access gate and server loop.

mod auth;
mod config;
mod server;

pub use auth::{AccessDenied, AccessGate};
pub use config::{ConfigError, ServerConfig, DEFAULT_ADDR, DEFAULT_BASE_PATH, DEFAULT_MAX_BODY_SIZE};
pub use server::{HttpServer, ServerError, HEALTH_PATH};
