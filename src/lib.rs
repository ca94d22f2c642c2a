//! # toolbelt - stateless text utilities over MCP
//!
//! toolbelt is a small Model Context Protocol server. It exposes a handful of
//! stateless operations (`echo`, `reverse`, `hash`, `uuid`, `timestamp`) as
//! MCP tools over the stateless "streamable HTTP" transport: JSON-RPC 2.0
//! messages POSTed to a single base path.
//!
//! ## Architecture
//!
//! ```text
//! HTTP request
//!   │
//!   ▼
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  HttpServer  │──▶│ AccessGate  │──▶│ McpProtocol  │──▶│ ToolRegistry │
//! │ (routing,    │   │ (bearer     │   │ (JSON-RPC    │   │ (schema      │
//! │  body limit) │   │  token)     │   │  methods)    │   │  check, call)│
//! └──────────────┘   └─────────────┘   └──────────────┘   └──────┬───────┘
//!                                                                │
//!                                          echo · reverse · hash · uuid · timestamp
//! ```
//!
//! The registry is filled once at startup and is read-only afterwards, so
//! requests are served concurrently without any locking.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolbelt::prelude::*;
//!
//! #[derive(Deserialize, Schema)]
//! struct GreetInput {
//!     #[schema(description = "Who to greet")]
//!     name: String,
//! }
//!
//! #[derive(Serialize, Schema)]
//! struct GreetOutput {
//!     greeting: String,
//! }
//!
//! fn greet(_ctx: &CallContext, input: GreetInput) -> Result<GreetOutput, ToolError> {
//!     Ok(GreetOutput { greeting: format!("Hello, {}!", input.name) })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut builder = ToolRegistry::builder();
//!     register_builtin(&mut builder)?;
//!     builder.register_fn("greet", "Greet someone", greet)?;
//!
//!     let config = ServerConfig::new().addr("127.0.0.1:8080");
//!     HttpServer::new(config, Arc::new(builder.build())).run().await?;
//!     Ok(())
//! }
//! ```

extern crate self as toolbelt;

pub mod builtin;
pub mod cli;
pub mod rpc;
pub mod runtime;
pub mod schema;
pub mod tool;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::builtin::register_builtin;
    pub use crate::runtime::{HttpServer, ServerConfig};
    pub use crate::schema::{FieldKind, FieldSpec, ObjectSchema, Schema};
    pub use crate::tool::{
        CallContext, DispatchError, ToolDescriptor, ToolError, ToolHandler, ToolRegistry,
    };
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}

// Re-export for convenience
pub use runtime::{HttpServer, ServerConfig};
pub use schema::{ObjectSchema, Schema};
pub use tool::{CallContext, ToolDescriptor, ToolError, ToolHandler, ToolRegistry};
