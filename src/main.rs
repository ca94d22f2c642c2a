//! toolbelt - MCP tool server binary.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use toolbelt::builtin::register_builtin;
use toolbelt::cli::Cli;
use toolbelt::{HttpServer, ToolRegistry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();

    let mut builder = ToolRegistry::builder();
    register_builtin(&mut builder).context("failed to register built-in tools")?;
    let registry = Arc::new(builder.build());

    tracing::info!(
        "Registered tools: {}",
        registry
            .list()
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    HttpServer::new(config, registry)
        .run()
        .await
        .context("server failed")?;

    Ok(())
}
