//! # Context7 MCP Adapter
//!
//! Starts the HTTP adapter. Configuration comes from the environment
//! (`PORT`, `CONTEXT7_API_URL`, `CONTEXT7_API_KEY`) and, optionally, a TOML
//! file. Without `CONTEXT7_API_KEY` the process exits with a non-zero status
//! before binding any port.
//!
//! ```bash
//! CONTEXT7_API_KEY=... context7-mcp-adapter
//! CONTEXT7_API_KEY=... context7-mcp-adapter --config ./adapter.toml --log-format json
//! ```

use clap::Parser;
use std::path::PathBuf;

use context7_mcp_adapter::config;
use context7_mcp_adapter::logging::{init_logging, LogFormat};
use context7_mcp_adapter::server;

/// MCP-compatible HTTP adapter for the Context7 parsing and search API.
#[derive(Parser)]
#[command(name = "context7-mcp-adapter", version)]
struct Cli {
    /// Optional TOML configuration file.
    ///
    /// Environment variables take precedence over values in this file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let cfg = config::load_config(cli.config.as_deref()).map_err(|e| {
        tracing::error!("{:#}", e);
        e
    })?;

    server::run_server(cfg).await
}
