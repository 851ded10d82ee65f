//! Quiver MCP (Model Context Protocol) Server
//!
//! A stdio-based MCP server that exposes domain-scoped search over
//! resources and prompts as tools for MCP clients.

use quiver::core::config::Config;
use quiver::core::services::Services;
use quiver::core::xdg::XdgDirs;
use quiver::mcp::McpServer;
use std::sync::Arc;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr) // Critical: stderr not stdout
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false) // No color codes
        .compact() // Concise format
        .init();
}

/// Report records the store could not decode on startup
fn report_malformed_records(services: &Services) {
    match services.store.malformed_in(None) {
        Ok(entries) if entries.is_empty() => {
            tracing::info!("All {} record(s) loaded", services.store.len());
        }
        Ok(entries) => {
            for entry in &entries {
                tracing::warn!(
                    domain = entry.domain().unwrap_or("?"),
                    reason = %entry.reason,
                    "Skipping malformed record"
                );
            }
            tracing::warn!("Found {} malformed record(s)", entries.len());
        }
        Err(e) => {
            tracing::error!("Failed to inspect record store: {}", e);
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let xdg = XdgDirs::new();
    if let Err(e) = xdg.ensure_dirs_exist() {
        eprintln!("Failed to create XDG directories: {e}");
        std::process::exit(1);
    }
    xdg.log_paths();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        std::process::exit(1);
    });
    config.log_config();

    let services = match Services::new(config) {
        Ok(services) => Arc::new(services),
        Err(e) => {
            eprintln!("Failed to open storage: {e}");
            std::process::exit(1);
        }
    };

    report_malformed_records(&services);

    let mut server = McpServer::new(services);

    if let Err(e) = server.run().await {
        eprintln!("MCP server error: {e}");
        std::process::exit(1);
    }
}
