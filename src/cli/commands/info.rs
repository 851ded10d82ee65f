//! Info command - show version and catalog totals

use crate::cli::output::{colors, print_json};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::mcp::protocol::PROTOCOL_VERSION;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the info command
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    /// Include domain and record totals
    #[arg(long, short = 'd')]
    pub detailed: bool,
}

/// Server information response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub protocol: String,
    pub data_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
}

/// Execute the info command
pub async fn execute(
    args: InfoArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (domains, records) = if args.detailed {
        (Some(services.registry.len()), Some(services.store.len()))
    } else {
        (None, None)
    };

    let info = InfoResponse {
        name: "quiver".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        protocol: format!("MCP {PROTOCOL_VERSION}"),
        data_dir: services.config.storage.data_dir.to_string_lossy().into_owned(),
        domains,
        records,
    };

    match format {
        OutputFormat::Human => {
            println!("{} {}", colors::label("quiver"), info.version);
            println!("Protocol: {}", info.protocol);
            println!("Data: {}", info.data_dir);
            if let Some(count) = info.domains {
                println!("Domains: {}", colors::number(&count.to_string()));
            }
            if let Some(count) = info.records {
                println!("Records: {}", colors::number(&count.to_string()));
            }
        }
        OutputFormat::Json => print_json(&info)?,
    }

    Ok(())
}
