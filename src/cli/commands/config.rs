//! Config command - show current configuration

use crate::cli::output::{colors, print_json};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Include scan and candidate window internals
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub data_dir: String,
    pub in_memory: bool,
    pub search: SearchSection,
    pub domains: DomainsSection,
    pub request_timeout_sec: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchSection {
    pub default_limit: usize,
    pub max_limit: usize,
    pub max_query_length: usize,
    pub snippet_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_candidates: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DomainsSection {
    pub default_domain: String,
    pub isolation_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl ConfigResponse {
    pub fn build(services: &Services, all: bool) -> Self {
        let config = &services.config;
        Self {
            data_dir: config.storage.data_dir.to_string_lossy().into_owned(),
            in_memory: config.storage.in_memory,
            search: SearchSection {
                default_limit: config.search.default_limit,
                max_limit: config.search.max_limit,
                max_query_length: config.search.max_query_length,
                snippet_length: config.search.snippet_length,
                scan_page_size: all.then_some(config.search.scan_page_size),
                max_candidates: all.then_some(config.search.max_candidates),
            },
            domains: DomainsSection {
                default_domain: config.domains.default_domain.clone(),
                isolation_mode: config.domains.isolation_mode.to_string(),
                max_depth: all.then_some(config.domains.max_depth),
            },
            request_timeout_sec: config.limits.request_timeout_sec,
        }
    }
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = ConfigResponse::build(services, args.all);

    match format {
        OutputFormat::Human => {
            println!("{}", colors::label("Configuration:"));
            if response.in_memory {
                println!("  storage: in-memory");
            } else {
                println!("  data_dir: {}", response.data_dir);
            }
            println!("  search:");
            println!("    default_limit: {}", response.search.default_limit);
            println!("    max_limit: {}", response.search.max_limit);
            println!("    max_query_length: {}", response.search.max_query_length);
            println!("    snippet_length: {}", response.search.snippet_length);
            if let Some(size) = response.search.scan_page_size {
                println!("    scan_page_size: {size}");
            }
            if let Some(max) = response.search.max_candidates {
                println!("    max_candidates: {max}");
            }
            println!("  domains:");
            println!("    default_domain: {}", response.domains.default_domain);
            println!("    isolation_mode: {}", response.domains.isolation_mode);
            if let Some(depth) = response.domains.max_depth {
                println!("    max_depth: {depth}");
            }
            println!("  request_timeout_sec: {}", response.request_timeout_sec);
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}
