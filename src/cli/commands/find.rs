//! Find command - list records by name, type, tags and size

use crate::cli::output::{colors, format_bytes, format_relative_time, print_json};
use crate::cli::OutputFormat;
use crate::core::domain::DomainContext;
use crate::core::emulation::FindOptions;
use crate::core::services::Services;
use clap::Args;
use std::sync::Arc;

/// Arguments for the find command
#[derive(Args, Debug, Default)]
pub struct FindArgs {
    /// Case-insensitive regex tested against the name and the id
    #[arg(long)]
    pub name: Option<String>,

    /// f/file for resources, d/directory/prompt for prompts
    #[arg(long = "type", short = 't')]
    pub kind: Option<String>,

    /// Any of these tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    #[arg(long)]
    pub content_type: Option<String>,

    /// Size filter: +N, -N or N with an optional k/m/g unit
    #[arg(long, allow_hyphen_values = true)]
    pub size: Option<String>,

    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Search these domains instead of the current scope (repeatable)
    #[arg(long = "in")]
    pub domains: Vec<String>,

    /// Print virtual paths instead of a table
    #[arg(long)]
    pub paths: bool,
}

impl FindArgs {
    pub fn to_options(&self) -> FindOptions {
        FindOptions {
            name: self.name.clone(),
            kind: self.kind.clone(),
            tags: self.tags.clone(),
            content_type: self.content_type.clone(),
            size: self.size.clone(),
            limit: self.limit,
            domains: self.domains.clone(),
        }
    }
}

/// Execute the find command
pub async fn execute(
    args: FindArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = services.find(&args.to_options(), ctx)?;

    match format {
        OutputFormat::Human => {
            if response.results.is_empty() {
                println!(
                    "No records found ({} scanned)",
                    colors::number(&response.records_scanned.to_string())
                );
                return Ok(());
            }
            for result in &response.results {
                if args.paths {
                    println!("{}", result.virtual_path);
                    continue;
                }
                println!(
                    "{:<32} {:<8} {:>10}  {}",
                    colors::shorthand(&result.shorthand),
                    result.kind,
                    format_bytes(result.size),
                    colors::dim(&format_relative_time(&result.modified_at))
                );
            }
            if response.skipped > 0 {
                println!(
                    "{}",
                    colors::warning(&format!("{} malformed record(s) skipped", response.skipped))
                );
            }
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}
