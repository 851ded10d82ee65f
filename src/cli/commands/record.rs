//! Record commands - add-resource, add-prompt, get-record, delete-record
//!
//! Record ids accept shorthand tokens: `::id` (default domain),
//! `domain:id`, or a bare id in the current domain.

use super::parse_key_value;
use crate::cli::output::{colors, format_bytes, print_json};
use crate::cli::OutputFormat;
use crate::core::domain::DomainContext;
use crate::core::services::{PromptInput, ResourceInput, Services};
use crate::core::types::Record;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for add-resource
#[derive(Args, Debug, Default)]
pub struct AddResourceArgs {
    /// Record id or shorthand token
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Inline content
    #[arg(long, short = 'c', conflicts_with = "file")]
    pub content: Option<String>,

    /// Read content from a file ('-' for stdin)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// MIME type (defaults to text/plain)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

/// Arguments for add-prompt
#[derive(Args, Debug, Default)]
pub struct AddPromptArgs {
    /// Record id or shorthand token
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Inline template with {{variable}} placeholders
    #[arg(long, short = 'T', conflicts_with = "file")]
    pub template: Option<String>,

    /// Read the template from a file ('-' for stdin)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Declared variable (repeatable; taken from the template when omitted)
    #[arg(long = "var")]
    pub variables: Vec<String>,

    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

/// Arguments for get-record
#[derive(Args, Debug, Default)]
pub struct GetArgs {
    /// Shorthand token
    pub id: String,

    /// Render the prompt with KEY=VALUE (repeatable)
    #[arg(long = "arg", short = 'a', value_parser = parse_key_value)]
    pub arguments: Vec<(String, String)>,

    /// Print the body only
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for delete-record
#[derive(Args, Debug, Default)]
pub struct DeleteArgs {
    /// Shorthand token
    pub id: String,
}

/// Stored record summary
#[derive(Debug, Serialize)]
pub struct StoredRecord {
    pub shorthand: String,
    pub id: String,
    pub domain: String,
    pub kind: String,
    pub name: String,
    pub size: u64,
}

impl StoredRecord {
    fn from_record(record: &Record, services: &Services) -> Self {
        let shorthand = services
            .build_shorthand(record.domain(), record.id())
            .unwrap_or_else(|_| format!("{}:{}", record.domain(), record.id()));
        Self {
            shorthand,
            id: record.id().to_string(),
            domain: record.domain().to_string(),
            kind: record.kind().to_string(),
            name: record.name().to_string(),
            size: record.size(),
        }
    }
}

/// Read a body from inline text, a file, or stdin
fn read_body(
    inline: Option<String>,
    file: Option<&PathBuf>,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(text) = inline {
        return Ok(text);
    }
    match file {
        Some(path) if path.as_path() != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {e}", path.display()).into()),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn print_stored(
    record: &Record,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let stored = StoredRecord::from_record(record, services);
    match format {
        OutputFormat::Human => {
            println!(
                "{} {} {} {}",
                colors::success("Stored"),
                stored.kind,
                colors::shorthand(&stored.shorthand),
                colors::dim(&format!("({})", format_bytes(stored.size)))
            );
        }
        OutputFormat::Json => print_json(&stored)?,
    }
    Ok(())
}

/// Execute add-resource command
pub async fn execute_add_resource(
    args: AddResourceArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = services.resolve_shorthand(&args.id, ctx)?;
    let content = read_body(args.content, args.file.as_ref())?;

    let record = services.put_resource(
        ResourceInput {
            id: target.local_id,
            domain: Some(target.domain),
            name: args.name.unwrap_or_default(),
            description: args.description,
            content,
            content_type: args.content_type,
            tags: args.tags,
        },
        ctx,
    )?;

    print_stored(&record, services, format)
}

/// Execute add-prompt command
pub async fn execute_add_prompt(
    args: AddPromptArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = services.resolve_shorthand(&args.id, ctx)?;
    let template = read_body(args.template, args.file.as_ref())?;

    let record = services.put_prompt(
        PromptInput {
            id: target.local_id,
            domain: Some(target.domain),
            name: args.name.unwrap_or_default(),
            description: args.description,
            template,
            variables: args.variables,
            tags: args.tags,
        },
        ctx,
    )?;

    print_stored(&record, services, format)
}

/// Execute get-record command
pub async fn execute_get(
    args: GetArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !args.arguments.is_empty() {
        let arguments: BTreeMap<String, String> = args.arguments.into_iter().collect();
        let rendered = services.render_prompt(&args.id, &arguments, ctx)?;
        match format {
            OutputFormat::Human => println!("{rendered}"),
            OutputFormat::Json => {
                print_json(&serde_json::json!({ "id": args.id, "rendered": rendered }))?
            }
        }
        return Ok(());
    }

    let record = services.get_record(&args.id, ctx)?;

    match format {
        OutputFormat::Human if args.raw => println!("{}", record.body()),
        OutputFormat::Human => {
            let stored = StoredRecord::from_record(&record, services);
            println!("{}", colors::label(record.name()));
            println!("  Id:       {}", colors::shorthand(&stored.shorthand));
            println!("  Type:     {}", record.kind());
            if let Some(content_type) = record.content_type() {
                println!("  Content:  {content_type}");
            }
            println!("  Size:     {}", format_bytes(record.size()));
            if !record.tags().is_empty() {
                println!("  Tags:     {}", record.tags().join(", "));
            }
            if let Record::Prompt(prompt) = &record {
                if !prompt.variables.is_empty() {
                    println!("  Vars:     {}", prompt.variables.join(", "));
                }
            }
            if !record.description().is_empty() {
                println!("\n{}", colors::dim(record.description()));
            }
            println!("\n{}", record.body());
        }
        OutputFormat::Json => print_json(&record)?,
    }

    Ok(())
}

/// Execute delete-record command
pub async fn execute_delete(
    args: DeleteArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = services.delete_record(&args.id, ctx)?;
    let stored = StoredRecord::from_record(&record, services);

    match format {
        OutputFormat::Human => {
            println!(
                "{} {} {}",
                colors::success("Deleted"),
                stored.kind,
                colors::shorthand(&stored.shorthand)
            );
        }
        OutputFormat::Json => {
            let response = serde_json::json!({
                "deleted": true,
                "record": stored,
            });
            print_json(&response)?;
        }
    }

    Ok(())
}
