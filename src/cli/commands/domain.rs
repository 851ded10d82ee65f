//! Domain commands - create, list, switch, archive, delete, stats
//!
//! These commands are exposed as top-level CLI commands matching MCP tool names:
//! - `create-domain` (MCP: create_domain)
//! - `list-domains` (MCP: list_domains)
//! - `switch-domain` (MCP: switch_domain)
//! - `archive-domain` (MCP: archive_domain)
//! - `delete-domain` (MCP: delete_domain)
//! - `domain-stats` (MCP: domain_stats)

use crate::cli::output::{colors, format_relative_time, print_json};
use crate::cli::OutputFormat;
use crate::core::domain::{Domain, DomainContext};
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;

/// Arguments for create-domain
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Domain id (lowercase letters, digits, '-' and '_')
    pub id: String,

    /// Display name (defaults to the id)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Parent domain
    #[arg(long, short = 'p')]
    pub parent: Option<String>,
}

/// Arguments for list-domains
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only direct children of this domain
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    /// Hide archived domains
    #[arg(long)]
    pub active_only: bool,
}

/// Arguments for switch-domain
#[derive(Args, Debug, Default)]
pub struct SwitchArgs {
    pub id: String,
}

/// Arguments for archive-domain
#[derive(Args, Debug, Default)]
pub struct ArchiveArgs {
    pub id: String,
}

/// Arguments for delete-domain
#[derive(Args, Debug, Default)]
pub struct DeleteArgs {
    pub id: String,

    /// Also delete descendant domains
    #[arg(long, short = 'r')]
    pub cascade: bool,

    /// Skip confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

/// Arguments for domain-stats
#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// Domain id (defaults to the current domain)
    pub id: Option<String>,
}

/// Domain list item
#[derive(Debug, Serialize)]
pub struct DomainListItem {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub active: bool,
    pub current: bool,
    pub updated_at: String,
}

/// Domain list response
#[derive(Debug, Serialize)]
pub struct DomainListResponse {
    pub count: usize,
    pub current: String,
    pub domains: Vec<DomainListItem>,
}

impl DomainListResponse {
    pub fn build(mut domains: Vec<Domain>, current: &str, active_only: bool) -> Self {
        domains.retain(|d| d.active || !active_only);
        domains.sort_by(|a, b| a.path.cmp(&b.path));
        let domains: Vec<DomainListItem> = domains
            .into_iter()
            .map(|d| DomainListItem {
                current: d.id == current,
                id: d.id,
                name: d.display_name,
                path: d.path,
                parent: d.parent_id,
                active: d.active,
                updated_at: d.updated_at.to_rfc3339(),
            })
            .collect();
        Self {
            count: domains.len(),
            current: current.to_string(),
            domains,
        }
    }
}

/// Execute create-domain command
pub async fn execute_create(
    args: CreateArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = args.name.as_deref().unwrap_or(&args.id);
    let domain = services.create_domain(&args.id, name, &args.description, args.parent.as_deref())?;

    match format {
        OutputFormat::Human => {
            println!(
                "{} domain '{}' at {}",
                colors::success("Created"),
                colors::domain(&domain.id),
                colors::dim(&domain.path)
            );
        }
        OutputFormat::Json => print_json(&domain)?,
    }

    Ok(())
}

/// Execute list-domains command
pub async fn execute_list(
    args: ListArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let domains = services.list_domains(args.parent.as_deref())?;
    let response = DomainListResponse::build(domains, ctx.current(), args.active_only);

    match format {
        OutputFormat::Human => {
            if response.domains.is_empty() {
                println!("No domains found.");
                return Ok(());
            }
            println!(
                "{} domain(s):\n",
                colors::number(&response.count.to_string())
            );
            for item in &response.domains {
                let depth = item.path.matches('/').count();
                let marker = if item.current { "*" } else { " " };
                let status = if item.active { "" } else { " [archived]" };
                println!(
                    "{marker} {}{} {}{}",
                    "  ".repeat(depth),
                    colors::domain(&item.id),
                    colors::dim(&format!("({})", item.name)),
                    colors::warning(status)
                );
            }
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}

/// Execute switch-domain command
///
/// A CLI process holds no session, so this validates the target and
/// prints how to make it current for later invocations.
pub async fn execute_switch(
    args: SwitchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = services.switch_domain(&args.id)?;

    match format {
        OutputFormat::Human => {
            println!(
                "{} '{}' can be used as the current domain",
                colors::success("Domain"),
                colors::domain(ctx.current())
            );
            println!(
                "{}",
                colors::dim(&format!(
                    "Pass --domain {0} or export QUIVER_DOMAIN={0}",
                    ctx.current()
                ))
            );
        }
        OutputFormat::Json => {
            let response = serde_json::json!({
                "switched": true,
                "domain": ctx.current(),
            });
            print_json(&response)?;
        }
    }

    Ok(())
}

/// Execute archive-domain command
pub async fn execute_archive(
    args: ArchiveArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let domain = services.archive_domain(&args.id)?;

    match format {
        OutputFormat::Human => {
            println!(
                "{} domain '{}'",
                colors::success("Archived"),
                colors::domain(&domain.id)
            );
        }
        OutputFormat::Json => print_json(&domain)?,
    }

    Ok(())
}

/// Execute delete-domain command
pub async fn execute_delete(
    args: DeleteArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    // Confirmation prompt unless --force
    if !args.force {
        let what = if args.cascade {
            "and all descendants"
        } else {
            "and its records"
        };
        print!("Delete domain '{}' {what}? [y/N] ", colors::domain(&args.id));
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", colors::dim("Cancelled."));
            return Ok(());
        }
    }

    let removed = services.delete_domain(&args.id, args.cascade)?;

    match format {
        OutputFormat::Human => {
            println!(
                "{} {} domain(s): {}",
                colors::success("Deleted"),
                colors::number(&removed.len().to_string()),
                removed.join(", ")
            );
        }
        OutputFormat::Json => {
            let response = serde_json::json!({
                "deleted": true,
                "domains": removed,
            });
            print_json(&response)?;
        }
    }

    Ok(())
}

/// Execute domain-stats command
pub async fn execute_stats(
    args: StatsArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = args.id.as_deref().unwrap_or(ctx.current());
    let stats = services.domain_stats(id)?;
    let domain = services.registry.get(id)?;

    match format {
        OutputFormat::Human => {
            println!("{}", colors::label(&format!("Domain: {}", stats.domain)));
            println!("  Path:        {}", colors::domain(&stats.path));
            println!(
                "  Status:      {}",
                if stats.active {
                    colors::success("active")
                } else {
                    colors::warning("archived")
                }
            );
            println!(
                "  Resources:   {}",
                colors::number(&stats.resources.to_string())
            );
            println!("  Prompts:     {}", colors::number(&stats.prompts.to_string()));
            println!(
                "  Children:    {} ({} descendants)",
                colors::number(&stats.children.to_string()),
                stats.descendants
            );
            println!(
                "  Scope size:  {} domain(s) under {}",
                colors::number(&stats.scope_size.to_string()),
                services.config.domains.isolation_mode
            );
            println!(
                "  Updated:     {}",
                colors::dim(&format_relative_time(&domain.updated_at))
            );
        }
        OutputFormat::Json => print_json(&stats)?,
    }

    Ok(())
}
