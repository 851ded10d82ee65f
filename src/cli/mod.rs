//! CLI adapter for Quiver
//!
//! Exposes the catalog, domain and search operations on the command line.
//! This module is parallel to `mcp/` - both depend on `core/` but not on each other.
//!
//! # Architecture
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!          +------------+------------+
//!          |                         |
//!          v                         v
//! +------------------+      +------------------+
//! |      mcp/        |      |      cli/        |
//! | (stdio adapter)  |      | (clap adapter)   |
//! +------------------+      +------------------+
//! ```
//!
//! A CLI invocation is a session of one command: its current domain
//! comes from `--domain` (or `QUIVER_DOMAIN`), falling back to the
//! configured default domain.

pub mod commands;
pub mod output;

use crate::core::domain::DomainContext;
use clap::{Parser, Subcommand};

/// Quiver - domain-scoped search over resources and prompts
///
/// Store resources and prompt templates in hierarchical domains, then
/// search them with smart, exact, fuzzy, regex or wildcard queries, or
/// with grep, find and rg style views.
#[derive(Parser, Debug)]
#[command(name = "quiver")]
#[command(version)]
#[command(about = "Domain-scoped resource and prompt search", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Current domain for this invocation
    #[arg(long, short = 'D', global = true, env = "QUIVER_DOMAIN")]
    pub domain: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
///
/// Command names match MCP tool names (underscores become hyphens).
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search resources and prompts (mode detected from the query)
    Search(commands::SearchArgs),

    /// Search with an explicit mode, filters and sorting
    #[command(name = "advanced-search")]
    AdvancedSearch(commands::AdvancedSearchArgs),

    /// Scan record bodies line by line like grep
    Grep(commands::GrepArgs),

    /// Find records by name, type, tags and size
    Find(commands::FindArgs),

    /// rg over the ranked index
    #[command(name = "ripgrep", visible_alias = "rg")]
    Ripgrep(commands::RipgrepArgs),

    /// Create a domain
    #[command(name = "create-domain")]
    CreateDomain(commands::domain::CreateArgs),

    /// List domains
    #[command(name = "list-domains")]
    ListDomains(commands::domain::ListArgs),

    /// Check that a domain can become the current domain
    #[command(name = "switch-domain")]
    SwitchDomain(commands::domain::SwitchArgs),

    /// Deactivate a domain
    #[command(name = "archive-domain")]
    ArchiveDomain(commands::domain::ArchiveArgs),

    /// Delete a domain and every record stored in it
    #[command(name = "delete-domain")]
    DeleteDomain(commands::domain::DeleteArgs),

    /// Record counts and scope size for a domain
    #[command(name = "domain-stats")]
    DomainStats(commands::domain::StatsArgs),

    /// Resolve or build `domain:id` tokens
    Shorthand(commands::ShorthandArgs),

    /// Create or replace a resource
    #[command(name = "add-resource")]
    AddResource(commands::record::AddResourceArgs),

    /// Create or replace a prompt template
    #[command(name = "add-prompt")]
    AddPrompt(commands::record::AddPromptArgs),

    /// Fetch a record, or render a prompt with --arg
    #[command(name = "get-record")]
    GetRecord(commands::record::GetArgs),

    /// Delete a single record
    #[command(name = "delete-record")]
    DeleteRecord(commands::record::DeleteArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Show version information
    #[command(name = "get-server-info")]
    GetServerInfo(commands::InfoArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  quiver completions bash > ~/.local/share/bash-completion/completions/quiver
    ///   zsh:   quiver completions zsh > ~/.zfunc/_quiver
    ///   fish:  quiver completions fish > ~/.config/fish/completions/quiver.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;

    let config = Config::load()?;
    let services = Arc::new(Services::new(config)?);

    let ctx = match &cli.domain {
        Some(domain) => DomainContext::new(domain.as_str()),
        None => services.default_context(),
    };

    dispatch(cli.command, &services, &ctx, cli.format).await
}

/// Execute one command against existing services
pub async fn dispatch(
    command: Commands,
    services: &std::sync::Arc<crate::core::services::Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    use commands::{domain, record};

    match command {
        Commands::Search(args) => commands::search::execute(args, services, ctx, format).await,
        Commands::AdvancedSearch(args) => {
            commands::search::execute_advanced(args, services, ctx, format).await
        }
        Commands::Grep(args) => commands::grep::execute(args, services, ctx, format).await,
        Commands::Find(args) => commands::find::execute(args, services, ctx, format).await,
        Commands::Ripgrep(args) => commands::ripgrep::execute(args, services, ctx, format).await,
        Commands::CreateDomain(args) => domain::execute_create(args, services, format).await,
        Commands::ListDomains(args) => domain::execute_list(args, services, ctx, format).await,
        Commands::SwitchDomain(args) => domain::execute_switch(args, services, format).await,
        Commands::ArchiveDomain(args) => domain::execute_archive(args, services, format).await,
        Commands::DeleteDomain(args) => domain::execute_delete(args, services, format).await,
        Commands::DomainStats(args) => domain::execute_stats(args, services, ctx, format).await,
        Commands::Shorthand(args) => commands::shorthand::execute(args, services, ctx, format).await,
        Commands::AddResource(args) => record::execute_add_resource(args, services, ctx, format).await,
        Commands::AddPrompt(args) => record::execute_add_prompt(args, services, ctx, format).await,
        Commands::GetRecord(args) => record::execute_get(args, services, ctx, format).await,
        Commands::DeleteRecord(args) => record::execute_delete(args, services, ctx, format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, services, format).await,
        Commands::GetServerInfo(args) => commands::info::execute(args, services, format).await,
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
