//! Quiver CLI - command-line interface for Quiver
//!
//! Use this for scripting, automation, or manual operations without an MCP client.
//!
//! # Examples
//!
//! ```bash
//! # Create a domain and add a resource to it
//! quiver create-domain team-a
//! quiver --domain team-a add-resource runbook --content "restart the service"
//!
//! # Search the current domain's scope
//! quiver --domain team-a search "restart"
//!
//! # grep and rg over stored records
//! quiver grep -i -C 1 "error"
//! quiver rg -l "deploy"
//! ```

use clap::Parser;
use quiver::cli::{output, run, Cli};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quiver=warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
