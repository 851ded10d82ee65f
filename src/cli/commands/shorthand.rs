//! Shorthand command - resolve or build `domain:id` tokens

use crate::cli::output::{colors, print_json};
use crate::cli::OutputFormat;
use crate::core::domain::DomainContext;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the shorthand command
#[derive(Args, Debug, Default)]
pub struct ShorthandArgs {
    /// Token to resolve (`::id`, `domain:id` or a bare id)
    #[arg(required_unless_present = "local_id")]
    pub token: Option<String>,

    /// Build a token for this local id instead
    #[arg(long, conflicts_with = "token")]
    pub local_id: Option<String>,

    /// Domain used with --local-id (defaults to the current domain)
    #[arg(long = "of", requires = "local_id")]
    pub of_domain: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShorthandOutput {
    pub token: String,
    pub domain: String,
    pub local_id: String,
}

/// Resolve or build a token relative to `ctx`
pub fn shorthand(
    args: &ShorthandArgs,
    services: &Services,
    ctx: &DomainContext,
) -> Result<ShorthandOutput, Box<dyn std::error::Error>> {
    if let Some(local_id) = &args.local_id {
        let domain = args.of_domain.as_deref().unwrap_or(ctx.current());
        let token = services.build_shorthand(domain, local_id)?;
        return Ok(ShorthandOutput {
            token,
            domain: domain.to_string(),
            local_id: local_id.clone(),
        });
    }

    let token = args.token.as_deref().unwrap_or_default();
    let resolved = services.resolve_shorthand(token, ctx)?;
    Ok(ShorthandOutput {
        token: services.build_shorthand(&resolved.domain, &resolved.local_id)?,
        domain: resolved.domain,
        local_id: resolved.local_id,
    })
}

/// Execute the shorthand command
pub async fn execute(
    args: ShorthandArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = shorthand(&args, services, ctx)?;

    match format {
        OutputFormat::Human => {
            println!(
                "{}  {} {}",
                colors::shorthand(&output.token),
                colors::domain(&output.domain),
                colors::dim(&output.local_id)
            );
        }
        OutputFormat::Json => print_json(&output)?,
    }

    Ok(())
}
