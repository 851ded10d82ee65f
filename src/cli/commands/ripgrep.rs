//! Ripgrep command - rg over the ranked index

use super::grep::print_line_scan;
use crate::cli::OutputFormat;
use crate::core::domain::DomainContext;
use crate::core::emulation::RipgrepOptions;
use crate::core::services::Services;
use clap::Args;
use std::sync::Arc;

/// Arguments for the ripgrep command
#[derive(Args, Debug, Default)]
pub struct RipgrepArgs {
    /// Pattern
    pub pattern: String,

    #[arg(long, short = 's')]
    pub case_sensitive: bool,

    /// Case-sensitive only when the pattern has an uppercase letter
    #[arg(long, short = 'S')]
    pub smart_case: bool,

    #[arg(long, short = 'F')]
    pub fixed_strings: bool,

    #[arg(long, short = 'U')]
    pub multiline: bool,

    #[arg(long, short = 'w')]
    pub word_regexp: bool,

    /// Glob matched against the virtual path or the id
    #[arg(long, short = 'g')]
    pub glob: Option<String>,

    /// Matching lines per record
    #[arg(long, short = 'm')]
    pub max_count: Option<usize>,

    #[arg(long, short = 'c')]
    pub count: bool,

    /// Only print records with at least one match
    #[arg(long, short = 'l')]
    pub files_with_matches: bool,

    #[arg(long, short = 'C', default_value = "0")]
    pub context: usize,

    #[arg(long, short = 'B')]
    pub before_context: Option<usize>,

    #[arg(long, short = 'A')]
    pub after_context: Option<usize>,

    /// Search these domains instead of the current scope (repeatable)
    #[arg(long = "in")]
    pub domains: Vec<String>,
}

impl RipgrepArgs {
    pub fn to_options(&self) -> RipgrepOptions {
        RipgrepOptions {
            pattern: self.pattern.clone(),
            case_sensitive: self.case_sensitive,
            smart_case: self.smart_case,
            fixed_strings: self.fixed_strings,
            multiline: self.multiline,
            word_regexp: self.word_regexp,
            glob: self.glob.clone(),
            max_count: self.max_count,
            count: self.count,
            files_with_matches: self.files_with_matches,
            context: self.context,
            before: self.before_context,
            after: self.after_context,
            domains: self.domains.clone(),
        }
    }
}

/// Execute the ripgrep command
pub async fn execute(
    args: RipgrepArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = services.ripgrep(&args.to_options(), ctx)?;
    print_line_scan(&response, format)
}
