//! Grep command - exact line scan over record bodies

use crate::cli::output::{colors, print_json};
use crate::cli::OutputFormat;
use crate::core::domain::DomainContext;
use crate::core::emulation::GrepOptions;
use crate::core::services::Services;
use crate::core::types::{LineKind, LineScanOutput, LineScanResponse, RecordKind};
use clap::Args;
use std::sync::Arc;

/// Arguments for the grep command
#[derive(Args, Debug, Default)]
pub struct GrepArgs {
    /// Pattern (basic regex unless -E or -F)
    pub pattern: String,

    #[arg(long, short = 'i')]
    pub ignore_case: bool,

    /// Select non-matching lines
    #[arg(long, short = 'v')]
    pub invert_match: bool,

    #[arg(long, short = 'w')]
    pub word_regexp: bool,

    /// Extended regular expressions
    #[arg(long, short = 'E')]
    pub extended_regexp: bool,

    /// Fixed string, wins over -E
    #[arg(long, short = 'F')]
    pub fixed_strings: bool,

    /// Print only the matched parts of a line
    #[arg(long, short = 'o')]
    pub only_matching: bool,

    /// Print match counts per record
    #[arg(long, short = 'c')]
    pub count: bool,

    /// Stop after this many matching lines in total
    #[arg(long, short = 'm')]
    pub max_count: Option<usize>,

    #[arg(long, short = 'C', default_value = "0")]
    pub context: usize,

    #[arg(long, short = 'B')]
    pub before_context: Option<usize>,

    #[arg(long, short = 'A')]
    pub after_context: Option<usize>,

    /// Only records carrying this tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Record type (resource or prompt)
    #[arg(long = "type", short = 't')]
    pub kind: Option<RecordKind>,

    /// Scan these domains instead of the current scope (repeatable)
    #[arg(long = "in")]
    pub domains: Vec<String>,
}

impl GrepArgs {
    pub fn to_options(&self) -> GrepOptions {
        GrepOptions {
            pattern: self.pattern.clone(),
            ignore_case: self.ignore_case,
            invert_match: self.invert_match,
            whole_words: self.word_regexp,
            extended: self.extended_regexp,
            fixed: self.fixed_strings,
            only_matching: self.only_matching,
            count: self.count,
            max_count: self.max_count,
            context: self.context,
            before: self.before_context,
            after: self.after_context,
            tags: self.tags.clone(),
            kind: self.kind,
            domains: self.domains.clone(),
        }
    }
}

/// Execute the grep command
pub async fn execute(
    args: GrepArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = services.grep(&args.to_options(), ctx)?;
    print_line_scan(&response, format)
}

/// Print a grep/rg response the way the command-line tools do
pub(crate) fn print_line_scan(
    response: &LineScanResponse,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if format == OutputFormat::Json {
        print_json(response)?;
        return Ok(());
    }

    match &response.output {
        LineScanOutput::Lines { matches } => {
            if matches.is_empty() {
                println!(
                    "No matches for '{}' ({} records scanned)",
                    colors::label(&response.pattern),
                    colors::number(&response.records_scanned.to_string())
                );
            }
            for m in matches {
                if m.context.is_empty() {
                    println!(
                        "{}:{}: {}",
                        colors::shorthand(&m.shorthand),
                        colors::number(&m.line_number.to_string()),
                        m.text
                    );
                    continue;
                }
                for line in &m.context {
                    let sep = if line.kind == LineKind::Match { ':' } else { '-' };
                    let text = if line.kind == LineKind::Match {
                        m.text.as_str()
                    } else {
                        line.text.as_str()
                    };
                    println!(
                        "{}{sep}{}{sep} {}",
                        colors::shorthand(&m.shorthand),
                        colors::number(&line.line_number.to_string()),
                        text
                    );
                }
                println!("{}", colors::dim("--"));
            }
        }
        LineScanOutput::Count { total, per_record } => {
            for (token, count) in per_record {
                println!(
                    "{}:{}",
                    colors::shorthand(token),
                    colors::number(&count.to_string())
                );
            }
            println!("{} {}", colors::label("Total:"), colors::number(&total.to_string()));
        }
        LineScanOutput::Files { files } => {
            for file in files {
                println!("{}", colors::shorthand(&file.shorthand));
            }
        }
    }

    if response.truncated {
        println!("{}", colors::dim("(stopped at max count)"));
    }
    if response.skipped > 0 {
        println!(
            "{}",
            colors::warning(&format!("{} malformed record(s) skipped", response.skipped))
        );
    }

    Ok(())
}
