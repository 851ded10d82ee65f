//! Search commands - plain and advanced search over the ranked index

use crate::cli::output::{colors, format_duration, print_json, truncate_line};
use crate::cli::OutputFormat;
use crate::core::domain::{DomainContext, IsolationMode};
use crate::core::services::Services;
use crate::core::types::{
    LineKind, RecordKind, SearchMode, SearchQuerySpec, SearchResponse, SortBy, SortOrder,
};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query (mode is detected: /regex/, wild*card, term~, long queries)
    pub query: String,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Isolation mode override (strict, shared, hierarchical)
    #[arg(long)]
    pub isolation: Option<IsolationMode>,

    /// Only show record tokens (no snippets)
    #[arg(long)]
    pub ids_only: bool,
}

/// Arguments for the advanced-search command
#[derive(Args, Debug, Default)]
pub struct AdvancedSearchArgs {
    /// Search query (may be empty to match everything)
    #[arg(default_value = "")]
    pub query: String,

    /// Query mode (smart, exact, fuzzy, regex, wildcard, semantic)
    #[arg(long, short = 'm', default_value = "smart")]
    pub mode: SearchMode,

    #[arg(long)]
    pub case_sensitive: bool,

    #[arg(long, short = 'w')]
    pub whole_words: bool,

    /// Record type (resource or prompt)
    #[arg(long = "type", short = 't')]
    pub kind: Option<RecordKind>,

    #[arg(long)]
    pub content_type: Option<String>,

    /// Require a tag (repeatable, any-of)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Search these domains instead of the current scope (repeatable)
    #[arg(long = "in")]
    pub domains: Vec<String>,

    /// Restrict matching to a field (repeatable)
    #[arg(long = "field")]
    pub fields: Vec<String>,

    #[arg(long)]
    pub min_score: Option<f32>,

    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Sort key (relevance, date, created, title, type)
    #[arg(long, default_value = "relevance")]
    pub sort_by: SortBy,

    /// Sort order (asc, desc)
    #[arg(long, default_value = "desc")]
    pub sort_order: SortOrder,

    /// Wrap matched terms in the snippet
    #[arg(long)]
    pub highlight: bool,

    /// Snippet window in characters
    #[arg(long, default_value = "0")]
    pub snippet_length: usize,

    /// Content must contain one of these patterns (repeatable)
    #[arg(long = "include")]
    pub include_patterns: Vec<String>,

    /// Content must not contain these patterns (repeatable)
    #[arg(long = "exclude")]
    pub exclude_patterns: Vec<String>,

    /// Lines of context around matching lines
    #[arg(long, short = 'C', default_value = "0")]
    pub context: usize,

    /// Regex mode: `.` matches newlines, `^`/`$` match per line
    #[arg(long)]
    pub multiline: bool,
}

impl AdvancedSearchArgs {
    pub fn to_spec(&self) -> SearchQuerySpec {
        SearchQuerySpec {
            raw_text: self.query.clone(),
            mode: self.mode,
            case_sensitive: self.case_sensitive,
            whole_words: self.whole_words,
            type_filter: self.kind,
            content_type: self.content_type.clone(),
            tags: self.tags.clone(),
            domains: self.domains.clone(),
            fields: self.fields.clone(),
            min_score: self.min_score,
            limit: self.limit,
            offset: self.offset,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            highlight: self.highlight,
            snippet_length: self.snippet_length,
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
            context_lines: self.context,
            multiline: self.multiline,
        }
    }
}

/// Search result item
#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub rank: usize,
    pub id: String,
    pub domain: String,
    pub shorthand: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub title: String,
    pub score: f32,
    pub match_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line_numbers: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub mode: SearchMode,
    pub domain: String,
    pub scope: Vec<String>,
    pub total_results: usize,
    pub duration_ms: u64,
    pub results: Vec<SearchResultItem>,
}

impl SearchOutput {
    pub fn from_response(response: SearchResponse, domain: &str, ids_only: bool) -> Self {
        let results = response
            .results
            .into_iter()
            .enumerate()
            .map(|(i, r)| SearchResultItem {
                rank: i + 1,
                id: r.id,
                domain: r.domain,
                shorthand: r.shorthand,
                kind: r.kind,
                title: r.title,
                score: r.score,
                match_count: r.match_count,
                line_numbers: r.line_numbers,
                snippet: if ids_only { None } else { Some(r.snippet) },
                context: r
                    .context_lines
                    .iter()
                    .map(|line| {
                        let marker = if line.kind == LineKind::Match { ':' } else { '-' };
                        format!("{}{marker} {}", line.line_number, line.text)
                    })
                    .collect(),
            })
            .collect();

        Self {
            query: response.query,
            mode: response.mode,
            domain: domain.to_string(),
            scope: response.scope,
            total_results: response.count,
            duration_ms: response.duration_ms,
            results,
        }
    }
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut spec = SearchQuerySpec::text(args.query.clone());
    spec.limit = args.limit;

    let response = services.search(&spec, ctx, args.isolation)?;
    let output = SearchOutput::from_response(response, ctx.current(), args.ids_only);
    print_search(&output, args.ids_only, format)
}

/// Execute the advanced-search command
pub async fn execute_advanced(
    args: AdvancedSearchArgs,
    services: &Arc<Services>,
    ctx: &DomainContext,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec = args.to_spec();
    let response = services.advanced_search(&spec, ctx)?;
    let output = SearchOutput::from_response(response, ctx.current(), false);
    print_search(&output, false, format)
}

fn print_search(
    output: &SearchOutput,
    ids_only: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => {
            if output.results.is_empty() {
                println!(
                    "No results found for '{}' in domain '{}'",
                    colors::label(&output.query),
                    colors::domain(&output.domain)
                );
                return Ok(());
            }

            println!(
                "Found {} result(s) in '{}' ({} mode, {}):\n",
                colors::number(&output.total_results.to_string()),
                colors::domain(&output.domain),
                output.mode,
                colors::dim(&format_duration(output.duration_ms))
            );

            for result in &output.results {
                if ids_only {
                    println!("{}", colors::shorthand(&result.shorthand));
                    continue;
                }
                println!(
                    "[{}] {} {} {}",
                    colors::rank(&result.rank.to_string()),
                    colors::shorthand(&result.shorthand),
                    colors::label(&result.title),
                    colors::dim(&format!("({}, score: {:.2})", result.kind, result.score))
                );
                if result.context.is_empty() {
                    if let Some(snippet) = &result.snippet {
                        for line in snippet.lines().take(5) {
                            println!("    {}", colors::dim(&truncate_line(line, 100)));
                        }
                    }
                } else {
                    for line in &result.context {
                        println!("    {}", truncate_line(line, 100));
                    }
                }
                println!();
            }
        }
        OutputFormat::Json => print_json(output)?,
    }

    Ok(())
}
