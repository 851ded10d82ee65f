//! Search tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use super::helpers::{fence_language, truncate_text};
use crate::core::domain::IsolationMode;
use crate::core::services::Services;
use crate::core::types::{SearchQuerySpec, SearchResponse};
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_RESULT_TEXT_CHARS: usize = 2000;

/// Markdown rendering shared by search and advanced_search
pub(super) fn format_results(response: &SearchResponse) -> String {
    let mut output = format!(
        "Found {} results for query '{}' (mode: {}, {}ms)\n",
        response.count, response.query, response.mode, response.duration_ms
    );
    output.push_str(&format!("Scope: {}\n\n", response.scope.join(", ")));

    if response.results.is_empty() {
        output.push_str("No results found. Try different keywords or widen the domain scope.");
        return output;
    }

    for (i, result) in response.results.iter().enumerate() {
        output.push_str(&format!(
            "## {}. {} (score: {:.2})\n",
            i + 1,
            result.title,
            result.score
        ));
        output.push_str(&format!(
            "**Id:** `{}` | **Type:** {} | **Matches:** {}\n",
            result.shorthand, result.kind, result.match_count
        ));
        if !result.tags.is_empty() {
            output.push_str(&format!("**Tags:** {}\n", result.tags.join(", ")));
        }
        if !result.line_numbers.is_empty() {
            let lines: Vec<String> = result.line_numbers.iter().map(usize::to_string).collect();
            output.push_str(&format!("**Lines:** {}\n", lines.join(", ")));
        }
        for highlight in &result.highlights {
            output.push_str(&format!("> {highlight}\n"));
        }

        let lang = fence_language(result.content_type.as_deref().unwrap_or(""));
        if result.context_lines.is_empty() {
            let text = truncate_text(&result.snippet, MAX_RESULT_TEXT_CHARS);
            output.push_str(&format!("\n```{lang}\n{text}\n```\n\n"));
        } else {
            output.push_str(&format!("\n```{lang}\n"));
            for line in &result.context_lines {
                output.push_str(&format!("{:>5} | {}\n", line.line_number, line.text));
            }
            output.push_str("```\n\n");
        }
    }

    output
}

pub struct SearchHandler {
    services: Arc<Services>,
}

impl SearchHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    offset: usize,
    #[serde(default)]
    domains: Vec<String>,
    #[serde(default)]
    isolation: Option<IsolationMode>,
}

#[async_trait]
impl McpToolHandler for SearchHandler {
    fn name(&self) -> &str {
        "search"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search".to_string(),
            description: "Search resources and prompts in the current domain scope. \
                         Query syntax is detected automatically: `*`/`?` for wildcards, \
                         `/pattern/` for regex, a trailing `~` for fuzzy matching and \
                         more than three words for concept search. Falls back to fuzzy \
                         matching when nothing matches. Use advanced_search for full control."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search text. Examples: 'auth', 'deploy*', '/tok[ae]n/', 'authentcation~'",
                        "minLength": 1
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Max results (default from config, capped at max_limit)",
                        "minimum": 1
                    },
                    "offset": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 0
                    },
                    "domains": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Explicit domains to search instead of the session scope"
                    },
                    "isolation": {
                        "type": "string",
                        "enum": ["strict", "shared", "hierarchical"],
                        "description": "Override the configured isolation mode for this search"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: SearchArgs = parse_args(args)?;

        let spec = SearchQuerySpec {
            raw_text: args.query,
            limit: args.limit,
            offset: args.offset,
            domains: args.domains,
            ..SearchQuerySpec::default()
        };
        let response = self
            .services
            .search(&spec, &session.context(), args.isolation)
            .map_err(McpError::from)?;

        Ok(text_content(format_results(&response)))
    }
}
