//! Advanced search tool handler
//!
//! Takes the full query spec: explicit mode, filters, post-filters,
//! sorting, highlighting and context lines.

use super::handler::{parse_args, text_content, McpToolHandler};
use super::search::format_results;
use crate::core::services::Services;
use crate::core::types::SearchQuerySpec;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct AdvancedSearchHandler {
    services: Arc<Services>,
}

impl AdvancedSearchHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for AdvancedSearchHandler {
    fn name(&self) -> &str {
        "advanced_search"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "advanced_search".to_string(),
            description: "Search with an explicit mode and full control over filtering and \
                         result shaping. The mode is honoured as given (no fuzzy fallback). \
                         Post-filters (minScore, includePatterns, excludePatterns) apply to \
                         the returned page."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Query text; empty matches everything"},
                    "mode": {
                        "type": "string",
                        "enum": ["smart", "exact", "fuzzy", "regex", "wildcard", "semantic"],
                        "default": "smart"
                    },
                    "caseSensitive": {"type": "boolean", "default": false},
                    "wholeWords": {"type": "boolean", "default": false},
                    "type": {"type": "string", "enum": ["resource", "prompt"]},
                    "contentType": {"type": "string"},
                    "tags": {"type": "array", "items": {"type": "string"}, "description": "Any of these tags"},
                    "domains": {"type": "array", "items": {"type": "string"}},
                    "fields": {
                        "type": "array",
                        "items": {"type": "string", "enum": ["title", "content", "tags", "search_terms"]}
                    },
                    "minScore": {"type": "number"},
                    "limit": {"type": "integer", "minimum": 1},
                    "offset": {"type": "integer", "minimum": 0},
                    "sortBy": {
                        "type": "string",
                        "enum": ["relevance", "date", "created", "title", "type"],
                        "default": "relevance"
                    },
                    "sortOrder": {"type": "string", "enum": ["asc", "desc"], "default": "desc"},
                    "highlight": {"type": "boolean", "default": false},
                    "snippetLength": {"type": "integer", "minimum": 0},
                    "includePatterns": {"type": "array", "items": {"type": "string"}},
                    "excludePatterns": {"type": "array", "items": {"type": "string"}},
                    "contextLines": {"type": "integer", "minimum": 0},
                    "multiline": {"type": "boolean", "default": false}
                },
                "required": []
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let spec: SearchQuerySpec = parse_args(args)?;
        let response = self
            .services
            .advanced_search(&spec, &session.context())
            .map_err(McpError::from)?;
        Ok(text_content(format_results(&response)))
    }
}
