//! find tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use super::helpers::format_bytes;
use crate::core::emulation::FindOptions;
use crate::core::services::Services;
use crate::core::types::FindResponse;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct FindHandler {
    services: Arc<Services>,
}

impl FindHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    fn format_results(&self, response: &FindResponse) -> String {
        let mut output = format!(
            "**find**: {} record(s) of {} scanned ({}ms)\n\n",
            response.results.len(),
            response.records_scanned,
            response.duration_ms
        );
        if response.skipped > 0 {
            output.push_str(&format!(
                "_{} malformed record(s) skipped_\n\n",
                response.skipped
            ));
        }
        if response.results.is_empty() {
            output.push_str("No records matched.\n");
            return output;
        }

        output.push_str("| Path | Id | Name | Size | Modified |\n");
        output.push_str("|------|----|------|------|----------|\n");
        for result in &response.results {
            output.push_str(&format!(
                "| `{}` | `{}` | {} | {} | {} |\n",
                result.virtual_path,
                result.shorthand,
                result.name,
                format_bytes(result.size),
                result.modified_at.format("%Y-%m-%d %H:%M")
            ));
        }
        output
    }
}

#[async_trait]
impl McpToolHandler for FindHandler {
    fn name(&self) -> &str {
        "find"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "find".to_string(),
            description: "find records by metadata. Resources appear as files and prompts as \
                         directories under /<domain path>/<resources|prompts>/<id>. Criteria \
                         are ANDed: name regex, type, contentType, tags (any of) and size."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Case-insensitive regex on name or id"},
                    "type": {"type": "string", "enum": ["f", "file", "d", "directory", "prompt", "resource"]},
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "contentType": {"type": "string"},
                    "size": {"type": "string", "description": "+N, -N or N with optional k/m/g (1024-based)"},
                    "limit": {"type": "integer", "minimum": 1},
                    "domains": {"type": "array", "items": {"type": "string"}}
                },
                "required": []
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let options: FindOptions = parse_args(args)?;
        let response = self
            .services
            .find(&options, &session.context())
            .map_err(McpError::from)?;
        Ok(text_content(self.format_results(&response)))
    }
}
