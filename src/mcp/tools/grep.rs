//! grep tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use super::helpers::format_line_scan;
use crate::core::emulation::GrepOptions;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct GrepHandler {
    services: Arc<Services>,
}

impl GrepHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for GrepHandler {
    fn name(&self) -> &str {
        "grep"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "grep".to_string(),
            description: "grep over every record body in scope, line by line. Exhaustive \
                         and exact: line numbers and context come from the stored text, \
                         not the index. Literal matching by default; set extended for regex."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string", "minLength": 1},
                    "ignoreCase": {"type": "boolean", "description": "-i"},
                    "invertMatch": {"type": "boolean", "description": "-v"},
                    "wholeWords": {"type": "boolean", "description": "-w"},
                    "extended": {"type": "boolean", "description": "-E: pattern is a regex"},
                    "fixed": {"type": "boolean", "description": "-F: literal, wins over extended"},
                    "onlyMatching": {"type": "boolean", "description": "-o"},
                    "count": {"type": "boolean", "description": "-c"},
                    "maxCount": {"type": "integer", "minimum": 1, "description": "-m, across the whole scan"},
                    "context": {"type": "integer", "minimum": 0, "description": "-C"},
                    "before": {"type": "integer", "minimum": 0, "description": "-B"},
                    "after": {"type": "integer", "minimum": 0, "description": "-A"},
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "type": {"type": "string", "enum": ["resource", "prompt"]},
                    "domains": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["pattern"]
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let options: GrepOptions = parse_args(args)?;
        let response = self
            .services
            .grep(&options, &session.context())
            .map_err(McpError::from)?;
        Ok(text_content(format_line_scan("grep", &response)))
    }
}
