//! ripgrep tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use super::helpers::format_line_scan;
use crate::core::emulation::RipgrepOptions;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct RipgrepHandler {
    services: Arc<Services>,
}

impl RipgrepHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for RipgrepHandler {
    fn name(&self) -> &str {
        "ripgrep"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "ripgrep".to_string(),
            description: "rg over the ranked index: records are found through the query \
                         compiler, then their lines are matched and shaped. Faster than grep \
                         on large scopes; records the index does not match are never read."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string", "minLength": 1},
                    "caseSensitive": {"type": "boolean", "description": "-s"},
                    "smartCase": {"type": "boolean", "description": "-S"},
                    "fixedStrings": {"type": "boolean", "description": "-F"},
                    "multiline": {"type": "boolean", "description": "-U: pattern is a regex"},
                    "wordRegexp": {"type": "boolean", "description": "-w"},
                    "glob": {"type": "string", "description": "-g, matched against the virtual path or id"},
                    "maxCount": {"type": "integer", "minimum": 1, "description": "-m, per record"},
                    "count": {"type": "boolean", "description": "-c"},
                    "filesWithMatches": {"type": "boolean", "description": "-l"},
                    "context": {"type": "integer", "minimum": 0, "description": "-C"},
                    "before": {"type": "integer", "minimum": 0, "description": "-B"},
                    "after": {"type": "integer", "minimum": 0, "description": "-A"},
                    "domains": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["pattern"]
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let options: RipgrepOptions = parse_args(args)?;
        let response = self
            .services
            .ripgrep(&options, &session.context())
            .map_err(McpError::from)?;
        Ok(text_content(format_line_scan("rg", &response)))
    }
}
