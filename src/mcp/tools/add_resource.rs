//! Add resource tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use super::helpers::format_bytes;
use crate::core::domain::shorthand;
use crate::core::services::{ResourceInput, Services};
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct AddResourceHandler {
    services: Arc<Services>,
}

impl AddResourceHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for AddResourceHandler {
    fn name(&self) -> &str {
        "add_resource"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "add_resource".to_string(),
            description: "Create or replace a resource (a stored document). Written to the \
                         given domain or the current one; the domain must be active. \
                         Replacing keeps the original creation time."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "description": "Local id: no ':' and no whitespace"},
                    "domain": {"type": "string"},
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "content": {"type": "string"},
                    "contentType": {"type": "string", "default": "text/plain"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["id", "content"]
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let input: ResourceInput = parse_args(args)?;
        let record = self
            .services
            .put_resource(input, &session.context())
            .map_err(McpError::from)?;
        let token = shorthand::build(record.domain(), record.id()).map_err(McpError::from)?;
        Ok(text_content(format!(
            "Stored resource `{token}` ({}, {})\n",
            record.name(),
            format_bytes(record.size())
        )))
    }
}
