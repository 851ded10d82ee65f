//! Add prompt tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use crate::core::domain::shorthand;
use crate::core::services::{PromptInput, Services};
use crate::core::types::Record;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct AddPromptHandler {
    services: Arc<Services>,
}

impl AddPromptHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for AddPromptHandler {
    fn name(&self) -> &str {
        "add_prompt"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "add_prompt".to_string(),
            description: "Create or replace a prompt template. `{{name}}` placeholders \
                         become the prompt's variables unless variables are given explicitly."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "domain": {"type": "string"},
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "template": {"type": "string"},
                    "variables": {"type": "array", "items": {"type": "string"}},
                    "tags": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["id", "template"]
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let input: PromptInput = parse_args(args)?;
        let record = self
            .services
            .put_prompt(input, &session.context())
            .map_err(McpError::from)?;
        let token = shorthand::build(record.domain(), record.id()).map_err(McpError::from)?;

        let mut text = format!("Stored prompt `{token}` ({})\n", record.name());
        if let Record::Prompt(prompt) = &record {
            if !prompt.variables.is_empty() {
                text.push_str(&format!("**Variables:** {}\n", prompt.variables.join(", ")));
            }
        }
        Ok(text_content(text))
    }
}
