//! Get record tool handler
//!
//! Fetches a resource or prompt by shorthand token. With `arguments`
//! a prompt is rendered instead of returned raw.

use super::handler::{parse_args, text_content, McpToolHandler};
use super::helpers::{fence_language, format_bytes, truncate_text};
use crate::core::domain::shorthand;
use crate::core::services::Services;
use crate::core::types::Record;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

const MAX_BODY_CHARS: usize = 20_000;

pub struct GetRecordHandler {
    services: Arc<Services>,
}

impl GetRecordHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    fn format_record(&self, record: &Record) -> String {
        let token = shorthand::build(record.domain(), record.id())
            .unwrap_or_else(|_| format!("{}:{}", record.domain(), record.id()));
        let mut output = format!("# {}\n\n", record.name());
        output.push_str(&format!("- **Id:** `{token}`\n"));
        output.push_str(&format!("- **Type:** {}\n", record.kind()));
        if let Some(content_type) = record.content_type() {
            output.push_str(&format!("- **Content type:** {content_type}\n"));
        }
        output.push_str(&format!("- **Size:** {}\n", format_bytes(record.size())));
        if !record.tags().is_empty() {
            output.push_str(&format!("- **Tags:** {}\n", record.tags().join(", ")));
        }
        if let Record::Prompt(prompt) = record {
            if !prompt.variables.is_empty() {
                output.push_str(&format!("- **Variables:** {}\n", prompt.variables.join(", ")));
            }
        }
        output.push_str(&format!(
            "- **Updated:** {}\n",
            record.updated_at().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if !record.description().is_empty() {
            output.push_str(&format!("\n{}\n", record.description()));
        }

        let lang = fence_language(record.content_type().unwrap_or(""));
        output.push_str(&format!(
            "\n```{lang}\n{}\n```\n",
            truncate_text(record.body(), MAX_BODY_CHARS)
        ));
        output
    }
}

#[derive(Debug, Deserialize)]
struct GetRecordArgs {
    id: String,
    #[serde(default)]
    arguments: Option<BTreeMap<String, String>>,
}

#[async_trait]
impl McpToolHandler for GetRecordHandler {
    fn name(&self) -> &str {
        "get_record"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_record".to_string(),
            description: "Fetch a resource or prompt by token (`::id`, `domain:id` or a bare \
                         id in the current domain). Pass arguments to render a prompt."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "arguments": {
                        "type": "object",
                        "additionalProperties": {"type": "string"},
                        "description": "Prompt variables to substitute"
                    }
                },
                "required": ["id"]
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: GetRecordArgs = parse_args(args)?;
        let ctx = session.context();

        let text = match args.arguments {
            Some(arguments) => self
                .services
                .render_prompt(&args.id, &arguments, &ctx)
                .map_err(McpError::from)?,
            None => {
                let record = self
                    .services
                    .get_record(&args.id, &ctx)
                    .map_err(McpError::from)?;
                self.format_record(&record)
            }
        };
        Ok(text_content(text))
    }
}
