//! Archive domain tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct ArchiveDomainHandler {
    services: Arc<Services>,
}

impl ArchiveDomainHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveDomainArgs {
    id: String,
}

#[async_trait]
impl McpToolHandler for ArchiveDomainHandler {
    fn name(&self) -> &str {
        "archive_domain"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "archive_domain".to_string(),
            description: "Deactivate a domain. Its records stay searchable but no new \
                         records can be written to it. The default domain cannot be archived."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"}
                },
                "required": ["id"]
            }),
        }
    }

    async fn execute(&self, args: Value, _session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: ArchiveDomainArgs = parse_args(args)?;
        let domain = self
            .services
            .archive_domain(&args.id)
            .map_err(McpError::from)?;
        Ok(text_content(format!(
            "Archived domain `{}` ({})\n",
            domain.id, domain.path
        )))
    }
}
