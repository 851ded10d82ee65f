//! Create domain tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct CreateDomainHandler {
    services: Arc<Services>,
}

impl CreateDomainHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDomainArgs {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    parent_id: Option<String>,
}

#[async_trait]
impl McpToolHandler for CreateDomainHandler {
    fn name(&self) -> &str {
        "create_domain"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "create_domain".to_string(),
            description: "Create a domain, optionally nested under a parent. Ids are 2-64 \
                         lowercase alphanumerics, '-' or '_'."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "pattern": "^[a-z0-9][a-z0-9_-]*[a-z0-9]$"},
                    "name": {"type": "string", "description": "Display name (defaults to the id)"},
                    "description": {"type": "string"},
                    "parentId": {"type": "string"}
                },
                "required": ["id"]
            }),
        }
    }

    async fn execute(&self, args: Value, _session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: CreateDomainArgs = parse_args(args)?;
        let domain = self
            .services
            .create_domain(
                &args.id,
                &args.name,
                &args.description,
                args.parent_id.as_deref(),
            )
            .map_err(McpError::from)?;

        let mut text = format!("Created domain `{}` ({})\n", domain.id, domain.display_name);
        text.push_str(&format!("**Path:** {}\n", domain.path));
        if let Some(parent) = &domain.parent_id {
            text.push_str(&format!("**Parent:** {parent}\n"));
        }
        Ok(text_content(text))
    }
}
