//! Delete domain tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

pub struct DeleteDomainHandler {
    services: Arc<Services>,
}

impl DeleteDomainHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteDomainArgs {
    id: String,
    #[serde(default)]
    cascade: bool,
}

#[async_trait]
impl McpToolHandler for DeleteDomainHandler {
    fn name(&self) -> &str {
        "delete_domain"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "delete_domain".to_string(),
            description: "Permanently delete a domain and every record stored in it. \
                         Domains with children require cascade, which removes the whole \
                         subtree deepest first. The default domain cannot be deleted."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "cascade": {"type": "boolean", "default": false}
                },
                "required": ["id"]
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: DeleteDomainArgs = parse_args(args)?;
        let removed = self
            .services
            .delete_domain(&args.id, args.cascade)
            .map_err(McpError::from)?;

        let mut text = format!("Deleted {} domain(s): {}\n", removed.len(), removed.join(", "));
        let current = session.current();
        if removed.contains(&current) {
            session.set(self.services.default_context());
            info!(domain = %current, "Session domain deleted, reset to default");
            text.push_str(&format!(
                "Current domain reset to `{}`\n",
                self.services.config.domains.default_domain
            ));
        }
        Ok(text_content(text))
    }
}
