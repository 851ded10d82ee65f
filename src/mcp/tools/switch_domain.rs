//! Switch domain tool handler
//!
//! Changes the current domain of this session only.

use super::handler::{parse_args, text_content, McpToolHandler};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct SwitchDomainHandler {
    services: Arc<Services>,
}

impl SwitchDomainHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[derive(Debug, Deserialize)]
struct SwitchDomainArgs {
    id: String,
}

#[async_trait]
impl McpToolHandler for SwitchDomainHandler {
    fn name(&self) -> &str {
        "switch_domain"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "switch_domain".to_string(),
            description: "Make a domain current for this session. Bare record ids and \
                         searches without explicit domains resolve against it. Other \
                         sessions are unaffected."
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

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: SwitchDomainArgs = parse_args(args)?;
        let previous = session.current();
        let ctx = self
            .services
            .switch_domain(&args.id)
            .map_err(McpError::from)?;
        let scope = self
            .services
            .registry
            .scope(ctx.current(), self.services.config.domains.isolation_mode)
            .map_err(McpError::from)?;
        session.set(ctx);

        let mut text = format!("Switched domain: `{previous}` -> `{}`\n", scope.current);
        let searchable: Vec<&str> = scope.searchable.iter().map(String::as_str).collect();
        text.push_str(&format!(
            "**Searchable scope ({}):** {}\n",
            self.services.config.domains.isolation_mode,
            searchable.join(", ")
        ));
        Ok(text_content(text))
    }
}
