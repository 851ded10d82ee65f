//! Shorthand tool handler
//!
//! Resolves a token into (domain, local id), or builds a token from
//! its parts.

use super::handler::{parse_args, text_content, McpToolHandler};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct ShorthandHandler {
    services: Arc<Services>,
}

impl ShorthandHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShorthandArgs {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    local_id: Option<String>,
}

#[async_trait]
impl McpToolHandler for ShorthandHandler {
    fn name(&self) -> &str {
        "shorthand"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "shorthand".to_string(),
            description: "Resolve a record token (`::id`, `domain:id` or a bare id in the \
                         current domain) into its domain and local id, or build a token \
                         from domain and localId."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "token": {"type": "string", "description": "Token to resolve"},
                    "domain": {"type": "string", "description": "Domain to build a token for"},
                    "localId": {"type": "string", "description": "Local id to build a token for"}
                },
                "required": []
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: ShorthandArgs = parse_args(args)?;
        let ctx = session.context();

        let text = match (args.token, args.local_id) {
            (Some(token), None) => {
                let resolved = self
                    .services
                    .resolve_shorthand(&token, &ctx)
                    .map_err(McpError::from)?;
                format!(
                    "`{token}` -> domain `{}`, local id `{}`\n",
                    resolved.domain, resolved.local_id
                )
            }
            (None, Some(local_id)) => {
                let domain = args.domain.unwrap_or_else(|| ctx.current().to_string());
                let token = self
                    .services
                    .build_shorthand(&domain, &local_id)
                    .map_err(McpError::from)?;
                format!("(`{domain}`, `{local_id}`) -> `{token}`\n")
            }
            _ => {
                return Err(McpError::InvalidParams(
                    "pass either token or localId".to_string(),
                ))
            }
        };
        Ok(text_content(text))
    }
}
