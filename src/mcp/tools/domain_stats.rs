//! Domain stats tool handler

use super::handler::{parse_args, text_content, McpToolHandler};
use crate::core::services::Services;
use crate::core::types::DomainStats;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct DomainStatsHandler {
    services: Arc<Services>,
}

impl DomainStatsHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    fn format_stats(&self, stats: &DomainStats) -> String {
        let mut output = format!("# Domain: {}\n\n", stats.domain);
        output.push_str(&format!("- **Path:** {}\n", stats.path));
        output.push_str(&format!(
            "- **Status:** {}\n",
            if stats.active { "active" } else { "archived" }
        ));
        output.push_str(&format!("- **Resources:** {}\n", stats.resources));
        output.push_str(&format!("- **Prompts:** {}\n", stats.prompts));
        output.push_str(&format!("- **Children:** {}\n", stats.children));
        output.push_str(&format!("- **Descendants:** {}\n", stats.descendants));
        output.push_str(&format!("- **Searchable domains:** {}\n", stats.scope_size));
        output
    }
}

#[derive(Debug, Deserialize)]
struct DomainStatsArgs {
    #[serde(default)]
    id: Option<String>,
}

#[async_trait]
impl McpToolHandler for DomainStatsHandler {
    fn name(&self) -> &str {
        "domain_stats"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "domain_stats".to_string(),
            description: "Record counts and hierarchy size for a domain (the current \
                         domain when id is omitted)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"}
                },
                "required": []
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: DomainStatsArgs = parse_args(args)?;
        let id = args.id.unwrap_or_else(|| session.current());
        let stats = self.services.domain_stats(&id).map_err(McpError::from)?;
        Ok(text_content(self.format_stats(&stats)))
    }
}
