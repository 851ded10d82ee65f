//! List domains tool handler
//!
//! Pages through the registry with opaque cursors; a cursor issued
//! before the domain set changed is rejected.

use super::handler::{parse_args, text_content, McpToolHandler};
use crate::core::domain::Domain;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::pagination::DomainCursor;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use crate::mcp::session::SessionContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 500;

pub struct ListDomainsHandler {
    services: Arc<Services>,
}

impl ListDomainsHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    fn format_page(&self, page: &[Domain], current: &str, total: usize, next: Option<String>) -> String {
        let mut output = format!("# Domains ({total} total)\n\n");
        output.push_str("| Id | Name | Path | Status |\n");
        output.push_str("|----|------|------|--------|\n");
        for domain in page {
            let marker = if domain.id == current { " (current)" } else { "" };
            let status = if domain.active { "active" } else { "archived" };
            output.push_str(&format!(
                "| `{}`{marker} | {} | {} | {status} |\n",
                domain.id, domain.display_name, domain.path
            ));
        }
        if let Some(cursor) = next {
            output.push_str(&format!("\n**Next cursor:** `{cursor}`\n"));
        }
        output
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDomainsArgs {
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    cursor: Option<String>,
}

#[async_trait]
impl McpToolHandler for ListDomainsHandler {
    fn name(&self) -> &str {
        "list_domains"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_domains".to_string(),
            description: "List domains ordered by path, or only the direct children of \
                         parentId. Paginated: pass the returned cursor to get the next page."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "parentId": {"type": "string"},
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_PAGE_SIZE,
                        "default": DEFAULT_PAGE_SIZE
                    },
                    "cursor": {"type": "string", "description": "Opaque cursor from a previous page"}
                },
                "required": []
            }),
        }
    }

    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult, McpError> {
        let args: ListDomainsArgs = parse_args(args)?;
        let fingerprint = self
            .services
            .registry
            .fingerprint()
            .map_err(McpError::from)?;

        let offset = match args.cursor.as_deref().filter(|c| !c.is_empty()) {
            Some(encoded) => {
                let cursor = DomainCursor::decode(encoded).map_err(McpError::InvalidParams)?;
                cursor.verify(&fingerprint).map_err(McpError::InvalidParams)?;
                cursor.offset
            }
            None => 0,
        };

        let mut domains = self
            .services
            .list_domains(args.parent_id.as_deref())
            .map_err(McpError::from)?;
        domains.sort_by(|a, b| a.path.cmp(&b.path));

        let limit = args.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let total = domains.len();
        let end = offset.saturating_add(limit).min(total);
        let page = domains.get(offset.min(total)..end).unwrap_or(&[]);
        let next = (end < total).then(|| DomainCursor::new(end, fingerprint).encode());

        Ok(text_content(self.format_page(
            page,
            &session.current(),
            total,
            next,
        )))
    }
}
