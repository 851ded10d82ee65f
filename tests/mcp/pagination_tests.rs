//! list_domains pagination tests

#[cfg(test)]
mod tests {
    use crate::common::create_test_services;
    use quiver::mcp::handlers::ProtocolHandlers;
    use quiver::mcp::pagination::DomainCursor;
    use quiver::mcp::protocol::*;
    use serde_json::{json, Value};

    async fn list(handlers: &ProtocolHandlers, arguments: Value) -> JsonRpcResponse {
        handlers
            .handle_tools_call(JsonRpcRequest {
                jsonrpc: "2.0".to_string(),
                id: Some(json!(1)),
                method: "tools/call".to_string(),
                params: Some(json!({"name": "list_domains", "arguments": arguments})),
            })
            .await
            .unwrap()
    }

    fn text(response: &JsonRpcResponse) -> String {
        response.result.as_ref().unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn next_cursor(text: &str) -> Option<String> {
        let marker = "**Next cursor:** `";
        let start = text.find(marker)? + marker.len();
        let end = text[start..].find('`')? + start;
        Some(text[start..end].to_string())
    }

    fn setup(count: usize) -> ProtocolHandlers {
        let services = create_test_services();
        for i in 0..count {
            services
                .create_domain(&format!("team-{i:02}"), "", "", None)
                .unwrap();
        }
        ProtocolHandlers::new(services)
    }

    #[tokio::test]
    async fn test_walk_all_pages() {
        let handlers = setup(11);
        let mut seen = 0;
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            let mut args = json!({"limit": 5});
            if let Some(c) = &cursor {
                args["cursor"] = json!(c);
            }
            let page = text(&list(&handlers, args).await);
            assert!(page.contains("12 total"));
            seen += page.lines().filter(|l| l.starts_with("| `")).count();
            pages += 1;
            cursor = next_cursor(&page);
            if cursor.is_none() {
                break;
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(seen, 12);
    }

    #[tokio::test]
    async fn test_invalid_cursor_rejected() {
        let handlers = setup(2);
        let response = list(&handlers, json!({"cursor": "%%%"})).await;
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);

        let foreign = DomainCursor::new(1, "0-0").encode();
        let response = list(&handlers, json!({"cursor": foreign})).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert!(error.message.contains("stale"));
    }

    #[tokio::test]
    async fn test_last_page_has_no_cursor() {
        let handlers = setup(1);
        let page = text(&list(&handlers, json!({})).await);
        assert!(page.contains("2 total"));
        assert!(next_cursor(&page).is_none());
    }
}
