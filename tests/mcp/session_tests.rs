//! Per-connection domain sessions

#[cfg(test)]
mod tests {
    use crate::common::{create_test_services, seed_teams};
    use quiver::mcp::handlers::ProtocolHandlers;
    use quiver::mcp::protocol::*;
    use serde_json::{json, Value};

    async fn call(handlers: &ProtocolHandlers, name: &str, arguments: Value) -> JsonRpcResponse {
        handlers
            .handle_tools_call(JsonRpcRequest {
                jsonrpc: "2.0".to_string(),
                id: Some(json!(1)),
                method: "tools/call".to_string(),
                params: Some(json!({"name": name, "arguments": arguments})),
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

    #[tokio::test]
    async fn test_switch_is_per_connection() {
        let services = create_test_services();
        seed_teams(&services);
        let first = ProtocolHandlers::new(services.clone());
        let second = ProtocolHandlers::new(services);

        let switched = call(&first, "switch_domain", json!({"id": "team-a"})).await;
        let message = text(&switched);
        assert!(message.contains("`default` -> `team-a`"));
        assert!(message.contains("team-a, team-a-backend"));

        assert_eq!(first.session().current(), "team-a");
        assert_eq!(second.session().current(), "default");

        // Bare ids resolve against each connection's own domain
        let found = call(&first, "get_record", json!({"id": "ui-guide"})).await;
        assert!(found.error.is_none());
        let missing = call(&second, "get_record", json!({"id": "ui-guide"})).await;
        assert_eq!(missing.error.unwrap().code, NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_follows_session_scope() {
        let services = create_test_services();
        seed_teams(&services);
        let handlers = ProtocolHandlers::new(services);

        let before = call(&handlers, "search", json!({"query": "latency"})).await;
        assert!(!text(&before).contains("api-runbook"));

        call(&handlers, "switch_domain", json!({"id": "team-a-backend"})).await;
        let after = call(&handlers, "search", json!({"query": "latency"})).await;
        assert!(text(&after).contains("`team-a-backend:api-runbook`"));
    }

    #[tokio::test]
    async fn test_switch_to_archived_fails_and_keeps_domain() {
        let services = create_test_services();
        seed_teams(&services);
        services.archive_domain("team-b").unwrap();
        let handlers = ProtocolHandlers::new(services);

        let response = call(&handlers, "switch_domain", json!({"id": "team-b"})).await;
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
        assert_eq!(handlers.session().current(), "default");
    }
}
