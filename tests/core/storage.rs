// Integration tests for persistence and malformed record handling

use crate::common::{create_persistent_services, put_prompt, put_resource, seed_teams};
use quiver::core::domain::DomainContext;
use quiver::core::emulation::{FindOptions, GrepOptions};
use quiver::core::types::SearchQuerySpec;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tempfile::TempDir;

#[test]
fn test_catalog_survives_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let services = create_persistent_services(temp.path());
        seed_teams(&services);
        services.archive_domain("team-b").unwrap();
    }

    assert!(temp.path().join("domains.json").exists());
    assert!(temp.path().join("records.json").exists());

    let services = create_persistent_services(temp.path());
    let ctx = DomainContext::new("team-a");

    let backend = services.registry.get("team-a-backend").unwrap();
    assert_eq!(backend.path, "team-a/team-a-backend");
    assert!(!services.registry.get("team-b").unwrap().active);

    // The index is rebuilt from the store on open
    let response = services
        .search(&SearchQuerySpec::text("latency"), &ctx, None)
        .unwrap();
    assert_eq!(response.results[0].shorthand, "team-a-backend:api-runbook");

    let rendered = services
        .render_prompt(
            "review",
            &BTreeMap::from([
                ("file".to_string(), "main.rs".to_string()),
                ("focus".to_string(), "errors".to_string()),
            ]),
            &ctx,
        )
        .unwrap();
    assert_eq!(
        rendered,
        "Review main.rs before we deploy, focus on errors"
    );
}

#[test]
fn test_replace_keeps_created_at() {
    let temp = TempDir::new().unwrap();
    let services = create_persistent_services(temp.path());

    let first = put_resource(&services, "default", "notes", "Notes", "v1", &[]);
    let second = put_resource(&services, "default", "notes", "Notes", "v2", &[]);
    assert_eq!(first.created_at(), second.created_at());
    assert!(second.updated_at() >= first.updated_at());

    let stored = services
        .get_record("::notes", &DomainContext::default())
        .unwrap();
    assert_eq!(stored.body(), "v2");
    assert_eq!(services.store.len(), 1);
}

#[test]
fn test_malformed_entries_are_skipped_and_kept() {
    let temp = TempDir::new().unwrap();
    {
        let services = create_persistent_services(temp.path());
        put_resource(&services, "default", "good", "Good", "line with token", &[]);
        put_prompt(&services, "default", "ask", "Ask about {{topic}}");
    }

    let path = temp.path().join("records.json");
    let mut file: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    file["records"]
        .as_array_mut()
        .unwrap()
        .push(json!({"kind": "resource", "domain": "default", "id": "broken"}));
    std::fs::write(&path, serde_json::to_string_pretty(&file).unwrap()).unwrap();

    let services = create_persistent_services(temp.path());
    let ctx = DomainContext::default();

    assert_eq!(services.store.len(), 2);
    assert_eq!(services.store.malformed_in(None).unwrap().len(), 1);

    let grep = services.grep(&GrepOptions::new("token"), &ctx).unwrap();
    assert_eq!(grep.match_total(), 1);
    assert_eq!(grep.skipped, 1);

    let find = services.find(&FindOptions::default(), &ctx).unwrap();
    assert_eq!(find.results.len(), 2);
    assert_eq!(find.skipped, 1);

    let err = services.get_record("broken", &ctx).unwrap_err();
    assert!(err.to_string().contains("malformed"));
    assert!(!err.is_not_found());

    // Rewrites keep the malformed entry on disk
    put_resource(&services, "default", "more", "More", "text", &[]);
    let reread: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reread["records"].as_array().unwrap().len(), 4);
}

#[test]
fn test_delete_record_is_persisted() {
    let temp = TempDir::new().unwrap();
    {
        let services = create_persistent_services(temp.path());
        put_resource(&services, "default", "gone", "Gone", "soon", &[]);
        services
            .delete_record("::gone", &DomainContext::default())
            .unwrap();
    }

    let services = create_persistent_services(temp.path());
    assert!(services
        .get_record("::gone", &DomainContext::default())
        .unwrap_err()
        .is_not_found());
    assert_eq!(services.index.num_docs(), 0);
}
