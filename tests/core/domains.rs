// Integration tests for the domain graph and isolation scopes

use crate::common::{create_test_services, ids, seed_teams, TeamFixture};
use quiver::core::domain::{DomainContext, IsolationMode};
use quiver::core::error::QuiverError;
use quiver::core::services::ResourceInput;
use quiver::core::types::SearchQuerySpec;

#[test]
fn test_paths_follow_parents() {
    let services = create_test_services();
    seed_teams(&services);

    let backend = services.registry.get(TeamFixture::BACKEND).unwrap();
    assert_eq!(backend.path, "team-a/team-a-backend");
    assert_eq!(backend.parent_id.as_deref(), Some("team-a"));

    let children = services.list_domains(Some(TeamFixture::TEAM_A)).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, TeamFixture::BACKEND);

    // default + three team domains
    assert_eq!(services.list_domains(None).unwrap().len(), 4);
}

#[test]
fn test_create_rejects_bad_input() {
    let services = create_test_services();
    seed_teams(&services);

    assert!(matches!(
        services.create_domain("Team-C", "", "", None),
        Err(QuiverError::InvalidDomainId(_))
    ));
    assert!(matches!(
        services.create_domain("team-a", "", "", None),
        Err(QuiverError::DomainAlreadyExists(_))
    ));
    assert!(matches!(
        services.create_domain("team-c", "", "", Some("nowhere")),
        Err(QuiverError::ParentDomainNotFound(_))
    ));
}

#[test]
fn test_searchable_scope_per_mode() {
    let services = create_test_services();
    seed_teams(&services);

    let scope = |id: &str, mode| -> Vec<String> {
        services
            .registry
            .searchable_scope(id, mode)
            .unwrap()
            .into_iter()
            .collect()
    };

    assert_eq!(scope("team-a", IsolationMode::Strict), vec!["team-a"]);
    assert_eq!(
        scope("team-a", IsolationMode::Hierarchical),
        vec!["team-a", "team-a-backend"]
    );
    // Ancestors are visible from below
    assert_eq!(
        scope("team-a-backend", IsolationMode::Hierarchical),
        vec!["team-a", "team-a-backend"]
    );
    assert_eq!(scope("team-b", IsolationMode::Shared).len(), 4);
}

#[test]
fn test_search_respects_team_isolation() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::new(TeamFixture::TEAM_A);
    let spec = SearchQuerySpec::text("deploy");

    let hierarchical = ids(&services.search(&spec, &ctx, None).unwrap());
    assert!(hierarchical.contains(&"team-a:ui-guide".to_string()));
    assert!(hierarchical.contains(&"team-a-backend:api-runbook".to_string()));
    assert!(!hierarchical.contains(&"team-b:etl-notes".to_string()));
    assert!(!hierarchical.contains(&"::handbook".to_string()));

    let strict = ids(
        &services
            .search(&spec, &ctx, Some(IsolationMode::Strict))
            .unwrap(),
    );
    assert!(strict.iter().all(|id| id.starts_with("team-a:")));
    assert!(!strict.is_empty());

    let shared = ids(
        &services
            .search(&spec, &ctx, Some(IsolationMode::Shared))
            .unwrap(),
    );
    assert!(shared.contains(&"team-b:etl-notes".to_string()));
    assert!(shared.contains(&"::handbook".to_string()));
}

#[test]
fn test_switch_and_archive_rules() {
    let services = create_test_services();
    seed_teams(&services);

    let ctx = services.switch_domain(TeamFixture::TEAM_B).unwrap();
    assert_eq!(ctx.current(), "team-b");

    let archived = services.archive_domain(TeamFixture::TEAM_B).unwrap();
    assert!(!archived.active);

    let err = services.switch_domain(TeamFixture::TEAM_B).unwrap_err();
    assert!(err.to_string().contains("archived"));

    // Archived domains are read-only but still searchable
    let late = ResourceInput {
        id: "late".to_string(),
        content: "too late".to_string(),
        ..ResourceInput::default()
    };
    assert!(services
        .put_resource(late, &DomainContext::new(TeamFixture::TEAM_B))
        .is_err());
    let shared = ids(
        &services
            .search(
                &SearchQuerySpec::text("scheduler"),
                &DomainContext::default(),
                Some(IsolationMode::Shared),
            )
            .unwrap(),
    );
    assert_eq!(shared, vec!["team-b:etl-notes"]);

    assert!(matches!(
        services.archive_domain("default"),
        Err(QuiverError::ProtectedDomain(_))
    ));
    assert!(matches!(
        services.switch_domain("missing"),
        Err(QuiverError::DomainNotFound(_))
    ));
}

#[test]
fn test_delete_requires_cascade_for_children() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::default();

    assert!(matches!(
        services.delete_domain(TeamFixture::TEAM_A, false),
        Err(QuiverError::DomainHasChildren(_))
    ));

    let removed = services.delete_domain(TeamFixture::TEAM_A, true).unwrap();
    assert_eq!(removed, vec!["team-a-backend", "team-a"]);

    assert!(!services.registry.exists(TeamFixture::BACKEND));
    assert!(services
        .get_record("team-a:ui-guide", &ctx)
        .unwrap_err()
        .is_not_found());

    let shared = ids(
        &services
            .search(
                &SearchQuerySpec::text("deploy"),
                &ctx,
                Some(IsolationMode::Shared),
            )
            .unwrap(),
    );
    assert!(shared.iter().all(|id| !id.starts_with("team-a")));

    assert!(matches!(
        services.delete_domain("default", true),
        Err(QuiverError::ProtectedDomain(_))
    ));
}

#[test]
fn test_leaf_delete_without_cascade() {
    let services = create_test_services();
    seed_teams(&services);

    let removed = services.delete_domain(TeamFixture::BACKEND, false).unwrap();
    assert_eq!(removed, vec!["team-a-backend"]);
    assert!(services.registry.exists(TeamFixture::TEAM_A));
}

#[test]
fn test_refused_delete_keeps_records() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::default();

    assert!(services.delete_domain(TeamFixture::TEAM_A, false).is_err());
    assert!(services.registry.exists(TeamFixture::TEAM_A));
    assert!(services.get_record("team-a:ui-guide", &ctx).is_ok());
    assert!(services
        .get_record("team-a-backend:api-runbook", &ctx)
        .is_ok());

    services.delete_domain(TeamFixture::BACKEND, false).unwrap();
    assert!(services
        .get_record("team-a-backend:api-runbook", &ctx)
        .unwrap_err()
        .is_not_found());
    let stats = services.domain_stats(TeamFixture::TEAM_A).unwrap();
    assert_eq!(stats.resources, 1);
    assert_eq!(stats.descendants, 0);
}

#[test]
fn test_domain_stats() {
    let services = create_test_services();
    seed_teams(&services);

    let stats = services.domain_stats(TeamFixture::TEAM_A).unwrap();
    assert_eq!(stats.resources, 1);
    assert_eq!(stats.prompts, 1);
    assert_eq!(stats.children, 1);
    assert_eq!(stats.descendants, 1);
    assert_eq!(stats.scope_size, 2);
    assert!(stats.active);
}

#[test]
fn test_shorthand_round_trip() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::new(TeamFixture::TEAM_A);

    for (domain, local) in [("default", "handbook"), ("team-a-backend", "api-runbook")] {
        let token = services.build_shorthand(domain, local).unwrap();
        let resolved = services.resolve_shorthand(&token, &ctx).unwrap();
        assert_eq!(resolved.domain, domain);
        assert_eq!(resolved.local_id, local);
    }

    assert_eq!(services.build_shorthand("default", "x").unwrap(), "::x");

    let bare = services.resolve_shorthand("ui-guide", &ctx).unwrap();
    assert_eq!(bare.domain, "team-a");

    let legacy = services
        .resolve_shorthand("domain:team-b:etl-notes", &ctx)
        .unwrap();
    assert_eq!(legacy.domain, "team-b");
    assert_eq!(legacy.local_id, "etl-notes");

    let record = services.get_record("team-a-backend:api-runbook", &ctx).unwrap();
    assert_eq!(record.name(), "API runbook");
}
