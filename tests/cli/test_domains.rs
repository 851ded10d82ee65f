//! Tests for the domain commands

use super::test_helpers::{seeded, seeded_team_a, FORMATS};
use crate::common::{create_test_services, TeamFixture};
use quiver::cli::commands::domain::{
    self, ArchiveArgs, CreateArgs, DeleteArgs, DomainListResponse, ListArgs, StatsArgs,
    SwitchArgs,
};
use quiver::cli::OutputFormat;
use quiver::core::domain::DomainContext;

#[tokio::test]
async fn test_create_nested_domain() {
    let services = create_test_services();
    let parent = CreateArgs {
        id: "platform".to_string(),
        name: Some("Platform".to_string()),
        ..CreateArgs::default()
    };
    domain::execute_create(parent, &services, OutputFormat::Human)
        .await
        .unwrap();

    let child = CreateArgs {
        id: "platform-infra".to_string(),
        parent: Some("platform".to_string()),
        ..CreateArgs::default()
    };
    domain::execute_create(child, &services, OutputFormat::Json)
        .await
        .unwrap();

    let created = services.registry.get("platform-infra").unwrap();
    assert_eq!(created.path, "platform/platform-infra");
    assert_eq!(created.display_name, "platform-infra");
    assert_eq!(created.parent_id.as_deref(), Some("platform"));
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let services = create_test_services();
    let bad_id = CreateArgs {
        id: "Bad Id".to_string(),
        ..CreateArgs::default()
    };
    assert!(domain::execute_create(bad_id, &services, OutputFormat::Human)
        .await
        .is_err());

    let orphan = CreateArgs {
        id: "orphan".to_string(),
        parent: Some("missing".to_string()),
        ..CreateArgs::default()
    };
    assert!(domain::execute_create(orphan, &services, OutputFormat::Human)
        .await
        .is_err());
}

#[tokio::test]
async fn test_list_marks_current_and_filters_archived() {
    let (services, ctx) = seeded_team_a();
    services.archive_domain(TeamFixture::TEAM_B).unwrap();

    let all = services.list_domains(None).unwrap();
    let response = DomainListResponse::build(all.clone(), ctx.current(), false);
    assert_eq!(response.count, 4);
    assert_eq!(response.current, TeamFixture::TEAM_A);
    let current: Vec<&str> = response
        .domains
        .iter()
        .filter(|d| d.current)
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(current, vec![TeamFixture::TEAM_A]);

    let active = DomainListResponse::build(all, ctx.current(), true);
    assert_eq!(active.count, 3);
    assert!(active.domains.iter().all(|d| d.id != TeamFixture::TEAM_B));

    for format in FORMATS {
        let args = ListArgs {
            parent: Some(TeamFixture::TEAM_A.to_string()),
            active_only: false,
        };
        assert!(domain::execute_list(args, &services, &ctx, format).await.is_ok());
    }
}

#[tokio::test]
async fn test_switch_and_archive() {
    let (services, _) = seeded_team_a();
    for format in FORMATS {
        let args = SwitchArgs {
            id: TeamFixture::BACKEND.to_string(),
        };
        assert!(domain::execute_switch(args, &services, format).await.is_ok());
    }

    let archive = ArchiveArgs {
        id: TeamFixture::BACKEND.to_string(),
    };
    domain::execute_archive(archive, &services, OutputFormat::Json)
        .await
        .unwrap();
    assert!(!services.registry.get(TeamFixture::BACKEND).unwrap().active);

    let switch = SwitchArgs {
        id: TeamFixture::BACKEND.to_string(),
    };
    assert!(domain::execute_switch(switch, &services, OutputFormat::Human)
        .await
        .is_err());

    let protected = ArchiveArgs {
        id: "default".to_string(),
    };
    assert!(domain::execute_archive(protected, &services, OutputFormat::Human)
        .await
        .is_err());
}

#[tokio::test]
async fn test_delete_requires_cascade_for_parents() {
    let (services, _) = seeded_team_a();
    let plain = DeleteArgs {
        id: TeamFixture::TEAM_A.to_string(),
        cascade: false,
        force: true,
    };
    assert!(domain::execute_delete(plain, &services, OutputFormat::Human)
        .await
        .is_err());
    assert!(services.registry.exists(TeamFixture::BACKEND));

    let cascade = DeleteArgs {
        id: TeamFixture::TEAM_A.to_string(),
        cascade: true,
        force: true,
    };
    domain::execute_delete(cascade, &services, OutputFormat::Json)
        .await
        .unwrap();
    assert!(!services.registry.exists(TeamFixture::TEAM_A));
    assert!(!services.registry.exists(TeamFixture::BACKEND));
    assert!(services.get_record("team-a:ui-guide", &DomainContext::default()).is_err());
}

#[tokio::test]
async fn test_stats_defaults_to_current_domain() {
    let (services, ctx) = seeded(TeamFixture::TEAM_A);
    let stats = services.domain_stats(ctx.current()).unwrap();
    assert_eq!(stats.resources, 1);
    assert_eq!(stats.prompts, 1);
    assert_eq!(stats.children, 1);

    for format in FORMATS {
        let args = StatsArgs { id: None };
        assert!(domain::execute_stats(args, &services, &ctx, format).await.is_ok());
    }

    let missing = StatsArgs {
        id: Some("nowhere".to_string()),
    };
    assert!(domain::execute_stats(missing, &services, &ctx, OutputFormat::Human)
        .await
        .is_err());
}
