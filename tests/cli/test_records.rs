//! Tests for the record and shorthand commands

use super::test_helpers::{seeded, seeded_team_a, FORMATS};
use crate::common::TeamFixture;
use quiver::cli::commands::record::{self, AddPromptArgs, AddResourceArgs, DeleteArgs, GetArgs};
use quiver::cli::commands::shorthand::{self, ShorthandArgs};
use quiver::cli::OutputFormat;
use quiver::core::types::Record;
use std::collections::BTreeMap;

#[tokio::test]
async fn test_add_resource_in_current_domain() {
    let (services, ctx) = seeded(TeamFixture::TEAM_B);
    let args = AddResourceArgs {
        id: "schema".to_string(),
        name: Some("Warehouse schema".to_string()),
        content: Some("orders\ncustomers".to_string()),
        content_type: Some("text/markdown".to_string()),
        tags: vec!["data".to_string()],
        ..AddResourceArgs::default()
    };
    record::execute_add_resource(args, &services, &ctx, OutputFormat::Human)
        .await
        .unwrap();

    let stored = services.get_record("team-b:schema", &ctx).unwrap();
    assert_eq!(stored.name(), "Warehouse schema");
    assert_eq!(stored.content_type(), Some("text/markdown"));
    assert_eq!(stored.tags().to_vec(), vec!["data"]);
}

#[tokio::test]
async fn test_add_resource_into_archived_domain_fails() {
    let (services, ctx) = seeded_team_a();
    services.archive_domain(TeamFixture::TEAM_B).unwrap();
    let args = AddResourceArgs {
        id: "team-b:late".to_string(),
        content: Some("too late".to_string()),
        ..AddResourceArgs::default()
    };
    assert!(record::execute_add_resource(args, &services, &ctx, OutputFormat::Json)
        .await
        .is_err());
}

#[tokio::test]
async fn test_add_prompt_collects_variables() {
    let (services, ctx) = seeded_team_a();
    let args = AddPromptArgs {
        id: "summary".to_string(),
        template: Some("Summarise {{topic}} for {{audience}}".to_string()),
        ..AddPromptArgs::default()
    };
    record::execute_add_prompt(args, &services, &ctx, OutputFormat::Json)
        .await
        .unwrap();

    match services.get_record("summary", &ctx).unwrap() {
        Record::Prompt(prompt) => {
            assert_eq!(prompt.variables, vec!["topic", "audience"]);
        }
        other => panic!("expected prompt, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_record_renders_prompt() {
    let (services, ctx) = seeded_team_a();
    for format in FORMATS {
        let args = GetArgs {
            id: "review".to_string(),
            arguments: vec![
                ("file".to_string(), "lib.rs".to_string()),
                ("focus".to_string(), "safety".to_string()),
            ],
            raw: false,
        };
        assert!(record::execute_get(args, &services, &ctx, format).await.is_ok());
    }

    let rendered = services
        .render_prompt(
            "team-a:review",
            &BTreeMap::from([
                ("file".to_string(), "lib.rs".to_string()),
                ("focus".to_string(), "safety".to_string()),
            ]),
            &ctx,
        )
        .unwrap();
    assert_eq!(rendered, "Review lib.rs before we deploy, focus on safety");

    let missing = GetArgs {
        id: "review".to_string(),
        arguments: vec![("file".to_string(), "lib.rs".to_string())],
        raw: false,
    };
    assert!(record::execute_get(missing, &services, &ctx, OutputFormat::Human)
        .await
        .is_err());
}

#[tokio::test]
async fn test_get_record_views() {
    let (services, ctx) = seeded_team_a();
    for raw in [false, true] {
        for format in FORMATS {
            let args = GetArgs {
                id: "team-a-backend:api-runbook".to_string(),
                arguments: Vec::new(),
                raw,
            };
            assert!(record::execute_get(args, &services, &ctx, format).await.is_ok());
        }
    }

    let unknown = GetArgs {
        id: "ghost".to_string(),
        ..GetArgs::default()
    };
    assert!(record::execute_get(unknown, &services, &ctx, OutputFormat::Human)
        .await
        .is_err());
}

#[tokio::test]
async fn test_delete_record_by_default_token() {
    let (services, ctx) = seeded_team_a();
    let args = DeleteArgs {
        id: "::handbook".to_string(),
    };
    record::execute_delete(args, &services, &ctx, OutputFormat::Json)
        .await
        .unwrap();
    assert!(services.get_record("::handbook", &ctx).is_err());
    assert_eq!(services.domain_stats("default").unwrap().resources, 0);
}

#[tokio::test]
async fn test_shorthand_command() {
    let (services, ctx) = seeded_team_a();
    let args = ShorthandArgs {
        token: Some("ui-guide".to_string()),
        ..ShorthandArgs::default()
    };
    let output = shorthand::shorthand(&args, &services, &ctx).unwrap();
    assert_eq!(output.token, "team-a:ui-guide");
    assert_eq!(output.domain, TeamFixture::TEAM_A);
    assert_eq!(output.local_id, "ui-guide");

    let build = ShorthandArgs {
        local_id: Some("handbook".to_string()),
        of_domain: Some("default".to_string()),
        ..ShorthandArgs::default()
    };
    assert_eq!(shorthand::shorthand(&build, &services, &ctx).unwrap().token, "::handbook");

    for format in FORMATS {
        let args = ShorthandArgs {
            token: Some("team-b:etl-notes".to_string()),
            ..ShorthandArgs::default()
        };
        assert!(shorthand::execute(args, &services, &ctx, format).await.is_ok());
    }
}
