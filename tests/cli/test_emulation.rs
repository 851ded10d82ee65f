//! Tests for the grep, find and ripgrep commands

use super::test_helpers::{seeded_team_a, FORMATS};
use crate::common::TeamFixture;
use quiver::cli::commands::{find, grep, ripgrep, FindArgs, GrepArgs, RipgrepArgs};
use quiver::core::types::LineScanOutput;

#[tokio::test]
async fn test_grep_both_formats() {
    let (services, ctx) = seeded_team_a();
    for format in FORMATS {
        let args = GrepArgs {
            pattern: "deploy".to_string(),
            ..GrepArgs::default()
        };
        assert!(grep::execute(args, &services, &ctx, format).await.is_ok());
    }
}

#[tokio::test]
async fn test_grep_count_over_current_scope() {
    let (services, ctx) = seeded_team_a();
    let args = GrepArgs {
        pattern: "deploy".to_string(),
        count: true,
        ..GrepArgs::default()
    };

    let response = services.grep(&args.to_options(), &ctx).unwrap();
    let LineScanOutput::Count { total, per_record } = &response.output else {
        panic!("expected count output");
    };
    assert_eq!(*total, 3);
    assert_eq!(per_record.get("team-a:ui-guide"), Some(&1));
    assert_eq!(per_record.get("team-a-backend:api-runbook"), Some(&1));
    assert!(!per_record.contains_key("team-b:etl-notes"));

    for format in FORMATS {
        let args = GrepArgs {
            pattern: "deploy".to_string(),
            count: true,
            ..GrepArgs::default()
        };
        assert!(grep::execute(args, &services, &ctx, format).await.is_ok());
    }
}

#[tokio::test]
async fn test_grep_context_and_explicit_domains() {
    let (services, ctx) = seeded_team_a();
    let args = GrepArgs {
        pattern: "Deploy".to_string(),
        context: 1,
        domains: vec![TeamFixture::TEAM_B.to_string()],
        ..GrepArgs::default()
    };
    let response = services.grep(&args.to_options(), &ctx).unwrap();
    assert_eq!(response.match_total(), 1);
    assert!(grep::execute(args, &services, &ctx, FORMATS[0]).await.is_ok());
}

#[tokio::test]
async fn test_grep_invalid_extended_pattern() {
    let (services, ctx) = seeded_team_a();
    let args = GrepArgs {
        pattern: "(deploy".to_string(),
        extended_regexp: true,
        ..GrepArgs::default()
    };
    assert!(grep::execute(args, &services, &ctx, FORMATS[1]).await.is_err());
}

#[tokio::test]
async fn test_find_paths_and_table() {
    let (services, ctx) = seeded_team_a();
    for paths in [false, true] {
        for format in FORMATS {
            let args = FindArgs {
                name: Some("guide".to_string()),
                paths,
                ..FindArgs::default()
            };
            assert!(find::execute(args, &services, &ctx, format).await.is_ok());
        }
    }

    let args = FindArgs {
        name: Some("guide".to_string()),
        ..FindArgs::default()
    };
    let response = services.find(&args.to_options(), &ctx).unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].shorthand, "team-a:ui-guide");
    assert!(response.results[0]
        .virtual_path
        .ends_with("/resources/ui-guide"));
}

#[tokio::test]
async fn test_find_rejects_bad_size() {
    let (services, ctx) = seeded_team_a();
    let args = FindArgs {
        size: Some("+lots".to_string()),
        ..FindArgs::default()
    };
    assert!(find::execute(args, &services, &ctx, FORMATS[0]).await.is_err());
}

#[tokio::test]
async fn test_ripgrep_files_with_matches() {
    let (services, ctx) = seeded_team_a();
    let args = RipgrepArgs {
        pattern: "deploy".to_string(),
        files_with_matches: true,
        glob: Some("*runbook*".to_string()),
        ..RipgrepArgs::default()
    };
    let response = services.ripgrep(&args.to_options(), &ctx).unwrap();
    let LineScanOutput::Files { files } = &response.output else {
        panic!("expected files output");
    };
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].shorthand, "team-a-backend:api-runbook");

    for format in FORMATS {
        let args = RipgrepArgs {
            pattern: "deploy".to_string(),
            files_with_matches: true,
            ..RipgrepArgs::default()
        };
        assert!(ripgrep::execute(args, &services, &ctx, format).await.is_ok());
    }
}

#[tokio::test]
async fn test_ripgrep_count_conflicts_with_files() {
    let (services, ctx) = seeded_team_a();
    let args = RipgrepArgs {
        pattern: "deploy".to_string(),
        count: true,
        files_with_matches: true,
        ..RipgrepArgs::default()
    };
    assert!(ripgrep::execute(args, &services, &ctx, FORMATS[0]).await.is_err());
}
