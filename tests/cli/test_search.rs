//! Tests for the search and advanced-search commands

use super::test_helpers::{seeded, seeded_team_a, FORMATS};
use crate::common::TeamFixture;
use quiver::cli::commands::search::{self, AdvancedSearchArgs, SearchArgs, SearchOutput};
use quiver::core::domain::IsolationMode;
use quiver::core::types::{SearchMode, SearchQuerySpec, SortBy, SortOrder};

fn search_args(query: &str) -> SearchArgs {
    SearchArgs {
        query: query.to_string(),
        limit: None,
        isolation: None,
        ids_only: false,
    }
}

#[tokio::test]
async fn test_search_both_formats() {
    let (services, ctx) = seeded_team_a();
    for format in FORMATS {
        let result = search::execute(search_args("bundle"), &services, &ctx, format).await;
        assert!(result.is_ok(), "search failed: {result:?}");
    }
}

#[tokio::test]
async fn test_search_no_results_is_not_an_error() {
    let (services, ctx) = seeded(TeamFixture::BACKEND);
    for format in FORMATS {
        assert!(search::execute(search_args("zebra"), &services, &ctx, format)
            .await
            .is_ok());
    }
}

#[tokio::test]
async fn test_search_isolation_override_reaches_other_teams() {
    let (services, ctx) = seeded_team_a();
    let spec = SearchQuerySpec::text("etl");

    let hierarchical = services.search(&spec, &ctx, None).unwrap();
    assert!(hierarchical.results.is_empty());

    let shared = services
        .search(&spec, &ctx, Some(IsolationMode::Shared))
        .unwrap();
    let output = SearchOutput::from_response(shared, ctx.current(), false);
    assert_eq!(output.domain, TeamFixture::TEAM_A);
    assert_eq!(output.results[0].shorthand, "team-b:etl-notes");
    assert_eq!(output.results[0].rank, 1);
    assert!(output.results[0].snippet.is_some());

    let args = SearchArgs {
        isolation: Some(IsolationMode::Shared),
        ids_only: true,
        ..search_args("etl")
    };
    assert!(search::execute(args, &services, &ctx, FORMATS[0]).await.is_ok());
}

#[tokio::test]
async fn test_search_rejects_overlong_query() {
    let (services, ctx) = seeded_team_a();
    let args = search_args(&"a".repeat(1001));
    assert!(search::execute(args, &services, &ctx, FORMATS[1]).await.is_err());
}

#[tokio::test]
async fn test_advanced_search_with_context() {
    let (services, ctx) = seeded_team_a();
    let args = AdvancedSearchArgs {
        query: "deploy".to_string(),
        mode: SearchMode::Exact,
        domains: vec![TeamFixture::TEAM_A.to_string(), TeamFixture::BACKEND.to_string()],
        sort_by: SortBy::Title,
        sort_order: SortOrder::Asc,
        context: 1,
        ..AdvancedSearchArgs::default()
    };

    let response = services.advanced_search(&args.to_spec(), &ctx).unwrap();
    let output = SearchOutput::from_response(response, ctx.current(), false);
    assert!(!output.results.is_empty());
    assert!(output.results.iter().all(|r| !r.context.is_empty()));
    assert!(output.results[0].context.iter().any(|line| line.contains(':')));

    for format in FORMATS {
        let args = AdvancedSearchArgs {
            query: "deploy".to_string(),
            context: 1,
            ..AdvancedSearchArgs::default()
        };
        assert!(search::execute_advanced(args, &services, &ctx, format)
            .await
            .is_ok());
    }
}

#[tokio::test]
async fn test_advanced_search_invalid_regex() {
    let (services, ctx) = seeded_team_a();
    let args = AdvancedSearchArgs {
        query: "/(unclosed/".to_string(),
        mode: SearchMode::Regex,
        ..AdvancedSearchArgs::default()
    };
    assert!(search::execute_advanced(args, &services, &ctx, FORMATS[0])
        .await
        .is_err());
}

#[tokio::test]
async fn test_advanced_search_unknown_domain() {
    let (services, ctx) = seeded_team_a();
    let args = AdvancedSearchArgs {
        query: "deploy".to_string(),
        domains: vec!["nowhere".to_string()],
        ..AdvancedSearchArgs::default()
    };
    assert!(search::execute_advanced(args, &services, &ctx, FORMATS[1])
        .await
        .is_err());
}
