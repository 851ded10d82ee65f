// Integration tests for ranked search

use crate::common::{create_test_services, ids, put_resource, seed_teams};
use quiver::core::domain::DomainContext;
use quiver::core::search::compiler::detect_mode;
use quiver::core::types::{LineKind, RecordKind, SearchMode, SearchQuerySpec, SortBy, SortOrder};

fn everywhere(raw: &str) -> SearchQuerySpec {
    SearchQuerySpec {
        raw_text: raw.to_string(),
        domains: ["default", "team-a", "team-a-backend", "team-b"]
            .iter()
            .map(|d| d.to_string())
            .collect(),
        ..SearchQuerySpec::default()
    }
}

#[test]
fn test_mode_detection_priority() {
    assert_eq!(detect_mode("deploy*"), SearchMode::Wildcard);
    assert_eq!(detect_mode("/dep.oy/"), SearchMode::Regex);
    assert_eq!(detect_mode("deplyo~"), SearchMode::Fuzzy);
    assert_eq!(
        detect_mode("how do we roll back deploys"),
        SearchMode::Semantic
    );
    assert_eq!(detect_mode("roll back deploys"), SearchMode::Smart);
    // Wildcard wins over regex delimiters
    assert_eq!(detect_mode("/dep*/"), SearchMode::Wildcard);
}

#[test]
fn test_result_shaping() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::new("team-a");

    let response = services
        .search(&SearchQuerySpec::text("bundle"), &ctx, None)
        .unwrap();
    assert_eq!(response.mode, SearchMode::Smart);
    assert_eq!(response.count, 1);
    assert_eq!(response.scope, vec!["team-a", "team-a-backend"]);

    let hit = &response.results[0];
    assert_eq!(hit.shorthand, "team-a:ui-guide");
    assert_eq!(hit.kind, RecordKind::Resource);
    assert_eq!(hit.match_count, 1);
    assert_eq!(hit.line_numbers, vec![1]);
    assert!(hit.snippet.contains("bundle"));
    assert!(hit.score > 0.0);
    assert_eq!(hit.field_match_counts["content"], 1);
}

#[test]
fn test_snippet_window_and_context_lines() {
    let services = create_test_services();
    let ctx = DomainContext::default();
    let filler = "lorem ipsum ".repeat(40);
    put_resource(
        &services,
        "default",
        "long",
        "Long note",
        &format!("{filler}\nthe needle is here\n{filler}"),
        &[],
    );

    let mut spec = SearchQuerySpec::text("needle");
    spec.snippet_length = 40;
    spec.context_lines = 1;
    let response = services.advanced_search(&spec, &ctx).unwrap();
    let hit = &response.results[0];

    assert!(hit.snippet.starts_with("..."));
    assert!(hit.snippet.ends_with("..."));
    assert!(hit.snippet.contains("needle"));
    assert_eq!(hit.snippet.chars().count(), 40 + 6);

    let kinds: Vec<(usize, LineKind)> = hit
        .context_lines
        .iter()
        .map(|l| (l.line_number, l.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (1, LineKind::Before),
            (2, LineKind::Match),
            (3, LineKind::After)
        ]
    );
}

#[test]
fn test_match_count_counts_every_occurrence() {
    let services = create_test_services();
    let ctx = DomainContext::default();
    put_resource(
        &services,
        "default",
        "echo",
        "Echo",
        "token token\nanother token\nnothing",
        &[],
    );

    let response = services
        .search(&SearchQuerySpec::text("token"), &ctx, None)
        .unwrap();
    assert_eq!(response.results[0].match_count, 3);
    assert_eq!(response.results[0].line_numbers, vec![1, 2]);
}

#[test]
fn test_fuzzy_fallback_on_typo() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::new("team-a");

    let response = services
        .search(&SearchQuerySpec::text("bundel"), &ctx, None)
        .unwrap();
    assert_eq!(response.mode, SearchMode::Fuzzy);
    assert_eq!(ids(&response), vec!["team-a:ui-guide"]);

    // advanced_search honours the requested mode and does not retry
    let exact = services
        .advanced_search(
            &SearchQuerySpec::text("bundel").with_mode(SearchMode::Exact),
            &ctx,
        )
        .unwrap();
    assert!(exact.results.is_empty());
}

#[test]
fn test_case_sensitive_verification() {
    let services = create_test_services();
    seed_teams(&services);

    let mut spec = everywhere("Deploy");
    spec.case_sensitive = true;
    let response = services
        .advanced_search(&spec, &DomainContext::default())
        .unwrap();
    assert_eq!(ids(&response), vec!["team-b:etl-notes"]);
}

#[test]
fn test_regex_and_wildcard_modes() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::default();

    let regex = services
        .advanced_search(
            &everywhere(r"cargo\s+deploy").with_mode(SearchMode::Regex),
            &ctx,
        )
        .unwrap();
    assert_eq!(ids(&regex), vec!["team-a-backend:api-runbook"]);

    let wildcard = services
        .advanced_search(&everywhere("schedul*"), &ctx)
        .unwrap();
    assert_eq!(wildcard.mode, SearchMode::Wildcard);
    assert_eq!(ids(&wildcard), vec!["team-b:etl-notes"]);

    let invalid = services.advanced_search(
        &everywhere("(unclosed").with_mode(SearchMode::Regex),
        &ctx,
    );
    assert!(invalid.is_err());
}

#[test]
fn test_type_and_tag_filters() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::default();

    let mut prompts = everywhere("deploy");
    prompts.type_filter = Some(RecordKind::Prompt);
    let response = services.advanced_search(&prompts, &ctx).unwrap();
    assert_eq!(ids(&response), vec!["team-a:review"]);

    let mut tagged = everywhere("");
    tagged.tags = vec!["OPS".to_string(), "data".to_string()];
    let response = services.advanced_search(&tagged, &ctx).unwrap();
    assert_eq!(
        ids(&response),
        vec!["team-a-backend:api-runbook", "team-b:etl-notes"]
    );
}

#[test]
fn test_include_and_exclude_patterns() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::default();

    let mut exclude = everywhere("deploy");
    exclude.type_filter = Some(RecordKind::Resource);
    exclude.exclude_patterns = vec!["cargo".to_string()];
    let response = services.advanced_search(&exclude, &ctx).unwrap();
    assert!(!ids(&response).contains(&"team-a-backend:api-runbook".to_string()));
    assert!(ids(&response).contains(&"team-a:ui-guide".to_string()));

    // Include patterns are any-of
    let mut include = everywhere("deploy");
    include.include_patterns = vec!["npm".to_string(), "scheduler".to_string()];
    let response = services.advanced_search(&include, &ctx).unwrap();
    assert_eq!(ids(&response), vec!["team-a:ui-guide", "team-b:etl-notes"]);
}

#[test]
fn test_paging_is_disjoint() {
    let services = create_test_services();
    seed_teams(&services);
    let ctx = DomainContext::default();

    let mut spec = everywhere("");
    spec.type_filter = Some(RecordKind::Resource);
    spec.limit = Some(2);
    let first = services.advanced_search(&spec, &ctx).unwrap();

    spec.offset = 2;
    let second = services.advanced_search(&spec, &ctx).unwrap();

    assert_eq!(first.count, 2);
    assert_eq!(second.count, 2);
    let mut all = ids(&first);
    all.extend(ids(&second));
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 4);
}

#[test]
fn test_sort_by_title() {
    let services = create_test_services();
    seed_teams(&services);

    let mut spec = everywhere("");
    spec.type_filter = Some(RecordKind::Resource);
    spec.sort_by = SortBy::Title;
    spec.sort_order = SortOrder::Asc;
    let response = services
        .advanced_search(&spec, &DomainContext::default())
        .unwrap();
    let titles: Vec<&str> = response.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "API runbook",
            "Engineering handbook",
            "ETL notes",
            "UI deploy guide"
        ]
    );
}

#[test]
fn test_query_length_and_unknown_domain_rejected() {
    let services = create_test_services();
    let ctx = DomainContext::default();

    let long = SearchQuerySpec::text("x".repeat(1001));
    assert!(services.search(&long, &ctx, None).unwrap_err().is_bad_request());

    let mut missing = SearchQuerySpec::text("deploy");
    missing.domains = vec!["nowhere".to_string()];
    assert!(services
        .advanced_search(&missing, &ctx)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_multi_word_tags_are_returned_whole() {
    let services = create_test_services();
    put_resource(
        &services,
        "default",
        "auth-flow",
        "Auth flow",
        "authentication flow for users",
        &["machine learning", "security"],
    );

    let response = services
        .search(&SearchQuerySpec::text("authentication"), &DomainContext::default(), None)
        .unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].tags, vec!["machine learning", "security"]);

    // Tag filters still match the whole tag
    let spec = SearchQuerySpec {
        tags: vec!["Machine Learning".to_string()],
        ..SearchQuerySpec::text("authentication")
    };
    let filtered = services
        .advanced_search(&spec, &DomainContext::default())
        .unwrap();
    assert_eq!(ids(&filtered), vec!["::auth-flow"]);
}
