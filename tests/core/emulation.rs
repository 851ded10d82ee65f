// Integration tests for the grep, find and ripgrep views

use crate::common::{create_test_services, seed_teams, TeamFixture};
use quiver::core::domain::DomainContext;
use quiver::core::emulation::{FindOptions, GrepOptions, RipgrepOptions};
use quiver::core::types::{GrepMatch, LineKind, LineScanOutput, LineScanResponse, RecordKind};

fn team_a() -> DomainContext {
    DomainContext::new(TeamFixture::TEAM_A)
}

fn matches(response: &LineScanResponse) -> &[GrepMatch] {
    match &response.output {
        LineScanOutput::Lines { matches } => matches,
        LineScanOutput::Files { files } => files,
        other => panic!("expected lines, got {other:?}"),
    }
}

fn tokens(response: &LineScanResponse) -> Vec<String> {
    let mut tokens: Vec<String> = matches(response)
        .iter()
        .map(|m| format!("{}#{}", m.shorthand, m.line_number))
        .collect();
    tokens.sort();
    tokens
}

#[test]
fn test_grep_literal_by_default() {
    let services = create_test_services();
    seed_teams(&services);

    let response = services
        .grep(&GrepOptions::new("deploy"), &team_a())
        .unwrap();
    assert_eq!(
        tokens(&response),
        vec![
            "team-a-backend:api-runbook#2",
            "team-a:review#1",
            "team-a:ui-guide#2"
        ]
    );
    assert_eq!(response.records_scanned, 3);
    assert_eq!(response.skipped, 0);

    // Without -E the pattern is not a regex
    let dotted = services
        .grep(&GrepOptions::new("dep.oy"), &team_a())
        .unwrap();
    assert_eq!(dotted.match_total(), 0);
}

#[test]
fn test_grep_flags() {
    let services = create_test_services();
    seed_teams(&services);

    let mut options = GrepOptions::new(r"cargo\s+deploy");
    options.extended = true;
    assert_eq!(services.grep(&options, &team_a()).unwrap().match_total(), 1);

    // -F wins over -E
    options.fixed = true;
    assert_eq!(services.grep(&options, &team_a()).unwrap().match_total(), 0);

    let mut options = GrepOptions::new("RESTART");
    assert_eq!(services.grep(&options, &team_a()).unwrap().match_total(), 0);
    options.ignore_case = true;
    assert_eq!(services.grep(&options, &team_a()).unwrap().match_total(), 1);

    let mut options = GrepOptions::new("deploy");
    options.invert_match = true;
    options.kind = Some(RecordKind::Resource);
    assert_eq!(services.grep(&options, &team_a()).unwrap().match_total(), 5);

    let mut options = GrepOptions::new("dep[a-z]+");
    options.extended = true;
    options.only_matching = true;
    let response = services.grep(&options, &team_a()).unwrap();
    assert!(matches(&response).iter().all(|m| m.text == "deploy"));
}

#[test]
fn test_grep_whole_words() {
    let services = create_test_services();
    seed_teams(&services);

    let mut options = GrepOptions::new("dash");
    assert_eq!(services.grep(&options, &team_a()).unwrap().match_total(), 1);
    options.whole_words = true;
    assert_eq!(services.grep(&options, &team_a()).unwrap().match_total(), 0);
}

#[test]
fn test_grep_count_keys_by_shorthand() {
    let services = create_test_services();
    seed_teams(&services);

    let mut options = GrepOptions::new("deploy");
    options.count = true;
    options.kind = Some(RecordKind::Resource);
    let response = services.grep(&options, &team_a()).unwrap();

    match response.output {
        LineScanOutput::Count { total, per_record } => {
            assert_eq!(total, 2);
            assert_eq!(per_record["team-a:ui-guide"], 1);
            assert_eq!(per_record["team-a-backend:api-runbook"], 1);
        }
        other => panic!("expected count, got {other:?}"),
    }
}

#[test]
fn test_grep_context_and_max_count() {
    let services = create_test_services();
    seed_teams(&services);

    let mut options = GrepOptions::new("cargo");
    options.context = 1;
    let response = services.grep(&options, &team_a()).unwrap();
    let context: Vec<(usize, LineKind)> = matches(&response)[0]
        .context
        .iter()
        .map(|l| (l.line_number, l.kind))
        .collect();
    assert_eq!(
        context,
        vec![(1, LineKind::Before), (2, LineKind::Match), (3, LineKind::After)]
    );

    let mut options = GrepOptions::new("deploy");
    options.max_count = Some(1);
    let response = services.grep(&options, &team_a()).unwrap();
    assert_eq!(response.match_total(), 1);
    assert!(response.truncated);
}

#[test]
fn test_grep_rejects_bad_flags() {
    let services = create_test_services();

    assert!(services.grep(&GrepOptions::new(""), &team_a()).is_err());

    let mut options = GrepOptions::new("x");
    options.only_matching = true;
    options.invert_match = true;
    assert!(services
        .grep(&options, &DomainContext::default())
        .unwrap_err()
        .is_bad_request());

    let mut options = GrepOptions::new("x");
    options.max_count = Some(0);
    assert!(services.grep(&options, &DomainContext::default()).is_err());

    let mut options = GrepOptions::new("(open");
    options.extended = true;
    assert!(services.grep(&options, &DomainContext::default()).is_err());
}

#[test]
fn test_find_criteria() {
    let services = create_test_services();
    seed_teams(&services);

    let by_name = services
        .find(
            &FindOptions {
                name: Some("GUIDE".to_string()),
                ..FindOptions::default()
            },
            &team_a(),
        )
        .unwrap();
    assert_eq!(by_name.results.len(), 1);
    assert_eq!(by_name.results[0].shorthand, "team-a:ui-guide");

    let prompts = services
        .find(
            &FindOptions {
                kind: Some("d".to_string()),
                ..FindOptions::default()
            },
            &team_a(),
        )
        .unwrap();
    assert_eq!(prompts.results.len(), 1);
    assert_eq!(prompts.results[0].kind, RecordKind::Prompt);
    assert_eq!(prompts.results[0].virtual_path, "/team-a/prompts/review");

    let large = services
        .find(
            &FindOptions {
                size: Some("+60".to_string()),
                ..FindOptions::default()
            },
            &team_a(),
        )
        .unwrap();
    assert_eq!(large.results.len(), 1);
    assert_eq!(
        large.results[0].virtual_path,
        "/team-a/team-a-backend/resources/api-runbook"
    );

    let tagged = services
        .find(
            &FindOptions {
                tags: vec!["Frontend".to_string()],
                ..FindOptions::default()
            },
            &team_a(),
        )
        .unwrap();
    assert_eq!(tagged.results.len(), 1);
}

#[test]
fn test_find_limit_and_bad_input() {
    let services = create_test_services();
    seed_teams(&services);

    let limited = services
        .find(
            &FindOptions {
                limit: Some(1),
                ..FindOptions::default()
            },
            &team_a(),
        )
        .unwrap();
    assert_eq!(limited.results.len(), 1);

    for options in [
        FindOptions {
            kind: Some("socket".to_string()),
            ..FindOptions::default()
        },
        FindOptions {
            size: Some("+10x".to_string()),
            ..FindOptions::default()
        },
        FindOptions {
            name: Some("[".to_string()),
            ..FindOptions::default()
        },
    ] {
        assert!(services.find(&options, &team_a()).unwrap_err().is_bad_request());
    }
}

#[test]
fn test_ripgrep_lines_and_files() {
    let services = create_test_services();
    seed_teams(&services);

    let response = services
        .ripgrep(&RipgrepOptions::new("deploy"), &team_a())
        .unwrap();
    assert_eq!(response.match_total(), 3);

    let mut options = RipgrepOptions::new("deploy");
    options.files_with_matches = true;
    let files = services.ripgrep(&options, &team_a()).unwrap();
    assert!(matches!(files.output, LineScanOutput::Files { .. }));
    assert_eq!(files.match_total(), 3);

    let mut options = RipgrepOptions::new("deploy");
    options.glob = Some("*runbook*".to_string());
    let globbed = services.ripgrep(&options, &team_a()).unwrap();
    assert_eq!(tokens(&globbed), vec!["team-a-backend:api-runbook#2"]);
}

#[test]
fn test_ripgrep_count_and_smart_case() {
    let services = create_test_services();
    seed_teams(&services);

    let mut options = RipgrepOptions::new("deploy");
    options.count = true;
    let counted = services.ripgrep(&options, &team_a()).unwrap();
    assert!(matches!(counted.output, LineScanOutput::Count { total: 3, .. }));

    options.files_with_matches = true;
    assert!(services.ripgrep(&options, &team_a()).is_err());

    let mut options = RipgrepOptions::new("Deploy");
    options.smart_case = true;
    options.domains = vec!["team-a".to_string(), "team-b".to_string()];
    let response = services.ripgrep(&options, &team_a()).unwrap();
    assert_eq!(tokens(&response), vec!["team-b:etl-notes#2"]);
}

#[test]
fn test_ripgrep_max_count_truncation_only_when_lines_are_hidden() {
    let services = create_test_services();
    seed_teams(&services);

    // Every record has a single "deploy" line, so -m 1 hides nothing
    let mut options = RipgrepOptions::new("deploy");
    options.max_count = Some(1);
    let exact = services.ripgrep(&options, &team_a()).unwrap();
    assert_eq!(exact.match_total(), 3);
    assert!(!exact.truncated);

    // The UI guide has two lines with "the"
    let mut options = RipgrepOptions::new("the");
    options.max_count = Some(1);
    let capped = services.ripgrep(&options, &team_a()).unwrap();
    assert_eq!(
        tokens(&capped),
        vec!["team-a-backend:api-runbook#1", "team-a:ui-guide#1"]
    );
    assert!(capped.truncated);
}
