//! Tests for CLI argument parsing
//!
//! Parses argv with `Cli::try_parse_from` and checks the resulting
//! command tree: global flags, aliases, and value parsing errors.

use clap::Parser;
use quiver::cli::{Cli, Commands, OutputFormat};
use quiver::core::domain::IsolationMode;
use quiver::core::types::{RecordKind, SearchMode, SortBy, SortOrder};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("argv should parse")
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["quiver", "search", "deploy", "--domain", "team-a", "--format", "json"]);
    assert_eq!(cli.domain.as_deref(), Some("team-a"));
    assert_eq!(cli.format, OutputFormat::Json);
    match cli.command {
        Commands::Search(args) => {
            assert_eq!(args.query, "deploy");
            assert!(args.limit.is_none());
            assert!(!args.ids_only);
        }
        other => panic!("expected search, got {other:?}"),
    }
}

#[test]
fn test_defaults_to_human_output() {
    let cli = parse(&["quiver", "-D", "team-b", "list-domains"]);
    assert_eq!(cli.format, OutputFormat::Human);
    assert_eq!(cli.domain.as_deref(), Some("team-b"));
    assert!(matches!(cli.command, Commands::ListDomains(_)));
}

#[test]
fn test_search_isolation_override() {
    let cli = parse(&["quiver", "search", "etl", "--isolation", "shared", "-k", "3"]);
    let Commands::Search(args) = cli.command else {
        panic!("expected search");
    };
    assert_eq!(args.isolation, Some(IsolationMode::Shared));
    assert_eq!(args.limit, Some(3));
}

#[test]
fn test_advanced_search_options() {
    let cli = parse(&[
        "quiver",
        "advanced-search",
        "deploy",
        "--mode",
        "exact",
        "--type",
        "resource",
        "--tag",
        "ops",
        "--tag",
        "data",
        "--sort-by",
        "title",
        "--sort-order",
        "asc",
        "--exclude",
        "rollback",
        "-C",
        "1",
    ]);
    let Commands::AdvancedSearch(args) = cli.command else {
        panic!("expected advanced-search");
    };
    let spec = args.to_spec();
    assert_eq!(spec.mode, SearchMode::Exact);
    assert_eq!(spec.type_filter, Some(RecordKind::Resource));
    assert_eq!(spec.tags, vec!["ops", "data"]);
    assert_eq!(spec.sort_by, SortBy::Title);
    assert_eq!(spec.sort_order, SortOrder::Asc);
    assert_eq!(spec.exclude_patterns, vec!["rollback"]);
    assert_eq!(spec.context_lines, 1);
}

#[test]
fn test_advanced_search_rejects_unknown_mode() {
    let err = Cli::try_parse_from(["quiver", "advanced-search", "x", "--mode", "telepathy"])
        .unwrap_err();
    assert!(err.to_string().contains("unknown search mode"));
}

#[test]
fn test_rg_alias() {
    let cli = parse(&["quiver", "rg", "deploy", "-S", "-g", "*runbook*", "-l"]);
    let Commands::Ripgrep(args) = cli.command else {
        panic!("expected ripgrep");
    };
    assert_eq!(args.pattern, "deploy");
    assert!(args.smart_case);
    assert!(args.files_with_matches);
    assert_eq!(args.glob.as_deref(), Some("*runbook*"));
}

#[test]
fn test_grep_short_flags() {
    let cli = parse(&["quiver", "grep", "-iwc", "-m", "2", "-A", "1", "deploy", "--in", "team-b"]);
    let Commands::Grep(args) = cli.command else {
        panic!("expected grep");
    };
    let options = args.to_options();
    assert!(options.ignore_case);
    assert!(options.whole_words);
    assert!(options.count);
    assert_eq!(options.max_count, Some(2));
    assert_eq!(options.after, Some(1));
    assert_eq!(options.domains, vec!["team-b"]);
}

#[test]
fn test_find_negative_size() {
    let cli = parse(&["quiver", "find", "--size", "-1k", "--type", "f"]);
    let Commands::Find(args) = cli.command else {
        panic!("expected find");
    };
    assert_eq!(args.size.as_deref(), Some("-1k"));
    assert_eq!(args.kind.as_deref(), Some("f"));
}

#[test]
fn test_get_record_arguments() {
    let cli = parse(&[
        "quiver",
        "get-record",
        "team-a:review",
        "--arg",
        "file=main.rs",
        "-a",
        "focus=errors",
    ]);
    let Commands::GetRecord(args) = cli.command else {
        panic!("expected get-record");
    };
    assert_eq!(
        args.arguments,
        vec![
            ("file".to_string(), "main.rs".to_string()),
            ("focus".to_string(), "errors".to_string()),
        ]
    );

    assert!(Cli::try_parse_from(["quiver", "get-record", "x", "--arg", "novalue"]).is_err());
}

#[test]
fn test_shorthand_requires_token_or_local_id() {
    assert!(Cli::try_parse_from(["quiver", "shorthand"]).is_err());
    assert!(Cli::try_parse_from(["quiver", "shorthand", "--local-id", "notes"]).is_ok());
    assert!(Cli::try_parse_from(["quiver", "shorthand", "--of", "team-a"]).is_err());
}

#[test]
fn test_add_resource_content_conflicts_with_file() {
    let result = Cli::try_parse_from([
        "quiver",
        "add-resource",
        "notes",
        "--content",
        "x",
        "--file",
        "notes.txt",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_missing_subcommand_fails() {
    assert!(Cli::try_parse_from(["quiver"]).is_err());
}
