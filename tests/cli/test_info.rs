//! Tests for show-config, get-server-info and completions

use super::test_helpers::{seeded_team_a, FORMATS};
use clap_complete::Shell;
use quiver::cli::commands::completions::write_completions;
use quiver::cli::commands::config::{self, ConfigArgs, ConfigResponse};
use quiver::cli::commands::info::{self, InfoArgs};

#[tokio::test]
async fn test_show_config_both_formats() {
    let (services, _) = seeded_team_a();
    for all in [false, true] {
        for format in FORMATS {
            let args = ConfigArgs { all };
            assert!(config::execute(args, &services, format).await.is_ok());
        }
    }
}

#[test]
fn test_config_response_reflects_services() {
    let (services, _) = seeded_team_a();
    let response = ConfigResponse::build(&services, true);
    assert!(response.in_memory);
    assert_eq!(response.domains.default_domain, "default");
    assert_eq!(response.search.max_query_length, 1000);
    assert!(response.search.default_limit <= response.search.max_limit);
    assert!(response.search.scan_page_size.is_some());
}

#[tokio::test]
async fn test_server_info_both_formats() {
    let (services, _) = seeded_team_a();
    for detailed in [false, true] {
        for format in FORMATS {
            let args = InfoArgs { detailed };
            assert!(info::execute(args, &services, format).await.is_ok());
        }
    }
}

#[test]
fn test_completions_for_each_shell() {
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        let mut buf = Vec::new();
        write_completions(shell, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("ripgrep"), "{shell} script lacks subcommands");
        assert!(script.contains("switch-domain"));
    }
}
