//! Tests for CLI output formatting helpers
//!
//! Tests the output formatting utilities:
//! - Byte formatting (KB, MB, GB)
//! - Duration formatting (ms, s, m)
//! - Relative time formatting (just now, minutes ago, hours ago, days ago)
//! - Line truncation

use chrono::{Duration, Utc};
use quiver::cli::output::{format_bytes, format_duration, format_relative_time, truncate_line};

// =============================================================================
// format_bytes tests
// =============================================================================

#[test]
fn test_format_bytes_various_sizes() {
    assert_eq!(format_bytes(0), "0 B");
    assert_eq!(format_bytes(51), "51 B");
    assert_eq!(format_bytes(1023), "1023 B");

    assert_eq!(format_bytes(1024), "1.0 KB");
    assert_eq!(format_bytes(1536), "1.5 KB");

    assert_eq!(format_bytes(1048576), "1.0 MB");
    assert_eq!(format_bytes(10485760), "10.0 MB");

    assert_eq!(format_bytes(1073741824), "1.0 GB");
}

#[test]
fn test_format_bytes_boundaries() {
    assert_eq!(format_bytes(1048576 - 1), "1024.0 KB");
    assert_eq!(format_bytes(1073741824 - 1), "1024.0 MB");
}

// =============================================================================
// format_duration tests
// =============================================================================

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0), "0ms");
    assert_eq!(format_duration(999), "999ms");
    assert_eq!(format_duration(1000), "1.00s");
    assert_eq!(format_duration(1500), "1.50s");
    assert_eq!(format_duration(60000), "1m 0.0s");
    assert_eq!(format_duration(90500), "1m 30.5s");
}

// =============================================================================
// format_relative_time tests
// =============================================================================

#[test]
fn test_format_relative_time() {
    let now = Utc::now();
    assert_eq!(format_relative_time(&now), "just now");
    assert_eq!(format_relative_time(&(now - Duration::minutes(5))), "5m ago");
    assert_eq!(format_relative_time(&(now - Duration::hours(3))), "3h ago");
    assert_eq!(format_relative_time(&(now - Duration::days(2))), "2d ago");
    assert_eq!(
        format_relative_time(&(now + Duration::hours(1))),
        "in the future"
    );
}

// =============================================================================
// truncate_line tests
// =============================================================================

#[test]
fn test_truncate_line() {
    assert_eq!(truncate_line("short", 10), "short");
    assert_eq!(truncate_line("exactly10!", 10), "exactly10!");
    assert_eq!(truncate_line("cargo deploy --release", 10), "cargo d...");
    assert_eq!(truncate_line("héllo wörld", 8), "héllo...");
}
