//! Helper functions for MCP tools

use crate::core::types::{GrepMatch, LineKind, LineScanOutput, LineScanResponse};

/// Format bytes as human-readable size
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Markdown fence language for a content type
pub fn fence_language(content_type: &str) -> &str {
    match content_type.split(';').next().unwrap_or("").trim() {
        "text/markdown" => "markdown",
        "application/json" => "json",
        "application/toml" => "toml",
        "application/yaml" | "text/yaml" => "yaml",
        "text/html" => "html",
        "application/xml" | "text/xml" => "xml",
        "text/x-rust" => "rust",
        "text/x-python" => "python",
        "application/javascript" | "text/javascript" => "javascript",
        "application/sql" => "sql",
        _ => "",
    }
}

/// Truncate text if it exceeds `max_chars` characters
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars).collect();
    format!(
        "{}...\n\n[Truncated {} chars]",
        truncated,
        total - max_chars
    )
}

fn push_match(output: &mut String, m: &GrepMatch) {
    if m.context.is_empty() {
        output.push_str(&format!("{}:{}: {}\n", m.shorthand, m.line_number, m.text));
        return;
    }
    for line in &m.context {
        let sep = if line.kind == LineKind::Match { ':' } else { '-' };
        output.push_str(&format!(
            "{}{sep}{}{sep} {}\n",
            m.shorthand, line.line_number, line.text
        ));
    }
    output.push_str("--\n");
}

/// Render a grep/rg response as markdown
pub fn format_line_scan(tool: &str, response: &LineScanResponse) -> String {
    let mut output = format!(
        "**{tool}** `{}`: {} match(es), {} record(s) scanned ({}ms)\n",
        response.pattern,
        response.match_total(),
        response.records_scanned,
        response.duration_ms
    );
    if response.skipped > 0 {
        output.push_str(&format!(
            "_{} malformed record(s) skipped_\n",
            response.skipped
        ));
    }
    if response.truncated {
        output.push_str("_Output truncated by max-count_\n");
    }
    output.push('\n');

    match &response.output {
        LineScanOutput::Lines { matches } if matches.is_empty() => {
            output.push_str("No matches found.\n");
        }
        LineScanOutput::Lines { matches } => {
            output.push_str("```\n");
            for m in matches {
                push_match(&mut output, m);
            }
            output.push_str("```\n");
        }
        LineScanOutput::Count { total, per_record } => {
            for (shorthand, count) in per_record {
                output.push_str(&format!("- `{shorthand}`: {count}\n"));
            }
            output.push_str(&format!("\n**Total:** {total}\n"));
        }
        LineScanOutput::Files { files } => {
            for m in files {
                output.push_str(&format!("- `{}` {}\n", m.shorthand, m.title));
            }
        }
    }
    output
}
