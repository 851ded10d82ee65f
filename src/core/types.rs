//! Core data types for the Quiver search service.
//!
//! This module defines the records owned by the store, the query
//! specification consumed by the compiler, and the shaped results
//! returned to callers (including the grep/find/ripgrep views).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Resource,
    Prompt,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Resource => "resource",
            RecordKind::Prompt => "prompt",
        }
    }

    /// Plural form used in virtual paths
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Resource => "resources",
            RecordKind::Prompt => "prompts",
        }
    }

    /// Parse from string, returning None for unknown kinds.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "resource" | "resources" => Some(RecordKind::Resource),
            "prompt" | "prompts" => Some(RecordKind::Prompt),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown record type: {s}"))
    }
}

/// A short stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub domain: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A templated prompt with `{{variable}}` placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub domain: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub template: String,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_content_type() -> String {
    "text/plain".to_string()
}

/// Either kind of stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Resource(Resource),
    Prompt(Prompt),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Resource(_) => RecordKind::Resource,
            Record::Prompt(_) => RecordKind::Prompt,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Resource(r) => &r.id,
            Record::Prompt(p) => &p.id,
        }
    }

    pub fn domain(&self) -> &str {
        match self {
            Record::Resource(r) => &r.domain,
            Record::Prompt(p) => &p.domain,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Record::Resource(r) => &r.name,
            Record::Prompt(p) => &p.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Record::Resource(r) => &r.description,
            Record::Prompt(p) => &p.description,
        }
    }

    /// Searchable body: resource content or prompt template
    pub fn body(&self) -> &str {
        match self {
            Record::Resource(r) => &r.content,
            Record::Prompt(p) => &p.template,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Record::Resource(r) => &r.tags,
            Record::Prompt(p) => &p.tags,
        }
    }

    /// Content type; prompts carry none
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Record::Resource(r) => Some(&r.content_type),
            Record::Prompt(_) => None,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Record::Resource(r) => r.created_at,
            Record::Prompt(p) => p.created_at,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Record::Resource(r) => r.updated_at,
            Record::Prompt(p) => p.updated_at,
        }
    }

    /// Byte length of the body
    pub fn size(&self) -> u64 {
        self.body().len() as u64
    }

    pub(crate) fn set_created_at(&mut self, at: DateTime<Utc>) {
        match self {
            Record::Resource(r) => r.created_at = at,
            Record::Prompt(p) => p.created_at = at,
        }
    }
}

/// Query mode selected by the caller (or `Smart` for auto-detection)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Smart,
    Exact,
    Fuzzy,
    Regex,
    Wildcard,
    Semantic,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Smart => "smart",
            SearchMode::Exact => "exact",
            SearchMode::Fuzzy => "fuzzy",
            SearchMode::Regex => "regex",
            SearchMode::Wildcard => "wildcard",
            SearchMode::Semantic => "semantic",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smart" | "auto" => Ok(SearchMode::Smart),
            "exact" => Ok(SearchMode::Exact),
            "fuzzy" => Ok(SearchMode::Fuzzy),
            "regex" => Ok(SearchMode::Regex),
            "wildcard" => Ok(SearchMode::Wildcard),
            "semantic" => Ok(SearchMode::Semantic),
            other => Err(format!(
                "unknown search mode '{other}'. Must be one of: smart, exact, fuzzy, regex, wildcard, semantic"
            )),
        }
    }
}

/// Sort key for shaped results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    /// Last update time
    Date,
    Created,
    Title,
    Type,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" | "score" => Ok(SortBy::Relevance),
            "date" | "updated" => Ok(SortBy::Date),
            "created" => Ok(SortBy::Created),
            "title" | "name" => Ok(SortBy::Title),
            "type" => Ok(SortBy::Type),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// Structured query consumed by the query compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQuerySpec {
    /// Raw query text (may be empty for "match everything")
    #[serde(alias = "query")]
    pub raw_text: String,
    pub mode: SearchMode,
    pub case_sensitive: bool,
    pub whole_words: bool,
    #[serde(alias = "type")]
    pub type_filter: Option<RecordKind>,
    pub content_type: Option<String>,
    pub tags: Vec<String>,
    /// Explicit domain filter; overrides the caller's scope when non-empty
    pub domains: Vec<String>,
    /// Restrict the default multi-field query to these fields
    pub fields: Vec<String>,
    pub min_score: Option<f32>,
    /// Requested page size; `None` or 0 selects the configured default
    pub limit: Option<usize>,
    pub offset: usize,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub highlight: bool,
    /// Snippet window in characters; 0 selects the configured default
    pub snippet_length: usize,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub context_lines: usize,
    /// Regex mode: let `.` match newlines and `^`/`$` match per line
    pub multiline: bool,
}

impl Default for SearchQuerySpec {
    fn default() -> Self {
        Self {
            raw_text: String::new(),
            mode: SearchMode::Smart,
            case_sensitive: false,
            whole_words: false,
            type_filter: None,
            content_type: None,
            tags: Vec::new(),
            domains: Vec::new(),
            fields: Vec::new(),
            min_score: None,
            limit: None,
            offset: 0,
            sort_by: SortBy::Relevance,
            sort_order: SortOrder::Desc,
            highlight: false,
            snippet_length: 0,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            context_lines: 0,
            multiline: false,
        }
    }
}

impl SearchQuerySpec {
    /// Convenience constructor for a text query with all defaults
    pub fn text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Position of a line within a context block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Before,
    Match,
    After,
}

/// A single line emitted as part of a context block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextLine {
    /// 1-based line number
    pub line_number: usize,
    pub text: String,
    pub kind: LineKind,
}

/// Shaped search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub domain: String,
    /// Shorthand token resolving back to this record
    pub shorthand: String,
    pub score: f32,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub title: String,
    pub content: String,
    pub snippet: String,
    pub highlights: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub field_match_counts: BTreeMap<String, usize>,
    pub line_numbers: Vec<usize>,
    pub context_lines: Vec<ContextLine>,
    pub match_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response from a search operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Original query text
    pub query: String,

    /// Mode the compiler actually used (after smart detection)
    pub mode: SearchMode,

    /// Domains the search was permitted to read
    pub scope: Vec<String>,

    pub results: Vec<SearchResult>,

    /// Number of results returned
    pub count: usize,

    /// Query duration in milliseconds
    pub duration_ms: u64,
}

/// One matching line produced by grep or ripgrep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrepMatch {
    pub id: String,
    pub domain: String,
    pub shorthand: String,
    pub title: String,
    /// 1-based line number
    pub line_number: usize,
    /// Full line, or only the matched span with only-matching
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub context: Vec<ContextLine>,
}

/// Output of a line-oriented scan (grep/ripgrep)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "shape")]
pub enum LineScanOutput {
    /// Per-line records
    Lines { matches: Vec<GrepMatch> },
    /// Count-only summary across every scanned record
    Count {
        total: usize,
        #[serde(rename = "perRecord")]
        per_record: BTreeMap<String, usize>,
    },
    /// One record per distinct resource with at least one match
    Files { files: Vec<GrepMatch> },
}

/// Result of a grep/ripgrep request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineScanResponse {
    pub pattern: String,
    pub output: LineScanOutput,
    pub records_scanned: usize,
    /// Malformed records skipped during the scan
    pub skipped: usize,
    /// True when a max-count cap stopped the scan early
    pub truncated: bool,
    pub duration_ms: u64,
}

impl LineScanResponse {
    /// Number of matched lines (or the count total)
    pub fn match_total(&self) -> usize {
        match &self.output {
            LineScanOutput::Lines { matches } => matches.len(),
            LineScanOutput::Count { total, .. } => *total,
            LineScanOutput::Files { files } => files.len(),
        }
    }
}

/// Unix `find`-style view of a stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindResult {
    pub id: String,
    pub domain: String,
    pub shorthand: String,
    pub kind: RecordKind,
    pub name: String,
    /// Body length in bytes
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// `/<domain path>/<resources|prompts>/<id>`
    pub virtual_path: String,
}

/// Response from a find request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindResponse {
    pub results: Vec<FindResult>,
    pub records_scanned: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

/// Per-domain statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStats {
    pub domain: String,
    pub path: String,
    pub active: bool,
    pub resources: usize,
    pub prompts: usize,
    pub children: usize,
    pub descendants: usize,
    /// Size of the searchable scope under the configured isolation mode
    pub scope_size: usize,
}
