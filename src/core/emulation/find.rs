//! `find` over stored records.
//!
//! Filters the flat union of resources and prompts. Criteria run in a
//! fixed order (name, type, content type, tags, size) and the first
//! failing one rejects the record.

use crate::core::deadline::Deadline;
use crate::core::domain::{shorthand, DomainRegistry};
use crate::core::emulation::scan::{FlatScan, ScanStrategy};
use crate::core::emulation::size::SizeFilter;
use crate::core::error::{QuiverError, Result};
use crate::core::storage::RecordStore;
use crate::core::types::{FindResponse, FindResult, Record, RecordKind};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use std::time::Instant;
use tracing::info;

/// find criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindOptions {
    /// Case-insensitive regex tested against the name and the id
    pub name: Option<String>,
    /// `f`/`file` for resources, `d`/`directory`/`prompt` for prompts
    #[serde(alias = "type")]
    pub kind: Option<String>,
    /// Any of these tags, case-insensitively
    pub tags: Vec<String>,
    pub content_type: Option<String>,
    /// `+N`, `-N` or `N` with an optional k/m/g unit
    pub size: Option<String>,
    pub limit: Option<usize>,
    /// Explicit domains instead of the caller's scope
    pub domains: Vec<String>,
}

/// `find -type` argument
pub fn parse_kind(value: &str) -> Result<RecordKind> {
    match value.trim().to_lowercase().as_str() {
        "f" | "file" | "resource" => Ok(RecordKind::Resource),
        "d" | "directory" | "prompt" => Ok(RecordKind::Prompt),
        other => Err(QuiverError::InvalidArgument(format!(
            "unknown type '{other}'. Use f (resources) or d (prompts)"
        ))),
    }
}

/// Criteria compiled once before the scan
struct Criteria {
    name: Option<Regex>,
    kind: Option<RecordKind>,
    content_type: Option<String>,
    tags: Vec<String>,
    size: Option<SizeFilter>,
}

impl Criteria {
    fn compile(options: &FindOptions) -> Result<Self> {
        let name = options
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| QuiverError::pattern(pattern, e))
            })
            .transpose()?;

        Ok(Self {
            name,
            kind: options.kind.as_deref().map(parse_kind).transpose()?,
            content_type: options.content_type.clone().filter(|c| !c.is_empty()),
            tags: options.tags.iter().map(|t| t.to_lowercase()).collect(),
            size: options.size.as_deref().map(SizeFilter::parse).transpose()?,
        })
    }

    fn accepts(&self, record: &Record) -> bool {
        if let Some(name) = &self.name {
            if !name.is_match(record.name()) && !name.is_match(record.id()) {
                return false;
            }
        }
        if self.kind.is_some_and(|kind| kind != record.kind()) {
            return false;
        }
        if let Some(wanted) = &self.content_type {
            if record.content_type() != Some(wanted.as_str()) {
                return false;
            }
        }
        if !self.tags.is_empty()
            && !record
                .tags()
                .iter()
                .any(|tag| self.tags.contains(&tag.to_lowercase()))
        {
            return false;
        }
        if let Some(size) = &self.size {
            if !size.matches(record.size()) {
                return false;
            }
        }
        true
    }
}

/// `/<domain path>/<resources|prompts>/<id>`
pub fn virtual_path(domain_path: &str, record: &Record) -> String {
    format!(
        "/{}/{}/{}",
        domain_path.trim_matches('/'),
        record.kind().collection(),
        record.id()
    )
}

/// Domain id to hierarchical path, for every domain in `scope`
pub fn domain_paths(registry: &DomainRegistry, scope: &BTreeSet<String>) -> BTreeMap<String, String> {
    scope
        .iter()
        .map(|id| {
            let path = registry
                .get(id)
                .map(|d| d.path)
                .unwrap_or_else(|_| id.clone());
            (id.clone(), path)
        })
        .collect()
}

fn to_result(record: &Record, paths: &BTreeMap<String, String>) -> FindResult {
    let domain_path = paths
        .get(record.domain())
        .map(String::as_str)
        .unwrap_or(record.domain());
    FindResult {
        id: record.id().to_string(),
        domain: record.domain().to_string(),
        shorthand: shorthand::build(record.domain(), record.id())
            .unwrap_or_else(|_| format!("{}:{}", record.domain(), record.id())),
        kind: record.kind(),
        name: record.name().to_string(),
        size: record.size(),
        content_type: record.content_type().map(str::to_string),
        tags: record.tags().to_vec(),
        created_at: record.created_at(),
        modified_at: record.updated_at(),
        virtual_path: virtual_path(domain_path, record),
    }
}

/// Run find over the records of `scope`, returning at most `limit`
pub fn find(
    registry: &DomainRegistry,
    store: &RecordStore,
    scope: &BTreeSet<String>,
    options: &FindOptions,
    limit: usize,
    page_size: usize,
    deadline: &Deadline,
) -> Result<FindResponse> {
    let start = Instant::now();
    let criteria = Criteria::compile(options)?;
    let paths = domain_paths(registry, scope);
    let limit = limit.max(1);

    let mut results = Vec::new();
    let stats = FlatScan::new(store, scope, page_size).scan(deadline, &mut |record| {
        if criteria.accepts(record) {
            results.push(to_result(record, &paths));
            if results.len() >= limit {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    })?;

    info!(
        scanned = stats.scanned,
        found = results.len(),
        "find completed"
    );
    Ok(FindResponse {
        results,
        records_scanned: stats.scanned,
        skipped: stats.skipped,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}
