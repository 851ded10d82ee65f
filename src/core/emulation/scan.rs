//! Scan strategies and the line matching shared by grep and ripgrep.
//!
//! A [`ScanStrategy`] feeds records to a visitor: [`FlatScan`] walks
//! the record store page by page, [`RankedScan`] replays the hits of a
//! compiled index query. Whatever the source, lines are matched by one
//! [`LineMatcher`] and collected by one [`LineCollector`].

use crate::core::deadline::Deadline;
use crate::core::domain::shorthand;
use crate::core::error::Result;
use crate::core::search::postprocess::{context_block, fold, TermMatcher};
use crate::core::search::{ExecutableQuery, SearchService};
use crate::core::storage::{RawHit, RecordStore};
use crate::core::types::{GrepMatch, LineScanOutput, Record, RecordKind, SearchQuerySpec};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// Counters reported alongside scan output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Records handed to the visitor
    pub scanned: usize,
    /// Records that could not be read
    pub skipped: usize,
}

/// Source of records for the CLI views
pub trait ScanStrategy {
    /// Feed records to `visit` until the source is exhausted or the
    /// visitor breaks. The deadline is checked before every record.
    fn scan(
        &self,
        deadline: &Deadline,
        visit: &mut dyn FnMut(&Record) -> ControlFlow<()>,
    ) -> Result<ScanStats>;
}

/// Linear pass over every in-scope record of the store
pub struct FlatScan<'a> {
    store: &'a RecordStore,
    scope: &'a BTreeSet<String>,
    kind: Option<RecordKind>,
    /// Lower-cased; any one must be present
    tags: Vec<String>,
    page_size: usize,
}

impl<'a> FlatScan<'a> {
    pub fn new(store: &'a RecordStore, scope: &'a BTreeSet<String>, page_size: usize) -> Self {
        Self {
            store,
            scope,
            kind: None,
            tags: Vec::new(),
            page_size: page_size.max(1),
        }
    }

    pub fn kind(mut self, kind: Option<RecordKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn tags(mut self, tags: &[String]) -> Self {
        self.tags = tags.iter().map(|t| t.to_lowercase()).collect();
        self
    }

    fn wanted(&self, record: &Record) -> bool {
        self.tags.is_empty()
            || record
                .tags()
                .iter()
                .any(|tag| self.tags.contains(&tag.to_lowercase()))
    }
}

impl ScanStrategy for FlatScan<'_> {
    fn scan(
        &self,
        deadline: &Deadline,
        visit: &mut dyn FnMut(&Record) -> ControlFlow<()>,
    ) -> Result<ScanStats> {
        let mut stats = ScanStats::default();

        for entry in self.store.malformed_in(Some(self.scope))? {
            warn!(reason = %entry.reason, "Skipping malformed record");
            stats.skipped += 1;
        }

        let mut offset = 0;
        loop {
            let page = self
                .store
                .list(Some(self.scope), self.kind, self.page_size, offset)?;
            offset += page.len();

            for record in page.iter().filter(|r| self.wanted(r)) {
                deadline.check("scan")?;
                stats.scanned += 1;
                if visit(record).is_break() {
                    return Ok(stats);
                }
            }

            if page.len() < self.page_size {
                return Ok(stats);
            }
        }
    }
}

/// Records behind the hits of a compiled index query, in rank order
pub struct RankedScan<'a> {
    store: &'a RecordStore,
    exec: ExecutableQuery,
    hits: Vec<RawHit>,
}

impl<'a> RankedScan<'a> {
    /// Compile `spec` and fetch up to `limit` hits within `scope`
    pub fn prepare(
        search: &SearchService,
        store: &'a RecordStore,
        spec: &SearchQuerySpec,
        scope: &BTreeSet<String>,
        limit: usize,
    ) -> Result<Self> {
        let (exec, hits) = search.candidates(spec, scope, limit)?;
        debug!(mode = %exec.mode, hits = hits.len(), "Ranked scan prepared");
        Ok(Self { store, exec, hits })
    }

    /// Term matcher derived from the compiled query
    pub fn matcher(&self) -> &TermMatcher {
        &self.exec.matcher
    }
}

impl ScanStrategy for RankedScan<'_> {
    fn scan(
        &self,
        deadline: &Deadline,
        visit: &mut dyn FnMut(&Record) -> ControlFlow<()>,
    ) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        for hit in &self.hits {
            deadline.check("scan")?;
            let record = match self.store.get(&hit.domain, Some(hit.kind), &hit.id) {
                Ok(record) => record,
                Err(e) if e.is_not_found() => {
                    debug!(key = %hit.key, "Indexed record missing from store");
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            stats.scanned += 1;
            if visit(&record).is_break() {
                break;
            }
        }
        Ok(stats)
    }
}

/// Per-line predicate
#[derive(Debug, Clone)]
pub enum LinePredicate {
    /// Substring test
    Literal { needle: String, ignore_case: bool },
    /// The pattern's words appear as consecutive whole words
    Words { words: Vec<String>, ignore_case: bool },
    Pattern(Regex),
    /// Any query term, case-insensitively
    AnyTerm(TermMatcher),
}

/// A line predicate with optional inversion
#[derive(Debug, Clone)]
pub struct LineMatcher {
    predicate: LinePredicate,
    invert: bool,
}

impl LineMatcher {
    pub fn new(predicate: LinePredicate, invert: bool) -> Self {
        Self { predicate, invert }
    }

    /// Substring test, optionally whole-word
    pub fn literal(needle: &str, ignore_case: bool, whole_words: bool) -> LinePredicate {
        if whole_words {
            LinePredicate::Words {
                words: words(needle)
                    .into_iter()
                    .map(|(_, _, w)| if ignore_case { fold(w) } else { w.to_string() })
                    .collect(),
                ignore_case,
            }
        } else {
            LinePredicate::Literal {
                needle: if ignore_case { fold(needle) } else { needle.to_string() },
                ignore_case,
            }
        }
    }

    pub fn is_match(&self, line: &str) -> bool {
        !self.spans(line).is_empty()
    }

    /// Matched spans of `line`, in order. An inverted matcher yields
    /// the whole line when nothing matched.
    pub fn spans(&self, line: &str) -> Vec<String> {
        if self.invert {
            return if self.raw_spans(line).is_empty() {
                vec![line.to_string()]
            } else {
                Vec::new()
            };
        }
        self.raw_spans(line)
    }

    fn raw_spans(&self, line: &str) -> Vec<String> {
        match &self.predicate {
            LinePredicate::Literal { needle, ignore_case } => {
                if needle.is_empty() {
                    return vec![String::new()];
                }
                if *ignore_case {
                    folded_spans(line, needle)
                } else {
                    line.matches(needle.as_str()).map(str::to_string).collect()
                }
            }
            LinePredicate::Words { words: wanted, ignore_case } => {
                word_spans(line, wanted, *ignore_case)
            }
            LinePredicate::Pattern(regex) => regex
                .find_iter(line)
                .map(|m| m.as_str().to_string())
                .collect(),
            LinePredicate::AnyTerm(TermMatcher::Pattern(regex)) => regex
                .find_iter(line)
                .map(|m| m.as_str().to_string())
                .collect(),
            LinePredicate::AnyTerm(TermMatcher::Terms(terms)) => {
                let mut found: Vec<(usize, String)> = terms
                    .iter()
                    .flat_map(|term| folded_positions(line, &fold(term)))
                    .collect();
                found.sort_by_key(|(pos, _)| *pos);
                found.into_iter().map(|(_, text)| text).collect()
            }
        }
    }
}

/// Case-insensitive occurrences of an already folded needle, as the
/// original text
fn folded_spans(line: &str, needle: &str) -> Vec<String> {
    folded_positions(line, needle)
        .into_iter()
        .map(|(_, text)| text)
        .collect()
}

fn folded_positions(line: &str, needle: &str) -> Vec<(usize, String)> {
    if needle.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = line.chars().collect();
    let folded = fold(line);
    let width = needle.chars().count();
    folded
        .match_indices(needle)
        .map(|(byte, _)| {
            let start = folded[..byte].chars().count();
            (start, chars[start..start + width].iter().collect())
        })
        .collect()
}

/// Words of `text` as `(start byte, end byte, word)`
fn words(text: &str) -> Vec<(usize, usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        let is_word = c.is_alphanumeric() || c == '_';
        match (is_word, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                out.push((s, i, &text[s..i]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, text.len(), &text[s..]));
    }
    out
}

fn word_spans(line: &str, wanted: &[String], ignore_case: bool) -> Vec<String> {
    if wanted.is_empty() {
        return Vec::new();
    }
    let tokens = words(line);
    let mut spans = Vec::new();
    let mut i = 0;
    while i + wanted.len() <= tokens.len() {
        let window = &tokens[i..i + wanted.len()];
        let hit = window.iter().zip(wanted).all(|((_, _, word), want)| {
            if ignore_case {
                fold(word) == *want
            } else {
                word == want
            }
        });
        if hit {
            let start = window[0].0;
            let end = window[window.len() - 1].1;
            spans.push(line[start..end].to_string());
            i += wanted.len();
        } else {
            i += 1;
        }
    }
    spans
}

/// Which shape the collected lines are reported in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Lines,
    Count,
    Files,
}

/// Whether `max_count` caps the whole scan or each record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaxCountScope {
    #[default]
    Global,
    PerRecord,
}

/// How matched lines are collected
#[derive(Debug, Clone, Copy, Default)]
pub struct LineShape {
    pub output: OutputMode,
    pub before: usize,
    pub after: usize,
    pub only_matching: bool,
    pub max_count: Option<usize>,
    pub max_scope: MaxCountScope,
}

/// Accumulates matched lines across records
#[derive(Debug, Default)]
pub struct LineCollector {
    shape: LineShape,
    matches: Vec<GrepMatch>,
    per_record: BTreeMap<String, usize>,
    total: usize,
    truncated: bool,
}

impl LineCollector {
    pub fn new(shape: LineShape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    /// Match every line of `record`'s body, breaking once a global
    /// cap is reached
    pub fn visit(&mut self, record: &Record, matcher: &LineMatcher) -> ControlFlow<()> {
        let body = record.body();
        let short = shorthand::build(record.domain(), record.id())
            .unwrap_or_else(|_| format!("{}:{}", record.domain(), record.id()));
        let mut in_record = 0;

        for (index, line) in body.lines().enumerate() {
            if !matcher.is_match(line) {
                continue;
            }

            in_record += 1;
            self.total += 1;
            *self.per_record.entry(short.clone()).or_insert(0) += 1;

            let wanted = match self.shape.output {
                OutputMode::Lines => true,
                OutputMode::Files => in_record == 1,
                OutputMode::Count => false,
            };
            if wanted {
                let line_number = index + 1;
                let text = if self.shape.only_matching {
                    matcher.spans(line).join(" ")
                } else {
                    line.to_string()
                };
                let context = if self.shape.before > 0 || self.shape.after > 0 {
                    context_block(body, line_number, self.shape.before, self.shape.after)
                } else {
                    Vec::new()
                };

                self.matches.push(GrepMatch {
                    id: record.id().to_string(),
                    domain: record.domain().to_string(),
                    shorthand: short.clone(),
                    title: record.name().to_string(),
                    line_number,
                    text,
                    context,
                });
            }

            if let Some(max) = self.shape.max_count {
                match self.shape.max_scope {
                    MaxCountScope::Global if self.total >= max => {
                        self.truncated = true;
                        return ControlFlow::Break(());
                    }
                    MaxCountScope::PerRecord if in_record >= max => {
                        // Only a cap that actually hid a line counts as truncation
                        if body.lines().skip(index + 1).any(|rest| matcher.is_match(rest)) {
                            self.truncated = true;
                        }
                        return ControlFlow::Continue(());
                    }
                    _ => {}
                }
            }
        }

        ControlFlow::Continue(())
    }

    /// Whether a global cap has been reached
    pub fn is_full(&self) -> bool {
        self.shape.max_scope == MaxCountScope::Global
            && self.shape.max_count.is_some_and(|max| self.total >= max)
    }

    pub fn finish(self) -> (LineScanOutput, bool) {
        let output = match self.shape.output {
            OutputMode::Lines => LineScanOutput::Lines {
                matches: self.matches,
            },
            OutputMode::Count => LineScanOutput::Count {
                total: self.total,
                per_record: self.per_record,
            },
            OutputMode::Files => LineScanOutput::Files {
                files: self.matches,
            },
        };
        (output, self.truncated)
    }
}
