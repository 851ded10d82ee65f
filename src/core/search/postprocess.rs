//! Result post-processing.
//!
//! Shapes raw index hits into [`SearchResult`]s (snippets, match
//! counts, line numbers, context) and applies the filters the index
//! cannot express: minimum score and include/exclude patterns. The
//! text utilities here are shared with the grep/find/ripgrep views.
//!
//! All positions are character positions, so multi-byte content is
//! never split inside a code point.

use crate::core::domain::shorthand;
use crate::core::storage::RawHit;
use crate::core::types::{ContextLine, LineKind, SearchQuerySpec, SearchResult, SortBy, SortOrder};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Marker added where a snippet cuts content
pub const ELLIPSIS: &str = "...";

/// Lower-case one char to exactly one char; chars whose lower-case
/// form expands are kept as-is so positions stay aligned
fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Case-fold a string char-for-char
pub fn fold(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn char_index(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}

/// How query terms are located in content
#[derive(Debug, Clone)]
pub enum TermMatcher {
    /// Case-insensitive substrings
    Terms(Vec<String>),
    /// A compiled pattern (regex and wildcard modes)
    Pattern(Regex),
}

impl TermMatcher {
    /// Build a substring matcher, folding and de-duplicating terms
    pub fn terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let terms = terms
            .into_iter()
            .map(|t| fold(t.as_ref()))
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        TermMatcher::Terms(terms)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TermMatcher::Terms(terms) if terms.is_empty())
    }

    /// Earliest match as `(char position, char length)`
    pub fn first_match(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            TermMatcher::Terms(terms) => {
                let folded = fold(text);
                terms
                    .iter()
                    .filter_map(|term| {
                        let term = fold(term);
                        folded
                            .find(&term)
                            .map(|b| (char_index(&folded, b), term.chars().count()))
                    })
                    .min_by_key(|(pos, _)| *pos)
            }
            TermMatcher::Pattern(regex) => regex
                .find(text)
                .map(|m| (char_index(text, m.start()), m.as_str().chars().count())),
        }
    }

    /// Raw occurrence count; each term counts its non-overlapping
    /// substring occurrences, partial words included
    pub fn count(&self, text: &str) -> usize {
        match self {
            TermMatcher::Terms(terms) => {
                let folded = fold(text);
                terms
                    .iter()
                    .map(|term| folded.matches(fold(term).as_str()).count())
                    .sum()
            }
            TermMatcher::Pattern(regex) => regex.find_iter(text).count(),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            TermMatcher::Terms(terms) => {
                let folded = fold(text);
                terms.iter().any(|term| folded.contains(fold(term).as_str()))
            }
            TermMatcher::Pattern(regex) => regex.is_match(text),
        }
    }
}

/// Window of `length` chars around the earliest match.
///
/// Content no longer than `length` is returned whole. Otherwise the
/// window starts a quarter-window before the match (clamped to the
/// content) and is marked with an ellipsis on each cut side. Without a
/// match the content is truncated from the start.
pub fn snippet(content: &str, matcher: &TermMatcher, length: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    if length == 0 || chars.len() <= length {
        return content.to_string();
    }

    let max_start = chars.len() - length;
    let start = match matcher.first_match(content) {
        Some((pos, _)) => pos.saturating_sub(length / 4).min(max_start),
        None => 0,
    };
    let end = start + length;

    let mut out = String::with_capacity(length + 2 * ELLIPSIS.len());
    if start > 0 {
        out.push_str(ELLIPSIS);
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str(ELLIPSIS);
    }
    out
}

/// 1-based numbers of lines containing any query term
pub fn line_numbers(content: &str, matcher: &TermMatcher) -> Vec<usize> {
    if matcher.is_empty() {
        return Vec::new();
    }
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| matcher.is_match(line))
        .map(|(i, _)| i + 1)
        .collect()
}

/// Lines `[line - before, line + after]` around one matching line,
/// clipped to the content and tagged before/match/after
pub fn context_block(content: &str, line: usize, before: usize, after: usize) -> Vec<ContextLine> {
    let lines: Vec<&str> = content.lines().collect();
    if line == 0 || line > lines.len() {
        return Vec::new();
    }

    let first = line.saturating_sub(before).max(1);
    let last = (line + after).min(lines.len());
    (first..=last)
        .map(|n| ContextLine {
            line_number: n,
            text: lines[n - 1].to_string(),
            kind: match n.cmp(&line) {
                Ordering::Less => LineKind::Before,
                Ordering::Equal => LineKind::Match,
                Ordering::Greater => LineKind::After,
            },
        })
        .collect()
}

/// Union of the context blocks of every matching line, in line order.
/// A non-matching line following a match within `radius` is `After`;
/// anything else is `Before`.
pub fn context_lines(content: &str, matches: &[usize], radius: usize) -> Vec<ContextLine> {
    if matches.is_empty() || radius == 0 {
        return Vec::new();
    }
    let lines: Vec<&str> = content.lines().collect();
    let match_set: BTreeSet<usize> = matches.iter().copied().collect();

    let mut wanted = BTreeSet::new();
    for &m in matches {
        let first = m.saturating_sub(radius).max(1);
        let last = (m + radius).min(lines.len());
        wanted.extend(first..=last);
    }

    wanted
        .into_iter()
        .filter(|n| *n >= 1 && *n <= lines.len())
        .map(|n| {
            let kind = if match_set.contains(&n) {
                LineKind::Match
            } else if match_set.range(n.saturating_sub(radius)..n).next().is_some() {
                LineKind::After
            } else {
                LineKind::Before
            };
            ContextLine {
                line_number: n,
                text: lines[n - 1].to_string(),
                kind,
            }
        })
        .collect()
}

/// Include/exclude pattern: regex first, case-insensitive substring
/// when the pattern does not compile
#[derive(Debug, Clone)]
pub enum PatternFilter {
    Regex(Regex),
    Substring(String),
}

impl PatternFilter {
    pub fn new(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => PatternFilter::Regex(regex),
            Err(e) => {
                warn!(
                    pattern,
                    error = %e,
                    "Filter pattern is not a valid regex, using substring match"
                );
                PatternFilter::Substring(fold(pattern))
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            PatternFilter::Regex(regex) => regex.is_match(text),
            PatternFilter::Substring(needle) => fold(text).contains(needle.as_str()),
        }
    }
}

/// Shaping parameters resolved by the orchestrator
#[derive(Debug, Clone, Copy)]
pub struct ShapeOptions {
    pub snippet_length: usize,
    pub context_lines: usize,
}

/// Shape one raw hit
pub fn shape_hit(hit: RawHit, matcher: &TermMatcher, options: ShapeOptions) -> SearchResult {
    let lines = line_numbers(&hit.content, matcher);
    let context = context_lines(&hit.content, &lines, options.context_lines);

    let mut field_match_counts = BTreeMap::new();
    field_match_counts.insert("title".to_string(), matcher.count(&hit.title));
    field_match_counts.insert("content".to_string(), matcher.count(&hit.content));
    field_match_counts.insert("tags".to_string(), matcher.count(&hit.tags.join(" ")));

    let shorthand = shorthand::build(&hit.domain, &hit.id)
        .unwrap_or_else(|_| format!("{}:{}", hit.domain, hit.id));

    SearchResult {
        snippet: snippet(&hit.content, matcher, options.snippet_length),
        match_count: matcher.count(&hit.content),
        line_numbers: lines,
        context_lines: context,
        field_match_counts,
        shorthand,
        score: hit.score,
        kind: hit.kind,
        highlights: hit.highlights,
        tags: hit.tags,
        content_type: hit.content_type,
        created_at: hit.created_at,
        updated_at: hit.updated_at,
        id: hit.id,
        domain: hit.domain,
        title: hit.title,
        content: hit.content,
    }
}

/// Drop results below `min_score`, results matching no include
/// pattern (when any are given) and results matching an exclude pattern
pub fn apply_filters(results: Vec<SearchResult>, spec: &SearchQuerySpec) -> Vec<SearchResult> {
    let include: Vec<PatternFilter> = spec
        .include_patterns
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| PatternFilter::new(p))
        .collect();
    let exclude: Vec<PatternFilter> = spec
        .exclude_patterns
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| PatternFilter::new(p))
        .collect();

    results
        .into_iter()
        .filter(|r| spec.min_score.map_or(true, |min| r.score >= min))
        .filter(|r| include.is_empty() || include.iter().any(|f| f.is_match(&r.content)))
        .filter(|r| !exclude.iter().any(|f| f.is_match(&r.content)))
        .collect()
}

/// Stable re-sort by the requested key and order
pub fn sort_results(results: &mut [SearchResult], by: SortBy, order: SortOrder) {
    let compare = |a: &SearchResult, b: &SearchResult| -> Ordering {
        match by {
            SortBy::Relevance => a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal),
            SortBy::Date => a.updated_at.cmp(&b.updated_at),
            SortBy::Created => a.created_at.cmp(&b.created_at),
            SortBy::Title => fold(&a.title).cmp(&fold(&b.title)),
            SortBy::Type => a.kind.as_str().cmp(b.kind.as_str()),
        }
    };

    match order {
        SortOrder::Asc => results.sort_by(compare),
        SortOrder::Desc => results.sort_by(|a, b| compare(b, a)),
    }
}

/// Shape, filter and sort a page of hits
pub fn process(
    hits: Vec<RawHit>,
    matcher: &TermMatcher,
    spec: &SearchQuerySpec,
    options: ShapeOptions,
) -> Vec<SearchResult> {
    let shaped = hits
        .into_iter()
        .map(|hit| shape_hit(hit, matcher, options))
        .collect();
    let mut results = apply_filters(shaped, spec);
    sort_results(&mut results, spec.sort_by, spec.sort_order);
    results
}
