//! Query compiler.
//!
//! Turns a [`SearchQuerySpec`] into an [`ExecutableQuery`] for the
//! Tantivy index. Mode selection is a two-step affair: the spec is
//! first resolved into a [`QueryPlan`] (one variant per mode, with
//! smart detection applied), then each plan variant is lowered by its
//! own builder. Filters are ANDed on top of whatever the plan yields.

use crate::core::error::{QuiverError, Result};
use crate::core::search::postprocess::TermMatcher;
use crate::core::storage::{IndexFields, RawHit};
use crate::core::types::{SearchMode, SearchQuerySpec};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, EmptyQuery, FuzzyTermQuery, Occur, PhraseQuery, Query,
    RegexQuery, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::Term;
use tracing::debug;

/// Relative weights for the default multi-field query
pub const TITLE_BOOST: f32 = 3.0;
pub const TAGS_BOOST: f32 = 2.0;
pub const SEARCH_TERMS_BOOST: f32 = 2.0;
pub const CONTENT_BOOST: f32 = 1.0;

/// Weights of the two halves of a semantic term
const SEMANTIC_EXACT_BOOST: f32 = 2.0;
const SEMANTIC_FUZZY_BOOST: f32 = 0.5;

/// Smart mode switches to semantic above this many terms
const SEMANTIC_TERM_THRESHOLD: usize = 3;

/// Tokens longer than this are dropped, as the index tokenizer does
const MAX_TOKEN_BYTES: usize = 40;

/// Valid values for `fields`
pub const VALID_FIELDS: &[&str] = &["title", "content", "tags", "search_terms"];

/// Split text the way the index tokenizer does, keeping case
pub fn tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && t.len() <= MAX_TOKEN_BYTES)
        .collect()
}

/// Split and lower-case text the way the index tokenizer does
pub fn analyze(text: &str) -> Vec<String> {
    tokens(text).into_iter().map(str::to_lowercase).collect()
}

/// Edit distance tolerated for a fuzzy term
pub fn fuzzy_distance(term: &str) -> u8 {
    if term.chars().count() <= 4 {
        1
    } else {
        2
    }
}

/// Smart-mode detection, in priority order: wildcard, regex, fuzzy,
/// semantic. `SearchMode::Smart` means "use the default boosted query".
pub fn detect_mode(text: &str) -> SearchMode {
    let text = text.trim();
    if text.contains('*') || text.contains('?') {
        SearchMode::Wildcard
    } else if is_delimited_regex(text) {
        SearchMode::Regex
    } else if text.ends_with('~') {
        SearchMode::Fuzzy
    } else if text.split_whitespace().count() > SEMANTIC_TERM_THRESHOLD {
        SearchMode::Semantic
    } else {
        SearchMode::Smart
    }
}

fn is_delimited_regex(text: &str) -> bool {
    text.len() > 2 && text.starts_with('/') && text.ends_with('/')
}

fn strip_regex_delimiters(text: &str) -> &str {
    if is_delimited_regex(text) {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Mode-resolved description of what to run
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// Empty text
    MatchAll,
    /// Boosted multi-field match
    Default { terms: Vec<String> },
    Exact { terms: Vec<String>, phrase: String },
    Fuzzy { terms: Vec<String> },
    Regex { pattern: String },
    Wildcard { globs: Vec<String> },
    /// `minimum` is `floor(terms / 2)`; zero disables the constraint
    Semantic { terms: Vec<String>, minimum: usize },
}

impl QueryPlan {
    /// Resolve the spec's mode (running smart detection if needed)
    pub fn from_spec(spec: &SearchQuerySpec) -> Self {
        let text = spec.raw_text.trim();
        if text.is_empty() {
            return QueryPlan::MatchAll;
        }

        let mode = match spec.mode {
            SearchMode::Smart => detect_mode(text),
            other => other,
        };

        match mode {
            SearchMode::Smart => QueryPlan::Default {
                terms: analyze(text),
            },
            SearchMode::Exact => QueryPlan::Exact {
                terms: analyze(text),
                phrase: text.to_string(),
            },
            SearchMode::Fuzzy => QueryPlan::Fuzzy {
                terms: analyze(text.trim_end_matches('~')),
            },
            SearchMode::Regex => QueryPlan::Regex {
                pattern: strip_regex_delimiters(text).to_string(),
            },
            SearchMode::Wildcard => QueryPlan::Wildcard {
                globs: text.split_whitespace().map(str::to_string).collect(),
            },
            SearchMode::Semantic => {
                let terms = analyze(text);
                let minimum = terms.len() / 2;
                QueryPlan::Semantic { terms, minimum }
            }
        }
    }

    /// Mode reported back to callers
    pub fn mode(&self) -> SearchMode {
        match self {
            QueryPlan::MatchAll | QueryPlan::Default { .. } => SearchMode::Smart,
            QueryPlan::Exact { .. } => SearchMode::Exact,
            QueryPlan::Fuzzy { .. } => SearchMode::Fuzzy,
            QueryPlan::Regex { .. } => SearchMode::Regex,
            QueryPlan::Wildcard { .. } => SearchMode::Wildcard,
            QueryPlan::Semantic { .. } => SearchMode::Semantic,
        }
    }
}

/// In-process check applied to index candidates the index cannot
/// decide on its own
#[derive(Debug, Clone)]
pub enum Verifier {
    /// Title or content must match the pattern
    Pattern(Regex),
    /// At least `minimum` of `terms` must match a token exactly or
    /// within its fuzzy distance
    MinimumTerms { terms: Vec<String>, minimum: usize },
}

impl Verifier {
    pub fn accepts(&self, hit: &RawHit) -> bool {
        match self {
            Verifier::Pattern(regex) => regex.is_match(&hit.title) || regex.is_match(&hit.content),
            Verifier::MinimumTerms { terms, minimum } => {
                let mut haystack: BTreeSet<String> = analyze(&hit.title).into_iter().collect();
                haystack.extend(analyze(&hit.content));
                for tag in &hit.tags {
                    haystack.extend(analyze(tag));
                }
                let satisfied = terms
                    .iter()
                    .filter(|term| {
                        let max = fuzzy_distance(term) as usize;
                        haystack.contains(*term)
                            || haystack.iter().any(|token| edit_distance(term, token) <= max)
                    })
                    .count();
                satisfied >= *minimum
            }
        }
    }
}

/// Optimal string alignment distance (adjacent transpositions cost one)
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let width = b.len() + 1;
    let mut d = vec![0usize; (a.len() + 1) * width];
    for i in 0..=a.len() {
        d[i * width] = i;
    }
    for j in 0..=b.len() {
        d[j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[(i - 1) * width + j] + 1)
                .min(d[i * width + j - 1] + 1)
                .min(d[(i - 1) * width + j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[(i - 2) * width + j - 2] + 1);
            }
            d[i * width + j] = best;
        }
    }
    d[a.len() * width + b.len()]
}

/// Clamped paging passed through to the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

/// Compiled query ready for the index
#[derive(Debug)]
pub struct ExecutableQuery {
    /// Mode actually used
    pub mode: SearchMode,
    pub query: Box<dyn Query>,
    pub verifier: Option<Verifier>,
    /// How the post-processor finds query terms in content
    pub matcher: TermMatcher,
    pub page: Page,
    pub highlight: bool,
}

impl ExecutableQuery {
    pub fn accepts(&self, hit: &RawHit) -> bool {
        self.verifier.as_ref().map_or(true, |v| v.accepts(hit))
    }
}

/// Builds executable queries against a fixed schema
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler {
    fields: IndexFields,
}

impl QueryCompiler {
    pub fn new(fields: IndexFields) -> Self {
        Self { fields }
    }

    /// Compile `spec`, restricting hits to `scope` when given
    pub fn compile(
        &self,
        spec: &SearchQuerySpec,
        scope: Option<&BTreeSet<String>>,
        page: Page,
    ) -> Result<ExecutableQuery> {
        let fields = self.text_fields(&spec.fields)?;
        let plan = QueryPlan::from_spec(spec);
        debug!(mode = %plan.mode(), ?page, "Compiling query");

        let (base, verifier, matcher) = match &plan {
            QueryPlan::MatchAll => (
                Box::new(AllQuery) as Box<dyn Query>,
                None,
                TermMatcher::Terms(Vec::new()),
            ),
            QueryPlan::Default { terms } => (
                self.default_query(terms, &fields),
                case_verifier(spec, &tokens(&spec.raw_text))?,
                TermMatcher::Terms(terms.clone()),
            ),
            QueryPlan::Exact { terms, phrase } => (
                self.exact_query(terms, &fields),
                case_verifier(spec, &[phrase.as_str()])?,
                TermMatcher::Terms(terms.clone()),
            ),
            QueryPlan::Fuzzy { terms } => (
                self.fuzzy_query(terms, &fields),
                None,
                TermMatcher::Terms(terms.clone()),
            ),
            QueryPlan::Regex { pattern } => {
                let regex = compile_regex(pattern, spec)?;
                (
                    Box::new(AllQuery) as Box<dyn Query>,
                    Some(Verifier::Pattern(regex.clone())),
                    TermMatcher::Pattern(regex),
                )
            }
            QueryPlan::Wildcard { globs } => (
                self.wildcard_query(globs, &fields)?,
                None,
                TermMatcher::Pattern(glob_matcher(globs)?),
            ),
            QueryPlan::Semantic { terms, minimum } => (
                self.semantic_query(terms, &fields),
                (*minimum > 0).then(|| Verifier::MinimumTerms {
                    terms: terms.clone(),
                    minimum: *minimum,
                }),
                TermMatcher::Terms(terms.clone()),
            ),
        };

        let query = self.apply_filters(base, spec, scope);

        Ok(ExecutableQuery {
            mode: plan.mode(),
            query,
            verifier,
            matcher,
            page,
            highlight: spec.highlight,
        })
    }

    /// Full-text fields (with their default boost) selected by `names`
    fn text_fields(&self, names: &[String]) -> Result<Vec<(Field, f32)>> {
        let all = [
            (self.fields.title, TITLE_BOOST),
            (self.fields.tags, TAGS_BOOST),
            (self.fields.search_terms, SEARCH_TERMS_BOOST),
            (self.fields.content, CONTENT_BOOST),
        ];
        if names.is_empty() {
            return Ok(all.to_vec());
        }

        let mut selected = Vec::new();
        for name in names {
            let entry = match name.trim().to_lowercase().as_str() {
                "title" | "name" => all[0],
                "tags" | "tag" => all[1],
                "search_terms" | "searchterms" | "description" => all[2],
                "content" | "body" | "template" => all[3],
                other => {
                    return Err(QuiverError::InvalidArgument(format!(
                        "unknown search field '{other}'. Valid fields: {}",
                        VALID_FIELDS.join(", ")
                    )))
                }
            };
            if !selected.contains(&entry) {
                selected.push(entry);
            }
        }
        Ok(selected)
    }

    fn default_query(&self, terms: &[String], fields: &[(Field, f32)]) -> Box<dyn Query> {
        let per_field = fields
            .iter()
            .map(|(field, boost)| {
                let matches = terms.iter().map(|t| term_query(*field, t)).collect();
                Box::new(BoostQuery::new(union(matches), *boost)) as Box<dyn Query>
            })
            .collect();
        union(per_field)
    }

    fn exact_query(&self, terms: &[String], fields: &[(Field, f32)]) -> Box<dyn Query> {
        if terms.is_empty() {
            return Box::new(EmptyQuery);
        }
        let per_field = fields
            .iter()
            .map(|(field, _)| {
                if terms.len() == 1 {
                    term_query(*field, &terms[0])
                } else {
                    let phrase = terms
                        .iter()
                        .map(|t| Term::from_field_text(*field, t))
                        .collect();
                    Box::new(PhraseQuery::new(phrase)) as Box<dyn Query>
                }
            })
            .collect();
        union(per_field)
    }

    fn fuzzy_query(&self, terms: &[String], fields: &[(Field, f32)]) -> Box<dyn Query> {
        let clauses = terms
            .iter()
            .flat_map(|term| fields.iter().map(move |(field, _)| fuzzy_term(*field, term)))
            .collect();
        union(clauses)
    }

    fn semantic_query(&self, terms: &[String], fields: &[(Field, f32)]) -> Box<dyn Query> {
        let per_term = terms
            .iter()
            .map(|term| {
                let exact = fields.iter().map(|(f, _)| term_query(*f, term)).collect();
                let fuzzy = fields.iter().map(|(f, _)| fuzzy_term(*f, term)).collect();
                union(vec![
                    Box::new(BoostQuery::new(union(exact), SEMANTIC_EXACT_BOOST)) as Box<dyn Query>,
                    Box::new(BoostQuery::new(union(fuzzy), SEMANTIC_FUZZY_BOOST)),
                ])
            })
            .collect();
        union(per_term)
    }

    /// Every glob must match some token in one of the fields
    fn wildcard_query(&self, globs: &[String], fields: &[(Field, f32)]) -> Result<Box<dyn Query>> {
        let mut required: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for glob in globs {
            let Some(pattern) = glob_to_term_regex(glob) else {
                continue;
            };
            let mut alternatives = Vec::new();
            for (field, _) in fields {
                let query = RegexQuery::from_pattern(&pattern, *field)
                    .map_err(|e| QuiverError::pattern(glob, e))?;
                alternatives.push(Box::new(query) as Box<dyn Query>);
            }
            required.push((Occur::Must, union(alternatives)));
        }

        Ok(match required.len() {
            0 => Box::new(EmptyQuery),
            1 => required.remove(0).1,
            _ => Box::new(BooleanQuery::new(required)),
        })
    }

    /// AND type/tag/content-type/scope filters onto `base`; filters
    /// carry no score of their own
    fn apply_filters(
        &self,
        base: Box<dyn Query>,
        spec: &SearchQuerySpec,
        scope: Option<&BTreeSet<String>>,
    ) -> Box<dyn Query> {
        let mut filters: Vec<Box<dyn Query>> = Vec::new();

        if let Some(kind) = spec.type_filter {
            filters.push(term_query(self.fields.doc_type, kind.as_str()));
        }

        let tags: Vec<String> = spec
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            filters.push(union(
                tags.iter().map(|t| term_query(self.fields.tag, t)).collect(),
            ));
        }

        if let Some(content_type) = spec.content_type.as_deref().filter(|c| !c.is_empty()) {
            filters.push(term_query(
                self.fields.content_type,
                &content_type.to_lowercase(),
            ));
        }

        if let Some(scope) = scope {
            filters.push(union(
                scope
                    .iter()
                    .map(|d| term_query(self.fields.domain, d))
                    .collect(),
            ));
        }

        if filters.is_empty() {
            return base;
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, base)];
        for filter in filters {
            clauses.push((Occur::Must, Box::new(BoostQuery::new(filter, 0.0))));
        }
        Box::new(BooleanQuery::new(clauses))
    }
}

fn term_query(field: Field, text: &str) -> Box<dyn Query> {
    Box::new(TermQuery::new(
        Term::from_field_text(field, text),
        IndexRecordOption::WithFreqs,
    ))
}

fn fuzzy_term(field: Field, text: &str) -> Box<dyn Query> {
    Box::new(FuzzyTermQuery::new(
        Term::from_field_text(field, text),
        fuzzy_distance(text),
        true,
    ))
}

/// OR together; an empty union matches nothing
fn union(mut clauses: Vec<Box<dyn Query>>) -> Box<dyn Query> {
    match clauses.len() {
        0 => Box::new(EmptyQuery),
        1 => clauses.remove(0),
        _ => Box::new(BooleanQuery::new(
            clauses.into_iter().map(|q| (Occur::Should, q)).collect(),
        )),
    }
}

/// Build the user regex with the spec's flags; failure is a hard error
fn compile_regex(pattern: &str, spec: &SearchQuerySpec) -> Result<Regex> {
    let source = if spec.whole_words {
        format!(r"\b(?:{pattern})\b")
    } else {
        pattern.to_string()
    };
    RegexBuilder::new(&source)
        .case_insensitive(!spec.case_sensitive)
        .multi_line(spec.multiline)
        .dot_matches_new_line(spec.multiline)
        .build()
        .map_err(|e| QuiverError::pattern(pattern, e))
}

/// The index is lower-cased, so case-sensitive text modes verify the
/// original spelling in-process
fn case_verifier(spec: &SearchQuerySpec, needles: &[&str]) -> Result<Option<Verifier>> {
    if !spec.case_sensitive || needles.is_empty() {
        return Ok(None);
    }
    let alternation = needles
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");
    let regex = Regex::new(&alternation).map_err(|e| QuiverError::pattern(&alternation, e))?;
    Ok(Some(Verifier::Pattern(regex)))
}

/// Glob to a whole-term regex over lower-cased index tokens.
/// Separator characters are dropped since the tokenizer splits on them.
fn glob_to_term_regex(glob: &str) -> Option<String> {
    let mut pattern = String::new();
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c if c.is_alphanumeric() => pattern.extend(c.to_lowercase()),
            _ => {}
        }
    }
    (!pattern.is_empty()).then_some(pattern)
}

/// Glob to an unanchored, case-insensitive regex over content text
fn glob_matcher(globs: &[String]) -> Result<Regex> {
    let alternatives: Vec<String> = globs
        .iter()
        .map(|glob| {
            let mut pattern = String::new();
            for c in glob.chars() {
                match c {
                    '*' => pattern.push_str(r"\w*"),
                    '?' => pattern.push_str(r"\w"),
                    c => pattern.push_str(&regex::escape(&c.to_string())),
                }
            }
            pattern
        })
        .collect();
    let source = format!("(?i){}", alternatives.join("|"));
    Regex::new(&source).map_err(|e| QuiverError::pattern(&globs.join(" "), e))
}
