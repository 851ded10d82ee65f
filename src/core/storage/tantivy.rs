//! Tantivy integration for BM25 full-text search.
//!
//! This module wraps the in-RAM Tantivy index that mirrors the record
//! store. Every record becomes one document addressed by a unique
//! `key` term, so re-indexing replaces instead of duplicating.

use crate::core::error::{QuiverError, Result};
use crate::core::storage::store::RecordKey;
use crate::core::types::{Record, RecordKind};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Mutex;
use tantivy::collector::TopDocs;
use tantivy::query::Query;
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::snippet::SnippetGenerator;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::debug;

/// Writer heap budget
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Maximum characters per highlighted fragment
const HIGHLIGHT_CHARS: usize = 150;

/// Handles to every schema field
#[derive(Debug, Clone, Copy)]
pub struct IndexFields {
    /// Unique per record (STRING)
    pub key: Field,
    pub id: Field,
    pub domain: Field,
    pub doc_type: Field,
    /// Raw lower-cased tags (STRING, multi-valued)
    pub tag: Field,
    pub content_type: Field,
    pub title: Field,
    pub content: Field,
    /// Tags joined for full-text matching
    pub tags: Field,
    /// Description, id parts and content type
    pub search_terms: Field,
    pub created_at: Field,
    pub updated_at: Field,
}

/// Create the Tantivy schema for record indexing
///
/// Fields:
/// - key, id, domain, doc_type, tag, content_type: exact-match (STRING | STORED)
/// - title, content, tags, search_terms: full-text (TEXT | STORED)
/// - created_at, updated_at: millisecond timestamps (i64 | STORED)
pub fn create_schema() -> (Schema, IndexFields) {
    let mut builder = Schema::builder();

    let key = builder.add_text_field("key", STRING | STORED);
    let id = builder.add_text_field("id", STRING | STORED);
    let domain = builder.add_text_field("domain", STRING | STORED);
    let doc_type = builder.add_text_field("doc_type", STRING | STORED);
    let tag = builder.add_text_field("tag", STRING | STORED);
    let content_type = builder.add_text_field("content_type", STRING | STORED);

    let title = builder.add_text_field("title", TEXT | STORED);
    let content = builder.add_text_field("content", TEXT | STORED);
    let tags = builder.add_text_field("tags", TEXT | STORED);
    let search_terms = builder.add_text_field("search_terms", TEXT);

    let created_at = builder.add_i64_field("created_at", STORED);
    let updated_at = builder.add_i64_field("updated_at", STORED);

    let fields = IndexFields {
        key,
        id,
        domain,
        doc_type,
        tag,
        content_type,
        title,
        content,
        tags,
        search_terms,
        created_at,
        updated_at,
    };
    (builder.build(), fields)
}

/// Hit returned by the index, carrying the stored fields
#[derive(Debug, Clone)]
pub struct RawHit {
    pub key: String,
    pub id: String,
    pub domain: String,
    pub kind: RecordKind,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub score: f32,
    /// Highlighted fragments (HTML `<b>` markup)
    pub highlights: Vec<String>,
}

/// Paging window for one execution
#[derive(Debug, Clone, Copy)]
pub struct HitWindow {
    pub limit: usize,
    pub offset: usize,
    /// Candidates inspected when hits need to be accepted one by one
    pub max_candidates: usize,
}

/// Tantivy index wrapper
pub struct QuiverIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: IndexFields,
}

impl std::fmt::Debug for QuiverIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuiverIndex")
            .field("schema", &"<schema>")
            .finish()
    }
}

impl QuiverIndex {
    /// Create an empty in-RAM index
    pub fn in_ram() -> Result<Self> {
        let (schema, fields) = create_schema();
        let index = Index::create_in_ram(schema);

        let writer = index
            .writer(WRITER_HEAP_BYTES)
            .map_err(|e| QuiverError::index("Failed to create writer", e))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| QuiverError::index("Failed to create reader", e))?;

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            fields,
        })
    }

    pub fn fields(&self) -> &IndexFields {
        &self.fields
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, IndexWriter>> {
        self.writer
            .lock()
            .map_err(|_| QuiverError::StorageError("index writer lock poisoned".into()))
    }

    fn build_document(&self, record: &Record) -> TantivyDocument {
        let f = &self.fields;
        let mut doc = TantivyDocument::default();

        doc.add_text(f.key, RecordKey::of(record).as_term());
        doc.add_text(f.id, record.id());
        doc.add_text(f.domain, record.domain());
        doc.add_text(f.doc_type, record.kind().as_str());
        for tag in record.tags() {
            doc.add_text(f.tag, tag.to_lowercase());
        }
        if let Some(content_type) = record.content_type() {
            doc.add_text(f.content_type, content_type.to_lowercase());
        }

        doc.add_text(f.title, record.name());
        doc.add_text(f.content, record.body());
        // One value per tag so tags with spaces survive the round trip
        for tag in record.tags() {
            doc.add_text(f.tags, tag);
        }
        doc.add_text(f.search_terms, derive_search_terms(record));

        doc.add_i64(f.created_at, record.created_at().timestamp_millis());
        doc.add_i64(f.updated_at, record.updated_at().timestamp_millis());
        doc
    }

    fn commit(&self, writer: &mut IndexWriter) -> Result<()> {
        writer
            .commit()
            .map_err(|e| QuiverError::index("Failed to commit", e))?;
        self.reader
            .reload()
            .map_err(|e| QuiverError::index("Failed to reload reader", e))?;
        Ok(())
    }

    /// Index (or re-index) a single record
    pub fn index_document(&self, record: &Record) -> Result<()> {
        self.index_batch(std::slice::from_ref(record))
    }

    /// Index a batch of records with a single commit
    pub fn index_batch(&self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut writer = self.writer()?;
        for record in records {
            let key = RecordKey::of(record).as_term();
            writer.delete_term(Term::from_field_text(self.fields.key, &key));
            writer
                .add_document(self.build_document(record))
                .map_err(|e| QuiverError::index("Failed to add document", e))?;
        }
        self.commit(&mut writer)?;
        debug!(count = records.len(), "Indexed records");
        Ok(())
    }

    /// Remove the documents for the given records
    pub fn delete_documents(&self, keys: &[RecordKey]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut writer = self.writer()?;
        for key in keys {
            writer.delete_term(Term::from_field_text(self.fields.key, &key.as_term()));
        }
        self.commit(&mut writer)
    }

    pub fn delete_document(&self, key: &RecordKey) -> Result<()> {
        self.delete_documents(std::slice::from_ref(key))
    }

    /// Number of live documents
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Execute a compiled query.
    ///
    /// Without `accept`, paging is delegated to the collector. With it,
    /// up to `max_candidates` hits are pulled, filtered through `accept`
    /// and paged afterwards. Highlights are only computed for the page.
    pub fn execute(
        &self,
        query: &dyn Query,
        window: HitWindow,
        highlight: bool,
        accept: Option<&dyn Fn(&RawHit) -> bool>,
    ) -> Result<Vec<RawHit>> {
        let searcher = self.reader.searcher();

        let collector = match accept {
            Some(_) => TopDocs::with_limit(window.max_candidates.max(1)),
            None => TopDocs::with_limit(window.limit.max(1)).and_offset(window.offset),
        };
        let top_docs = searcher
            .search(query, &collector)
            .map_err(|e| QuiverError::index("Search failed", e))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        let mut docs = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| QuiverError::index("Failed to retrieve document", e))?;
            let hit = self.to_hit(&doc, score);
            if accept.map_or(true, |accept| accept(&hit)) {
                hits.push(hit);
                docs.push(doc);
            }
        }

        let (mut hits, docs): (Vec<RawHit>, Vec<TantivyDocument>) = match accept {
            Some(_) => hits
                .into_iter()
                .zip(docs)
                .skip(window.offset)
                .take(window.limit)
                .unzip(),
            None => (hits, docs),
        };

        if highlight && !hits.is_empty() {
            let mut generators = Vec::new();
            for field in [self.fields.title, self.fields.content] {
                let mut generator = SnippetGenerator::create(&searcher, query, field)
                    .map_err(|e| QuiverError::index("Failed to create snippet generator", e))?;
                generator.set_max_num_chars(HIGHLIGHT_CHARS);
                generators.push(generator);
            }
            for (hit, doc) in hits.iter_mut().zip(&docs) {
                hit.highlights = generators
                    .iter()
                    .map(|g| g.snippet_from_doc(doc).to_html())
                    .filter(|html| html.contains("<b>"))
                    .collect();
            }
        }

        Ok(hits)
    }

    fn to_hit(&self, doc: &TantivyDocument, score: f32) -> RawHit {
        let f = &self.fields;
        let content_type = text(doc, f.content_type);
        RawHit {
            key: text(doc, f.key),
            id: text(doc, f.id),
            domain: text(doc, f.domain),
            kind: RecordKind::parse(&text(doc, f.doc_type)).unwrap_or(RecordKind::Resource),
            title: text(doc, f.title),
            content: text(doc, f.content),
            tags: all_text(doc, f.tags),
            content_type: (!content_type.is_empty()).then_some(content_type),
            created_at: millis(doc, f.created_at),
            updated_at: millis(doc, f.updated_at),
            score,
            highlights: Vec::new(),
        }
    }
}

/// Extra searchable text derived from a record
fn derive_search_terms(record: &Record) -> String {
    let id_parts = record
        .id()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut terms = vec![record.description().to_string(), id_parts];
    if let Some(content_type) = record.content_type() {
        terms.push(content_type.replace('/', " "));
    }
    terms.join(" ")
}

fn all_text(doc: &TantivyDocument, field: Field) -> Vec<String> {
    doc.get_all(field)
        .filter_map(|v| v.as_str())
        .map(str::to_string)
        .collect()
}

fn text(doc: &TantivyDocument, field: Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn millis(doc: &TantivyDocument, field: Field) -> DateTime<Utc> {
    let ms = doc.get_first(field).and_then(|v| v.as_i64()).unwrap_or(0);
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}
