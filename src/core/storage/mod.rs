//! Storage layer: the record store and its full-text index.
//!
//! # Architecture
//!
//! - **RecordStore**: owns resources and prompts, optionally persisted
//!   to `records.json`
//! - **QuiverIndex**: in-RAM Tantivy index mirroring the store, rebuilt
//!   at start-up
//!
//! # Data Directory Structure
//!
//! ```text
//! {data_dir}/
//! ├── domains.json    # Domain registry
//! └── records.json    # Resources and prompts
//! ```

mod store;
mod tantivy;

pub use self::store::{MalformedEntry, RecordKey, RecordStore};
pub use self::tantivy::{create_schema, HitWindow, IndexFields, QuiverIndex, RawHit};
