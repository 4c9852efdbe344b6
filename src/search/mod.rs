//! Full-text search infrastructure for generated documentation.
//!
//! This module provides BM25 based search across document records,
//! including tokenization, index building, scoring, and query parsing.

// Module declarations
pub(crate) mod builder;
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use builder::IndexBuilder;
pub use index::{
    FIELDS, FieldSpec, FieldVector, INDEX_VERSION, MatchData, MatchMetadata, Postings, RawIndex,
    SNIPPET_FIELD, SearchHit, SearchIndex, TermEntry, TermVector, field_ref,
};
pub use query::{Clause, Presence, Query, apply_fuzziness, parse_query};
