//! Error handling types and utilities.
//!
//! Build-time errors ([`DocumentError`], [`BuildError`]) abort the run. Runtime
//! errors ([`CompactLoadError`], [`QueryError`]) are recovered by the page
//! context and never reach the reader.

/// A specialized Result type for the binary and configuration boundary.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods.
pub type Result<T> = anyhow::Result<T>;

/// Input document stream could not be turned into validated records.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Input is not valid JSON or not an array of objects.
    #[error("input is not a JSON array of document records: {0}")]
    Json(#[from] serde_json::Error),
    /// A record violates the `{ref, doc, url, func}` shape.
    #[error("document {position} is invalid: {reason}")]
    Invalid { position: usize, reason: String },
    /// Two records share the same `ref`.
    #[error("document {position} repeats ref '{doc_ref}' (first seen at {first})")]
    DuplicateRef {
        position: usize,
        first: usize,
        doc_ref: String,
    },
}

/// Fatal failure while producing the serialized index payload.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Input documents were malformed.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] DocumentError),
    /// The raw index violates the builder/compactor contract.
    #[error("index consistency violation: {0}")]
    IndexConsistency(String),
    /// The payload could not be serialized.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A raw index failed the loader's structural checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid search index: {0}")]
pub struct IndexError(pub String);

/// The embedded compact index could not be parsed or validated.
///
/// Always recovered: the page rebuilds the index from the raw documents.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompactLoadError {
    /// Payload is not the expected JSON shape.
    #[error("compact index is malformed: {0}")]
    Malformed(String),
    /// A posting references a field vector that does not exist.
    #[error("posting for token '{token}' references missing field vector {vector}")]
    MissingVector { token: String, vector: usize },
    /// Field vector id does not belong to the field it is used for.
    #[error("field vector '{id}' does not belong to field '{field}'")]
    ForeignVector { id: String, field: String },
    /// Expanded index failed the loader's structural checks.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Query text could not be parsed or executed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unrecognised field '{field}', expected one of: {expected}")]
    UnknownField { field: String, expected: String },
    #[error("{modifier} modifier expects a number, found '{found}'")]
    InvalidModifier { modifier: &'static str, found: String },
    #[error("expected a term at clause '{clause}'")]
    MissingTerm { clause: String },
    #[error("invalid wildcard term '{term}': {reason}")]
    Wildcard { term: String, reason: String },
}

/// The page context could not be created at all.
///
/// Only raised when the documents themselves are unusable; a broken compact
/// index alone is recovered by rebuilding.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("embedded documents are unusable: {0}")]
    Documents(#[from] DocumentError),
    #[error("rebuilding the index from documents failed: {0}")]
    Rebuild(#[from] IndexError),
    /// The background load task did not complete.
    #[error("index load task failed: {0}")]
    Load(String),
}
