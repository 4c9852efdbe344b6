//! The serialized `[compactIndex, documents]` payload embedded in pages.

use crate::compact::{CompactIndex, compact_index};
use crate::config::SearchConfig;
use crate::document::{DocumentRecord, documents_from_value, parse_documents};
use crate::error::{BuildError, DocumentError};
use crate::search::IndexBuilder;
use serde_json::Value;

/// Builds the compact index for `documents`.
///
/// With docstring indexing disabled the returned documents carry empty `doc`
/// text, since nothing could ever be highlighted in it.
pub fn build_compact(
    mut documents: Vec<DocumentRecord>,
    config: &SearchConfig,
) -> Result<(CompactIndex, Vec<DocumentRecord>), BuildError> {
    let raw = IndexBuilder::new(config).build(&documents);
    let compact = compact_index(&raw)?;

    if !config.index_docstrings {
        for document in &mut documents {
            document.doc.clear();
        }
    }

    Ok((compact, documents))
}

/// Turns a JSON document array into the serialized payload.
///
/// All-or-nothing: malformed input or an inconsistent index yields an error
/// and no output.
pub fn build_payload(input: &str, config: &SearchConfig) -> Result<String, BuildError> {
    let documents = parse_documents(input)?;
    let (compact, documents) = build_compact(documents, config)?;
    let payload = serde_json::to_string(&(&compact, &documents)).map_err(BuildError::Serialize)?;

    tracing::info!(
        "Wrote search payload: {} documents, {} bytes",
        documents.len(),
        payload.len()
    );

    Ok(payload)
}

/// Splits a payload into the still-unvalidated compact index and the
/// validated documents.
///
/// The compact index is left as JSON so that a broken index can be
/// recovered from while the documents are intact.
pub fn parse_payload(payload: &str) -> Result<(Value, Vec<DocumentRecord>), DocumentError> {
    let (index, documents): (Value, Value) = serde_json::from_str(payload)?;
    Ok((index, documents_from_value(documents)?))
}
