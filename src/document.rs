//! Document records fed into the index and shipped alongside it.

use crate::error::DocumentError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One documented identifier.
///
/// Addressed by its position in the document sequence; that position, as a
/// decimal string, is also the index's document reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Fully qualified identifier, e.g. `pkg.mod.foo`
    #[serde(rename = "ref")]
    pub doc_ref: String,
    /// Plain docstring text
    pub doc: String,
    /// Page the identifier is documented on
    pub url: String,
    /// Whether the identifier is callable
    pub func: bool,
}

impl DocumentRecord {
    pub fn new(
        doc_ref: impl Into<String>,
        doc: impl Into<String>,
        url: impl Into<String>,
        func: bool,
    ) -> Self {
        Self {
            doc_ref: doc_ref.into(),
            doc: doc.into(),
            url: url.into(),
            func,
        }
    }

    /// Last dot-separated segment of the identifier.
    pub fn name(&self) -> &str {
        self.doc_ref
            .rsplit('.')
            .next()
            .unwrap_or(self.doc_ref.as_str())
    }

    /// Identifier as displayed in result links, `()` marking callables.
    pub fn display_name(&self) -> String {
        if self.func {
            format!("{}()", self.doc_ref)
        } else {
            self.doc_ref.clone()
        }
    }
}

/// Parse and validate a JSON array of document records.
pub fn parse_documents(input: &str) -> Result<Vec<DocumentRecord>, DocumentError> {
    let value: Value = serde_json::from_str(input)?;
    documents_from_value(value)
}

/// Validate an already-parsed JSON value as a document array.
///
/// Extra keys on a record are ignored; missing or mistyped required keys,
/// empty refs and duplicate refs are rejected.
pub fn documents_from_value(value: Value) -> Result<Vec<DocumentRecord>, DocumentError> {
    let values: Vec<Value> = serde_json::from_value(value)?;
    let mut documents = Vec::with_capacity(values.len());
    let mut seen: AHashMap<String, usize> = AHashMap::with_capacity(values.len());

    for (position, value) in values.into_iter().enumerate() {
        let record: DocumentRecord =
            serde_json::from_value(value).map_err(|e| DocumentError::Invalid {
                position,
                reason: e.to_string(),
            })?;

        if record.doc_ref.trim().is_empty() {
            return Err(DocumentError::Invalid {
                position,
                reason: "ref is empty".to_string(),
            });
        }

        if let Some(&first) = seen.get(&record.doc_ref) {
            return Err(DocumentError::DuplicateRef {
                position,
                first,
                doc_ref: record.doc_ref,
            });
        }
        seen.insert(record.doc_ref.clone(), position);
        documents.push(record);
    }

    tracing::debug!("Validated {} document records", documents.len());
    Ok(documents)
}
