//! Lossless compaction of the raw index for static embedding.
//!
//! Two transforms shrink the payload:
//!
//! - postings point at field vectors by position instead of by `"field/ref"` id
//! - consecutive term indices inside a field vector are elided to `null`
//!
//! [`expand_index`] is the exact inverse, up to posting key order.

mod inverted;
mod vectors;

pub use inverted::{compact_inverted_index, expand_inverted_index};
pub use vectors::{compact_vector, compact_vectors, expand_vector, expand_vectors};

use crate::error::{BuildError, CompactLoadError};
use crate::flat::FlatPairs;
use crate::search::{MatchMetadata, RawIndex};
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Field vector elements with elided term indices as `None`.
pub type CompactVector = FlatPairs<Option<usize>, f64>;

/// `[vectorIndex, metadata, ...]` for one token in one field.
pub type CompactPostings = FlatPairs<usize, MatchMetadata>;

/// `["field/ref", [termIndex | null, weight, ...]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactFieldVector(pub String, pub CompactVector);

/// One inverted index row: `[token, postings for field 0, postings for field 1, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactTerm {
    pub token: String,
    /// One list per index field, in field order
    pub fields: Vec<CompactPostings>,
}

impl Serialize for CompactTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.fields.len() + 1))?;
        seq.serialize_element(&self.token)?;
        for postings in &self.fields {
            seq.serialize_element(postings)?;
        }
        seq.end()
    }
}

struct CompactTermVisitor;

impl<'de> Visitor<'de> for CompactTermVisitor {
    type Value = CompactTerm;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of a token followed by per-field posting lists")
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
        let token: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let mut fields = vec![];
        while let Some(postings) = seq.next_element::<CompactPostings>()? {
            fields.push(postings);
        }
        Ok(CompactTerm { token, fields })
    }
}

impl<'de> Deserialize<'de> for CompactTerm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(CompactTermVisitor)
    }
}

/// The compact index as embedded in pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactIndex {
    pub version: String,
    pub fields: Vec<String>,
    pub field_vectors: Vec<CompactFieldVector>,
    /// Ordered by term index
    pub inverted_index: Vec<CompactTerm>,
    pub pipeline: Vec<String>,
}

/// Compacts a raw index.
///
/// Any posting without a matching field vector aborts compaction; nothing is
/// dropped silently. The output does not depend on posting map order.
pub fn compact_index(raw: &RawIndex) -> Result<CompactIndex, BuildError> {
    let inverted_index =
        compact_inverted_index(&raw.fields, &raw.field_vectors, &raw.inverted_index)?;

    let compact = CompactIndex {
        version: raw.version.clone(),
        fields: raw.fields.clone(),
        field_vectors: compact_vectors(&raw.field_vectors),
        inverted_index,
        pipeline: raw.pipeline.clone(),
    };

    tracing::debug!(
        "Compacted index: {} tokens, {} field vectors",
        compact.inverted_index.len(),
        compact.field_vectors.len()
    );

    Ok(compact)
}

/// Expands a compact index into a load-ready raw index, sorted by token.
pub fn expand_index(compact: CompactIndex) -> Result<RawIndex, CompactLoadError> {
    let field_vectors = expand_vectors(compact.field_vectors)?;
    let mut inverted_index =
        expand_inverted_index(&compact.fields, &field_vectors, compact.inverted_index)?;
    inverted_index.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(RawIndex {
        version: compact.version,
        fields: compact.fields,
        field_vectors,
        inverted_index,
        pipeline: compact.pipeline,
    })
}
