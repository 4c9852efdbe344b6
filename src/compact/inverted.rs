//! Integer remapping of inverted index postings.
//!
//! Postings name their document by string (`{docRef: metadata}`); the compact
//! form names the field vector instead, as `[vectorIndex, metadata, ...]`.
//! Rows are stored in term index order, so a row's position is its `_index`.

use super::{CompactPostings, CompactTerm};
use crate::error::{BuildError, CompactLoadError};
use crate::search::{FieldVector, Postings, TermEntry, field_ref};
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Remaps postings to field vector positions and orders rows by term index.
///
/// Fails when a posting has no field vector, when a posting belongs to a field
/// outside `fields`, or when term indices are not exactly `0..rows`.
pub fn compact_inverted_index(
    fields: &[String],
    field_vectors: &[FieldVector],
    inverted_index: &[(String, TermEntry)],
) -> Result<Vec<CompactTerm>, BuildError> {
    let lookup: AHashMap<&str, usize> = field_vectors
        .iter()
        .enumerate()
        .map(|(i, v)| (v.id(), i))
        .collect();

    let mut rows = inverted_index
        .iter()
        .map(|(token, entry)| {
            if let Some(field) = entry.fields.keys().find(|f| !fields.contains(*f)) {
                return Err(BuildError::IndexConsistency(format!(
                    "token '{}' has postings for unknown field '{}'",
                    token, field
                )));
            }

            let postings = fields
                .iter()
                .map(|field| compact_postings(token, field, entry.fields.get(field), &lookup))
                .collect::<Result<Vec<_>, _>>()?;

            Ok((
                entry.index,
                CompactTerm {
                    token: token.clone(),
                    fields: postings,
                },
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    rows.sort_by_key(|(index, _)| *index);

    if let Some((position, (index, term))) = rows
        .iter()
        .enumerate()
        .find(|(position, (index, _))| position != index)
    {
        return Err(BuildError::IndexConsistency(format!(
            "token '{}' has term index {} but is row {}; term indices must be contiguous",
            term.token, index, position
        )));
    }

    Ok(rows.into_iter().map(|(_, term)| term).collect())
}

fn compact_postings(
    token: &str,
    field: &str,
    postings: Option<&Postings>,
    lookup: &AHashMap<&str, usize>,
) -> Result<CompactPostings, BuildError> {
    postings
        .into_iter()
        .flatten()
        .map(|(doc_ref, metadata)| {
            let id = field_ref(field, doc_ref);
            let vector = lookup.get(id.as_str()).ok_or_else(|| {
                BuildError::IndexConsistency(format!(
                    "token '{}' is posted to '{}' but no such field vector exists",
                    token, id
                ))
            })?;
            Ok((*vector, metadata.clone()))
        })
        .collect()
}

/// Rebuilds `{docRef: metadata}` postings from compact rows.
///
/// Each row's `_index` is its position. The result is in term index order;
/// callers sort it by token before loading.
pub fn expand_inverted_index(
    fields: &[String],
    field_vectors: &[FieldVector],
    rows: Vec<CompactTerm>,
) -> Result<Vec<(String, TermEntry)>, CompactLoadError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            if row.fields.len() != fields.len() {
                return Err(CompactLoadError::Malformed(format!(
                    "token '{}' has {} posting lists, expected {}",
                    row.token,
                    row.fields.len(),
                    fields.len()
                )));
            }

            let mut field_map = BTreeMap::new();
            for (field, compacted) in fields.iter().zip(row.fields) {
                let mut postings = Postings::new();
                for (vector, metadata) in compacted.0 {
                    let id = field_vectors
                        .get(vector)
                        .ok_or_else(|| CompactLoadError::MissingVector {
                            token: row.token.clone(),
                            vector,
                        })?
                        .id();
                    let doc_ref = id
                        .strip_prefix(field.as_str())
                        .and_then(|rest| rest.strip_prefix('/'))
                        .ok_or_else(|| CompactLoadError::ForeignVector {
                            id: id.to_string(),
                            field: field.clone(),
                        })?;
                    postings.insert(doc_ref.to_string(), metadata);
                }
                field_map.insert(field.clone(), postings);
            }

            Ok((
                row.token,
                TermEntry {
                    index,
                    fields: field_map,
                },
            ))
        })
        .collect()
}
