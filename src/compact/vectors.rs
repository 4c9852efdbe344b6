//! Delta elision of field vector term indices.
//!
//! Within a vector, a term index equal to the previous one plus one is written
//! as `null`. Weights are never touched.

use super::{CompactFieldVector, CompactVector};
use crate::error::CompactLoadError;
use crate::search::{FieldVector, TermVector};

/// Replaces every run-continuing term index with the elision sentinel.
pub fn compact_vector(vector: &TermVector) -> CompactVector {
    let mut previous: Option<usize> = None;
    vector
        .iter()
        .map(|&(index, weight)| {
            let slot = if previous.is_some_and(|p| p.checked_add(1) == Some(index)) {
                None
            } else {
                Some(index)
            };
            previous = Some(index);
            (slot, weight)
        })
        .collect()
}

/// Restores elided term indices as previous + 1.
///
/// A vector whose first term index is elided has nothing to count from and
/// is rejected.
pub fn expand_vector(id: &str, vector: &CompactVector) -> Result<TermVector, CompactLoadError> {
    let mut previous: Option<usize> = None;
    vector
        .iter()
        .map(|&(slot, weight)| {
            let index = match (slot, previous) {
                (Some(index), _) => index,
                (None, Some(p)) => p.checked_add(1).ok_or_else(|| {
                    CompactLoadError::Malformed(format!(
                        "field vector '{}' elides a term index past {}",
                        id, p
                    ))
                })?,
                (None, None) => {
                    return Err(CompactLoadError::Malformed(format!(
                        "field vector '{}' starts with an elided term index",
                        id
                    )));
                }
            };
            previous = Some(index);
            Ok((index, weight))
        })
        .collect()
}

pub fn compact_vectors(vectors: &[FieldVector]) -> Vec<CompactFieldVector> {
    vectors
        .iter()
        .map(|v| CompactFieldVector(v.0.clone(), compact_vector(&v.1)))
        .collect()
}

pub fn expand_vectors(vectors: Vec<CompactFieldVector>) -> Result<Vec<FieldVector>, CompactLoadError> {
    vectors
        .into_iter()
        .map(|CompactFieldVector(id, vector)| {
            let expanded = expand_vector(&id, &vector)?;
            Ok(FieldVector(id, expanded))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    fn vector(indices: &[usize]) -> TermVector {
        indices.iter().map(|&i| (i, i as f64 / 10.0)).collect()
    }

    #[test]
    fn runs_collapse_after_first() {
        let compacted = compact_vector(&vector(&[0, 2, 4, 5, 6, 9]));
        let slots: Vec<Option<usize>> = compacted.iter().map(|(s, _)| *s).collect();
        check!(slots == vec![Some(0), Some(2), Some(4), None, None, Some(9)]);

        let expanded = expand_vector("doc/0", &compacted).unwrap();
        let indices: Vec<usize> = expanded.iter().map(|(i, _)| *i).collect();
        check!(indices == vec![0, 2, 4, 5, 6, 9]);
    }

    #[test]
    fn weights_pass_through() {
        let original = vector(&[3, 4, 5]);
        let compacted = compact_vector(&original);
        let weights: Vec<f64> = compacted.iter().map(|(_, w)| *w).collect();
        check!(weights == vec![0.3, 0.4, 0.5]);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[7])]
    #[case(&[0, 1, 2, 3])]
    #[case(&[1, 3, 5])]
    fn expand_inverts_compact(#[case] indices: &[usize]) {
        let original = vector(indices);
        check!(expand_vector("x/0", &compact_vector(&original)).unwrap() == original);
    }

    #[test]
    fn compacted_json_uses_null_sentinel() {
        let json = serde_json::to_string(&compact_vector(&vector(&[1, 2]))).unwrap();
        check!(json == "[1,0.1,null,0.2]");
    }

    #[test]
    fn sentinel_after_largest_index_rejected() {
        let compacted: CompactVector = vec![(Some(usize::MAX), 1.0), (None, 1.0)].into();
        let_assert!(Err(CompactLoadError::Malformed(_)) = expand_vector("doc/0", &compacted));
    }

    #[test]
    fn leading_sentinel_rejected() {
        let compacted: CompactVector = vec![(None, 1.0)].into();
        let_assert!(Err(CompactLoadError::Malformed(_)) = expand_vector("doc/0", &compacted));
    }
}
