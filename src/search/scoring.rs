//! Search relevance and ranking algorithms.
//!
//! Field vectors are weighted with BM25 at build time; at query time a
//! per-field query vector is compared against each candidate field vector.

use std::collections::BTreeMap;

/// BM25 term frequency saturation.
const K1: f64 = 1.2;
/// BM25 field length normalization.
const B: f64 = 0.75;

/// Inverse document frequency.
///
/// `postings` is the number of (field, document) pairs the term occurs in, so a
/// term found in both the name and the docstring of one document counts twice.
pub(crate) fn idf(postings: usize, document_count: usize) -> f64 {
    let df = postings as f64;
    let x = (document_count as f64 - df + 0.5) / (df + 0.5);
    (1.0 + x.abs()).ln()
}

/// BM25 weight of a term within one field of one document.
pub(crate) fn bm25(idf: f64, tf: f64, field_length: f64, avg_field_length: f64, boost: f64) -> f64 {
    let length_ratio = if avg_field_length > 0.0 {
        field_length / avg_field_length
    } else {
        0.0
    };
    let score = idf * ((K1 + 1.0) * tf) / (K1 * (1.0 - B + B * length_ratio) + tf);
    round_weight(score * boost)
}

/// Weights are stored with three decimals to keep the payload short.
pub(crate) fn round_weight(weight: f64) -> f64 {
    (weight * 1000.0).round() / 1000.0
}

/// Sparse query-side vector, keyed by term index.
#[derive(Debug, Clone, Default)]
pub(crate) struct QueryVector {
    elements: BTreeMap<usize, f64>,
}

impl QueryVector {
    /// Adds `value` to the element at `index`, inserting it if absent.
    pub(crate) fn upsert(&mut self, index: usize, value: f64) {
        *self.elements.entry(index).or_insert(0.0) += value;
    }

    fn magnitude(&self) -> f64 {
        self.elements.values().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product with a document field vector, normalized by the query magnitude.
    ///
    /// `field_vector` must be sorted by term index. An empty query vector scores 0.
    pub(crate) fn similarity(&self, field_vector: &[(usize, f64)]) -> f64 {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return 0.0;
        }

        let dot: f64 = field_vector
            .iter()
            .filter_map(|(index, weight)| self.elements.get(index).map(|q| q * weight))
            .sum();

        dot / magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1)]
    #[case(1, 10)]
    #[case(5, 10)]
    fn idf_is_positive(#[case] postings: usize, #[case] docs: usize) {
        check!(idf(postings, docs) > 0.0);
    }

    #[test]
    fn rarer_terms_weigh_more() {
        check!(idf(1, 100) > idf(50, 100));
    }

    #[test]
    fn boost_scales_weight() {
        let plain = bm25(1.0, 1.0, 3.0, 3.0, 1.0);
        let boosted = bm25(1.0, 1.0, 3.0, 3.0, 10.0);
        check!((boosted - plain * 10.0).abs() < 0.01);
    }

    #[test]
    fn weights_have_three_decimals() {
        check!(round_weight(1.234_56) == 1.235);
        check!(round_weight(0.0004) == 0.0);
    }

    #[test]
    fn similarity_of_disjoint_vectors_is_zero() {
        let mut query = QueryVector::default();
        query.upsert(1, 1.0);
        check!(query.similarity(&[(0, 2.0), (2, 3.0)]) == 0.0);
        check!(QueryVector::default().similarity(&[(0, 2.0)]) == 0.0);
    }

    #[test]
    fn similarity_sums_overlapping_terms() {
        let mut query = QueryVector::default();
        query.upsert(0, 1.0);
        query.upsert(2, 1.0);
        let score = query.similarity(&[(0, 2.0), (1, 5.0), (2, 4.0)]);
        check!((score - 6.0 / 2f64.sqrt()).abs() < 1e-9);
    }
}
