//! Builds the raw inverted index from document records.

use super::index::{FIELDS, FieldVector, INDEX_VERSION, RawIndex, TermEntry, field_ref};
use super::scoring::{bm25, idf};
use super::tokenize::{Pipeline, STEMMER_PIPELINE, tokenize};
use crate::config::SearchConfig;
use crate::document::DocumentRecord;
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Term frequencies of one field of one document.
struct FieldTerms {
    field: usize,
    doc_ref: String,
    /// Number of terms surviving the pipeline
    length: usize,
    frequencies: AHashMap<String, usize>,
}

/// Builder for a [`RawIndex`].
///
/// Each document is referenced by its position in the input. Fields are
/// `name` (last segment of `ref`), `ref` and `doc`, boosted as in [`FIELDS`].
#[derive(Debug)]
pub struct IndexBuilder {
    pipeline: Pipeline,
    index_docstrings: bool,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self {
            pipeline: Pipeline::default(),
            index_docstrings: true,
        }
    }
}

impl IndexBuilder {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            index_docstrings: config.index_docstrings,
            ..Self::default()
        }
    }

    /// Indexes `documents` in order.
    ///
    /// The inverted index comes out sorted by token; field vectors follow
    /// document order, then field order.
    pub fn build(&self, documents: &[DocumentRecord]) -> RawIndex {
        let start = std::time::Instant::now();

        let mut entries: BTreeMap<String, TermEntry> = BTreeMap::new();
        let mut field_terms: Vec<FieldTerms> = Vec::with_capacity(documents.len() * FIELDS.len());
        let mut total_lengths = [0usize; FIELDS.len()];

        for (position, document) in documents.iter().enumerate() {
            let doc_ref = position.to_string();
            let texts = [
                document.name(),
                document.doc_ref.as_str(),
                if self.index_docstrings {
                    document.doc.as_str()
                } else {
                    ""
                },
            ];

            for (field, text) in texts.into_iter().enumerate() {
                let field_name = FIELDS[field].name;
                let mut terms = FieldTerms {
                    field,
                    doc_ref: doc_ref.clone(),
                    length: 0,
                    frequencies: AHashMap::new(),
                };

                for token in tokenize(text) {
                    let Some(term) = self.pipeline.index_token(&token.text) else {
                        continue;
                    };
                    terms.length += 1;
                    *terms.frequencies.entry(term.clone()).or_insert(0) += 1;

                    let next_index = entries.len();
                    entries
                        .entry(term)
                        .or_insert_with(|| TermEntry {
                            index: next_index,
                            fields: FIELDS
                                .iter()
                                .map(|f| (f.name.to_string(), BTreeMap::new()))
                                .collect(),
                        })
                        .fields
                        .entry(field_name.to_string())
                        .or_default()
                        .entry(doc_ref.clone())
                        .or_default()
                        .position
                        .push([token.start, token.len]);
                }

                total_lengths[field] += terms.length;
                field_terms.push(terms);
            }
        }

        let document_count = documents.len();
        let avg_lengths = total_lengths.map(|total| {
            if document_count == 0 {
                0.0
            } else {
                total as f64 / document_count as f64
            }
        });

        let mut idf_cache: AHashMap<&str, f64> = AHashMap::with_capacity(entries.len());
        let mut field_vectors = Vec::with_capacity(field_terms.len());
        for terms in &field_terms {
            let mut elements: Vec<(usize, f64)> = terms
                .frequencies
                .iter()
                .filter_map(|(term, &tf)| {
                    let entry = entries.get(term)?;
                    let term_idf = *idf_cache.entry(term.as_str()).or_insert_with(|| {
                        let postings = entry.fields.values().map(|p| p.len()).sum();
                        idf(postings, document_count)
                    });
                    let weight = bm25(
                        term_idf,
                        tf as f64,
                        terms.length as f64,
                        avg_lengths[terms.field],
                        FIELDS[terms.field].boost,
                    );
                    Some((entry.index, weight))
                })
                .collect();
            elements.sort_by_key(|(index, _)| *index);

            field_vectors.push(FieldVector(
                field_ref(FIELDS[terms.field].name, &terms.doc_ref),
                elements.into(),
            ));
        }

        let index = RawIndex {
            version: INDEX_VERSION.to_string(),
            fields: FIELDS.iter().map(|f| f.name.to_string()).collect(),
            field_vectors,
            inverted_index: entries.into_iter().collect(),
            pipeline: vec![STEMMER_PIPELINE.to_string()],
        };

        tracing::info!(
            "Built search index: {} unique terms, {} documents, {} field vectors in {:?}",
            index.inverted_index.len(),
            document_count,
            index.field_vectors.len(),
            start.elapsed()
        );

        index
    }
}
