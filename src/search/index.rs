//! Inverted index model and query execution.
//!
//! [`RawIndex`] is the serialized, load-ready form. [`SearchIndex`] is the
//! validated in-memory form queries run against.

use super::query::{Clause, Presence, Query, parse_query};
use super::scoring::QueryVector;
use super::tokenize::{Pipeline, STEMMER_PIPELINE};
use crate::error::{IndexError, QueryError};
use crate::flat::FlatPairs;
use ahash::{AHashMap, AHashSet};
use rapidfuzz::distance::levenshtein;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index format version written into every payload.
pub const INDEX_VERSION: &str = "2.3.9";

/// An indexed field and its relevance multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub boost: f64,
}

/// Indexed fields, in the order every index structure relies on.
pub const FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        name: "name",
        boost: 10.0,
    },
    FieldSpec {
        name: "ref",
        boost: 5.0,
    },
    FieldSpec {
        name: "doc",
        boost: 1.0,
    },
];

/// Field whose match positions feed snippet extraction.
pub const SNIPPET_FIELD: &str = "doc";

/// Per-posting match metadata. Only character positions are retained.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// `[start, length]` character spans
    #[serde(default)]
    pub position: Vec<[usize; 2]>,
}

/// Document reference → metadata for one token in one field.
pub type Postings = BTreeMap<String, MatchMetadata>;

/// All postings of one token, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TermEntry {
    /// Creation-order position of the token; field vectors refer to it
    #[serde(rename = "_index")]
    pub index: usize,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Postings>,
}

/// `(term index, weight)` pairs sorted by term index.
pub type TermVector = FlatPairs<usize, f64>;

/// A field vector: `["field/docRef", [termIndex, weight, ...]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVector(pub String, pub TermVector);

impl FieldVector {
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Splits the id into `(field, doc_ref)`.
    pub fn field_ref(&self) -> Option<(&str, &str)> {
        self.0.split_once('/')
    }
}

/// Build the id of a field vector.
pub fn field_ref(field: &str, doc_ref: &str) -> String {
    format!("{}/{}", field, doc_ref)
}

/// Serialized, load-ready index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIndex {
    pub version: String,
    pub fields: Vec<String>,
    pub field_vectors: Vec<FieldVector>,
    /// Sorted by token
    pub inverted_index: Vec<(String, TermEntry)>,
    pub pipeline: Vec<String>,
}

/// Term → field → metadata for every match in one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchData {
    pub metadata: BTreeMap<String, BTreeMap<String, MatchMetadata>>,
}

impl MatchData {
    fn add(&mut self, term: &str, field: &str, metadata: &MatchMetadata) {
        self.metadata
            .entry(term.to_string())
            .or_default()
            .entry(field.to_string())
            .or_default()
            .position
            .extend_from_slice(&metadata.position);
    }

    fn combine(&mut self, other: Self) {
        for (term, fields) in other.metadata {
            for (field, metadata) in fields {
                self.add(&term, &field, &metadata);
            }
        }
    }

    /// All `[start, length]` spans recorded for `field`, across every matched term.
    pub fn positions(&self, field: &str) -> Vec<[usize; 2]> {
        self.metadata
            .values()
            .filter_map(|fields| fields.get(field))
            .flat_map(|m| m.position.iter().copied())
            .collect()
    }
}

/// One ranked document.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub doc_ref: String,
    pub score: f64,
    pub matches: MatchData,
}

impl SearchHit {
    /// Position of the document in the document sequence.
    pub fn position(&self) -> Option<usize> {
        self.doc_ref.parse().ok()
    }
}

#[derive(Debug)]
struct LoadedVector {
    field: String,
    doc_ref: String,
    elements: Vec<(usize, f64)>,
}

/// A validated, read-only index.
#[derive(Debug)]
pub struct SearchIndex {
    fields: Vec<String>,
    /// Sorted token list, scanned for fuzzy and wildcard expansion
    tokens: Vec<String>,
    entries: AHashMap<String, TermEntry>,
    vectors: Vec<LoadedVector>,
    vector_lookup: AHashMap<String, usize>,
    pipeline: Pipeline,
}

impl SearchIndex {
    /// Validates a raw index and prepares it for querying.
    ///
    /// Rejects unknown pipeline stages, an inverted index that is not strictly
    /// sorted by token, duplicate term indices, postings or vectors for unknown
    /// fields, and vectors referring to term indices no token owns.
    pub fn load(raw: RawIndex) -> Result<Self, IndexError> {
        if let Some(unknown) = raw.pipeline.iter().find(|p| *p != STEMMER_PIPELINE) {
            return Err(IndexError(format!(
                "unknown pipeline function '{}'",
                unknown
            )));
        }

        if let Some(pair) = raw.inverted_index.windows(2).find(|w| w[0].0 >= w[1].0) {
            return Err(IndexError(format!(
                "inverted index not strictly sorted at '{}' / '{}'",
                pair[0].0, pair[1].0
            )));
        }

        let mut term_indices = AHashSet::with_capacity(raw.inverted_index.len());
        for (token, entry) in &raw.inverted_index {
            if !term_indices.insert(entry.index) {
                return Err(IndexError(format!(
                    "term index {} reused by '{}'",
                    entry.index, token
                )));
            }
            if let Some(field) = entry.fields.keys().find(|f| !raw.fields.contains(*f)) {
                return Err(IndexError(format!(
                    "token '{}' has postings for unknown field '{}'",
                    token, field
                )));
            }
        }

        let mut vectors = Vec::with_capacity(raw.field_vectors.len());
        let mut vector_lookup = AHashMap::with_capacity(raw.field_vectors.len());
        for vector in raw.field_vectors {
            let Some((field, doc_ref)) = vector.field_ref() else {
                return Err(IndexError(format!(
                    "field vector id '{}' is not of the form field/ref",
                    vector.id()
                )));
            };
            if !raw.fields.iter().any(|f| f == field) {
                return Err(IndexError(format!(
                    "field vector '{}' belongs to unknown field",
                    vector.id()
                )));
            }
            if let Some((term, _)) = vector.1.iter().find(|(t, _)| !term_indices.contains(t)) {
                return Err(IndexError(format!(
                    "field vector '{}' refers to unknown term index {}",
                    vector.id(),
                    term
                )));
            }

            let (field, doc_ref) = (field.to_string(), doc_ref.to_string());
            let FieldVector(id, pairs) = vector;
            vector_lookup.insert(id, vectors.len());
            vectors.push(LoadedVector {
                field,
                doc_ref,
                elements: pairs.0,
            });
        }

        let tokens = raw.inverted_index.iter().map(|(t, _)| t.clone()).collect();
        let entries = raw.inverted_index.into_iter().collect();

        Ok(Self {
            fields: raw.fields,
            tokens,
            entries,
            vectors,
            vector_lookup,
            pipeline: Pipeline::default(),
        })
    }

    /// Indexed field names, in index order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of unique tokens.
    pub fn term_count(&self) -> usize {
        self.tokens.len()
    }

    /// Number of field vectors (documents × fields).
    pub fn vector_count(&self) -> usize {
        self.vectors.len()
    }

    /// Parses and runs query text.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, QueryError> {
        let query = parse_query(query, &self.fields)?;
        self.query(&query)
    }

    /// Runs a parsed query, returning hits sorted by descending score.
    ///
    /// Ties keep the order in which documents were first matched.
    pub fn query(&self, query: &Query) -> Result<Vec<SearchHit>, QueryError> {
        let mut query_vectors: AHashMap<&str, QueryVector> = AHashMap::new();
        // Insertion-ordered field refs with their match data
        let mut matching: Vec<(usize, MatchData)> = vec![];
        let mut matching_lookup: AHashMap<usize, usize> = AHashMap::new();
        let mut term_field_seen: AHashSet<(&str, &str)> = AHashSet::new();
        let mut required: Option<AHashSet<&str>> = None;
        let mut prohibited: AHashSet<&str> = AHashSet::new();

        for clause in &query.clauses {
            let term = if clause.use_pipeline {
                self.pipeline.search_token(&clause.term)
            } else {
                clause.term.clone()
            };

            let mut clause_matches: AHashSet<&str> = AHashSet::new();
            for expanded in self.expand_term(&term, clause)? {
                let Some(entry) = self.entries.get(expanded) else {
                    continue;
                };

                for field in &clause.fields {
                    let postings = entry.fields.get(field);
                    let doc_refs = postings.into_iter().flat_map(|p| p.keys());

                    match clause.presence {
                        Presence::Required => clause_matches.extend(doc_refs.map(String::as_str)),
                        Presence::Prohibited => {
                            prohibited.extend(doc_refs.map(String::as_str));
                            continue;
                        }
                        Presence::Optional => {}
                    }

                    query_vectors
                        .entry(field.as_str())
                        .or_default()
                        .upsert(entry.index, clause.boost);

                    if !term_field_seen.insert((expanded, field.as_str())) {
                        continue;
                    }

                    for (doc_ref, metadata) in postings.into_iter().flatten() {
                        let Some(&vector) = self.vector_lookup.get(&field_ref(field, doc_ref))
                        else {
                            tracing::warn!(
                                "Posting for '{}' has no field vector {}/{}",
                                expanded,
                                field,
                                doc_ref
                            );
                            continue;
                        };
                        let slot = *matching_lookup.entry(vector).or_insert_with(|| {
                            matching.push((vector, MatchData::default()));
                            matching.len() - 1
                        });
                        matching[slot].1.add(expanded, field, metadata);
                    }
                }
            }

            if clause.presence == Presence::Required {
                required = Some(match required {
                    None => clause_matches,
                    Some(previous) => previous.intersection(&clause_matches).copied().collect(),
                });
            }
        }

        if query.is_negated() {
            matching = (0..self.vectors.len())
                .map(|v| (v, MatchData::default()))
                .collect();
        }

        let mut hits: Vec<SearchHit> = vec![];
        let mut hit_lookup: AHashMap<&str, usize> = AHashMap::new();
        for (vector_idx, match_data) in matching {
            let vector = &self.vectors[vector_idx];
            let doc_ref = vector.doc_ref.as_str();

            if required.as_ref().is_some_and(|r| !r.contains(doc_ref))
                || prohibited.contains(doc_ref)
            {
                continue;
            }

            let score = query_vectors
                .get(vector.field.as_str())
                .map_or(0.0, |qv| qv.similarity(&vector.elements));

            if let Some(&slot) = hit_lookup.get(doc_ref) {
                hits[slot].score += score;
                hits[slot].matches.combine(match_data);
            } else {
                hit_lookup.insert(doc_ref, hits.len());
                hits.push(SearchHit {
                    doc_ref: doc_ref.to_string(),
                    score,
                    matches: match_data,
                });
            }
        }

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }

    /// Index tokens a clause term matches: by edit distance, wildcard, or exactly.
    fn expand_term<'a>(&'a self, term: &str, clause: &Clause) -> Result<Vec<&'a str>, QueryError> {
        if clause.edit_distance > 0 {
            let max = clause.edit_distance as usize;
            return Ok(self
                .tokens
                .iter()
                .filter(|token| levenshtein::distance(term.chars(), token.chars()) <= max)
                .map(String::as_str)
                .collect());
        }

        if clause.wildcard {
            let pattern = term
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            let matcher = regex::Regex::new(&format!("^{}$", pattern)).map_err(|e| {
                QueryError::Wildcard {
                    term: term.to_string(),
                    reason: e.to_string(),
                }
            })?;
            return Ok(self
                .tokens
                .iter()
                .filter(|token| matcher.is_match(token))
                .map(String::as_str)
                .collect());
        }

        Ok(self
            .entries
            .get_key_value(term)
            .map(|(token, _)| token.as_str())
            .into_iter()
            .collect())
    }
}
