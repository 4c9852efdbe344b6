//! Query text parsing.
//!
//! A query is a whitespace-separated list of clauses:
//!
//! - `+term` / `-term`: required / prohibited
//! - `field:term`: restrict the clause to one field
//! - `term^10`: boost the clause
//! - `term~1`: match index terms within the given edit distance
//! - `ter*`: wildcard match, bypassing the stemmer
//!
//! Hyphens split a clause into several terms that share its modifiers.

use crate::error::QueryError;

/// Whether a clause must, may or must not match a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    #[default]
    Optional,
    Required,
    Prohibited,
}

/// One term with its modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Fields this clause is matched against
    pub fields: Vec<String>,
    /// Lowercased term text
    pub term: String,
    pub boost: f64,
    pub edit_distance: u32,
    /// Run the term through the search pipeline (stemming) before matching
    pub use_pipeline: bool,
    /// Term contains `*` wildcards
    pub wildcard: bool,
    pub presence: Presence,
}

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

impl Query {
    /// True when every clause is prohibited, i.e. the query only excludes.
    pub fn is_negated(&self) -> bool {
        !self.clauses.is_empty()
            && self
                .clauses
                .iter()
                .all(|c| c.presence == Presence::Prohibited)
    }
}

/// Appends `~fuzziness` to every whitespace-delimited term without its own edit distance.
///
/// A fuzziness of 0 leaves the query untouched.
pub fn apply_fuzziness(query: &str, fuzziness: u32) -> String {
    if fuzziness == 0 {
        return query.to_string();
    }

    query
        .split_whitespace()
        .map(|term| {
            if term.contains('~') {
                term.to_string()
            } else {
                format!("{}~{}", term, fuzziness)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse query text against the given index fields.
pub fn parse_query(input: &str, fields: &[String]) -> Result<Query, QueryError> {
    let mut clauses = vec![];
    for raw in input.split_whitespace() {
        clauses.extend(parse_clause(raw, fields)?);
    }
    Ok(Query { clauses })
}

fn parse_clause(raw: &str, fields: &[String]) -> Result<Vec<Clause>, QueryError> {
    let mut rest = raw;

    let presence = if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
        Presence::Required
    } else if let Some(stripped) = rest.strip_prefix('-') {
        rest = stripped;
        Presence::Prohibited
    } else {
        Presence::Optional
    };

    let clause_fields = match rest.split_once(':') {
        Some((field, after)) => {
            if !fields.iter().any(|f| f == field) {
                return Err(QueryError::UnknownField {
                    field: field.to_string(),
                    expected: fields.join(", "),
                });
            }
            rest = after;
            vec![field.to_string()]
        }
        None => fields.to_vec(),
    };

    let body_end = rest.find(['^', '~']).unwrap_or(rest.len());
    let (body, mut modifiers) = rest.split_at(body_end);

    let mut boost = 1.0;
    let mut edit_distance = 0;
    while let Some(marker) = modifiers.chars().next() {
        let value_end = modifiers[1..]
            .find(['^', '~'])
            .map_or(modifiers.len(), |i| i + 1);
        let value = &modifiers[1..value_end];
        modifiers = &modifiers[value_end..];

        if marker == '^' {
            boost = value
                .parse::<f64>()
                .ok()
                .filter(|b| b.is_finite() && *b >= 0.0)
                .ok_or_else(|| QueryError::InvalidModifier {
                    modifier: "boost",
                    found: value.to_string(),
                })?;
        } else {
            edit_distance = value
                .parse::<u32>()
                .map_err(|_| QueryError::InvalidModifier {
                    modifier: "edit distance",
                    found: value.to_string(),
                })?;
        }
    }

    let terms: Vec<String> = body
        .to_lowercase()
        .split('-')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if terms.is_empty() {
        return Err(QueryError::MissingTerm {
            clause: raw.to_string(),
        });
    }

    Ok(terms
        .into_iter()
        .map(|term| {
            let wildcard = term.contains('*');
            Clause {
                fields: clause_fields.clone(),
                term,
                boost,
                edit_distance,
                use_pipeline: !wildcard,
                wildcard,
                presence,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    fn fields() -> Vec<String> {
        ["name", "ref", "doc"].iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("thing", 0, "thing")]
    #[case("thing", 1, "thing~1")]
    #[case("foo   bar", 2, "foo~2 bar~2")]
    #[case("foo~0 bar", 1, "foo~0 bar~1")]
    #[case("name:foo^2", 1, "name:foo^2~1")]
    fn fuzziness_appended(#[case] input: &str, #[case] fuzziness: u32, #[case] expected: &str) {
        check!(apply_fuzziness(input, fuzziness) == expected);
    }

    #[test]
    fn plain_terms() {
        let query = parse_query("Foo bar", &fields()).unwrap();
        check!(query.clauses.len() == 2);
        check!(query.clauses[0].term == "foo");
        check!(query.clauses[0].fields == fields());
        check!(query.clauses[0].presence == Presence::Optional);
        check!(query.clauses[0].use_pipeline);
    }

    #[test]
    fn modifiers_in_any_order() {
        let query = parse_query("+doc:thing~2^5", &fields()).unwrap();
        let clause = &query.clauses[0];
        check!(clause.fields == vec!["doc".to_string()]);
        check!(clause.edit_distance == 2);
        check!(clause.boost == 5.0);
        check!(clause.presence == Presence::Required);
    }

    #[test]
    fn hyphen_splits_terms() {
        let query = parse_query("-multi-line", &fields()).unwrap();
        check!(query.clauses.len() == 2);
        check!(query.clauses.iter().all(|c| c.presence == Presence::Prohibited));
        check!(query.is_negated());
    }

    #[test]
    fn wildcard_skips_pipeline() {
        let query = parse_query("thi*", &fields()).unwrap();
        check!(query.clauses[0].wildcard);
        check!(!query.clauses[0].use_pipeline);
    }

    #[test]
    fn unknown_field_rejected() {
        let_assert!(Err(QueryError::UnknownField { field, .. }) = parse_query("title:foo", &fields()));
        check!(field == "title");
    }

    #[rstest]
    #[case("foo~x")]
    #[case("foo^")]
    #[case("foo^-1")]
    #[case("foo~1.5")]
    fn bad_modifiers_rejected(#[case] input: &str) {
        let_assert!(Err(QueryError::InvalidModifier { .. }) = parse_query(input, &fields()));
    }

    #[rstest]
    #[case("+")]
    #[case("doc:")]
    #[case("~1")]
    fn missing_term_rejected(#[case] input: &str) {
        let_assert!(Err(QueryError::MissingTerm { .. }) = parse_query(input, &fields()));
    }
}
