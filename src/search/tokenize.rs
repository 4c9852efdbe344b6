//! Text tokenization and stemming utilities for search indexing.

use rust_stemmers::{Algorithm, Stemmer};

/// Common English stop words to filter out from indexing.
/// These high-frequency words add little value to search relevance.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with",
];

/// Name of the only search-time pipeline stage, as serialized in the index.
pub(crate) const STEMMER_PIPELINE: &str = "stemmer";

/// A raw token and the character span it was cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) text: String,
    /// Character offset of the first char
    pub(crate) start: usize,
    /// Length in characters
    pub(crate) len: usize,
}

/// Splits text on whitespace and hyphens, lowercasing each token.
///
/// Spans are counted in characters, not bytes, so they stay valid for any
/// consumer that slices the original text by character.
pub(crate) fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = vec![];
    let mut current = String::new();
    let mut start = 0;
    let mut len = 0;

    for (i, c) in text.chars().enumerate() {
        if c.is_whitespace() || c == '-' {
            if len > 0 {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    start,
                    len,
                });
                len = 0;
            }
            continue;
        }

        if len == 0 {
            start = i;
        }
        current.extend(c.to_lowercase());
        len += 1;
    }

    if len > 0 {
        tokens.push(Token {
            text: current,
            start,
            len,
        });
    }

    tokens
}

/// Indexing and search pipelines.
pub(crate) struct Pipeline {
    /// Reusable stemmer instance for English language stemming
    stemmer: Stemmer,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("stemmer", &"english").finish()
    }
}

impl Pipeline {
    /// Runs a token through trimmer, stop word filter and stemmer.
    /// Returns `None` when the token is dropped.
    pub(crate) fn index_token(&self, token: &str) -> Option<String> {
        let trimmed = trim(token);
        if trimmed.is_empty() || STOP_WORDS.contains(&trimmed) {
            return None;
        }
        Some(self.stemmer.stem(trimmed).into_owned())
    }

    /// Search-time pipeline: stemming only.
    pub(crate) fn search_token(&self, term: &str) -> String {
        self.stemmer.stem(term).into_owned()
    }
}

/// Strips leading and trailing non-word characters.
fn trim(token: &str) -> &str {
    token.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
}
