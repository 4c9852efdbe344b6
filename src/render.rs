//! Rendering of search outcomes into result markup and status lines.

use crate::document::DocumentRecord;
use crate::search::{SNIPPET_FIELD, SearchHit};
use crate::snippet::extract_snippet;
use std::fmt::Write as _;

pub const STATUS_EMPTY_QUERY: &str = "Nothing to search for. Enter a query.";
pub const STATUS_NO_RESULTS: &str = "No results match your query.";
pub const STATUS_FAILED: &str = "Search failed. Try a different query.";

/// One rendered result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Page URL plus `#ref` anchor
    pub href: String,
    /// Identifier, `()`-suffixed for callables
    pub title: String,
    /// Highlighted docstring fragments, when the docstring matched
    pub snippet: Option<String>,
    pub score: f64,
}

impl SearchResult {
    pub fn from_hit(document: &DocumentRecord, hit: &SearchHit, pad: usize) -> Self {
        Self {
            href: format!("{}#{}", document.url, document.doc_ref),
            title: document.display_name(),
            snippet: extract_snippet(&document.doc, &hit.matches.positions(SNIPPET_FIELD), pad),
            score: hit.score,
        }
    }

    /// `<a href="…"><code>name()</code></a>` followed by the snippet block, if any.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<a href=\"{}\"><code>{}</code></a>",
            escape_html(&self.href),
            escape_html(&self.title)
        );
        if let Some(snippet) = &self.snippet {
            let _ = write!(html, "<div>{}</div>", snippet);
        }
        html
    }
}

/// Result of one query against the page context.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// No query text; nothing was executed
    EmptyQuery,
    NoResults,
    /// Query could not be executed; details are only logged
    Failed,
    /// Results in relevance order
    Results(Vec<SearchResult>),
}

impl SearchOutcome {
    /// User-facing status line.
    pub fn status(&self) -> String {
        match self {
            Self::EmptyQuery => STATUS_EMPTY_QUERY.to_string(),
            Self::NoResults => STATUS_NO_RESULTS.to_string(),
            Self::Failed => STATUS_FAILED.to_string(),
            Self::Results(results) => match results.len() {
                1 => "Found 1 result.".to_string(),
                n => format!("Found {} results.", n),
            },
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        match self {
            Self::Results(results) => results,
            _ => &[],
        }
    }

    /// Results as list items, one per line.
    pub fn to_html(&self) -> String {
        self.results()
            .iter()
            .map(|r| format!("<li>{}</li>", r.to_html()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Escapes text for inclusion in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
