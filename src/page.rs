//! Page-side search runtime.
//!
//! A [`SearchContext`] is created once per page from the embedded payload and
//! is immutable afterwards. Loading never fails because of the compact index
//! alone: if it cannot be parsed or validated, the index is rebuilt from the
//! embedded documents instead.

use crate::compact::{CompactIndex, expand_index};
use crate::config::SearchConfig;
use crate::document::DocumentRecord;
use crate::error::{CompactLoadError, PageError};
use crate::render::{SearchOutcome, SearchResult};
use crate::search::{IndexBuilder, SearchIndex, apply_fuzziness};
use crate::store::parse_payload;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use std::sync::Arc;

/// Outcome of loading the embedded compact index.
#[derive(Debug)]
pub enum IndexLoad {
    Loaded(SearchIndex),
    Failed(CompactLoadError),
}

/// Where the active index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// Expanded from the embedded compact index
    Compact,
    /// Rebuilt from the raw documents after the compact index failed to load
    Rebuilt,
}

/// Parses, expands and validates a compact index.
pub fn load_compact_index(value: Value) -> IndexLoad {
    let loaded = serde_json::from_value::<CompactIndex>(value)
        .map_err(|e| CompactLoadError::Malformed(e.to_string()))
        .and_then(expand_index)
        .and_then(|raw| SearchIndex::load(raw).map_err(CompactLoadError::from));

    match loaded {
        Ok(index) => IndexLoad::Loaded(index),
        Err(e) => IndexLoad::Failed(e),
    }
}

/// Immutable per-page search state.
#[derive(Debug)]
pub struct SearchContext {
    index: SearchIndex,
    documents: Vec<DocumentRecord>,
    config: SearchConfig,
    source: IndexSource,
}

impl SearchContext {
    /// Creates the context from a serialized `[compactIndex, documents]` payload.
    pub fn from_payload(payload: &str, config: SearchConfig) -> Result<Self, PageError> {
        let (index, documents) = parse_payload(payload)?;
        Self::from_parts(Some(index), documents, config)
    }

    /// Creates the context from an optional compact index and the documents.
    ///
    /// A missing or unusable compact index falls back to rebuilding.
    pub fn from_parts(
        compact: Option<Value>,
        documents: Vec<DocumentRecord>,
        config: SearchConfig,
    ) -> Result<Self, PageError> {
        let load = match compact {
            Some(value) => load_compact_index(value),
            None => IndexLoad::Failed(CompactLoadError::Malformed(
                "no compact index embedded".to_string(),
            )),
        };

        let (index, source) = match load {
            IndexLoad::Loaded(index) => (index, IndexSource::Compact),
            IndexLoad::Failed(e) => {
                tracing::warn!("Compact index unusable, rebuilding from documents: {}", e);
                let raw = IndexBuilder::new(&config).build(&documents);
                (SearchIndex::load(raw)?, IndexSource::Rebuilt)
            }
        };

        tracing::debug!(
            ?source,
            "Search context ready: {} documents, {} terms",
            documents.len(),
            index.term_count()
        );

        Ok(Self {
            index,
            documents,
            config,
            source,
        })
    }

    /// Runs one query and renders its outcome.
    ///
    /// Query errors are logged and reported as [`SearchOutcome::Failed`];
    /// they never propagate.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::EmptyQuery;
        }

        let query = apply_fuzziness(query, self.config.fuzziness);
        let hits = match self.index.search(&query) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!("Search for '{}' failed: {}", query, e);
                return SearchOutcome::Failed;
            }
        };

        let results: Vec<SearchResult> = hits
            .iter()
            .filter_map(|hit| {
                let document = hit.position().and_then(|p| self.documents.get(p));
                if document.is_none() {
                    tracing::warn!("Hit '{}' has no matching document", hit.doc_ref);
                }
                document.map(|d| SearchResult::from_hit(d, hit, self.config.pad_chars))
            })
            .collect();

        tracing::debug!("Query '{}' matched {} documents", query, results.len());

        if results.is_empty() {
            SearchOutcome::NoResults
        } else {
            SearchOutcome::Results(results)
        }
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn source(&self) -> IndexSource {
        self.source
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// `url#ref` for the document at `position`.
    pub fn url_for(&self, position: usize) -> Option<String> {
        self.documents
            .get(position)
            .map(|d| format!("{}#{}", d.url, d.doc_ref))
    }
}

type SharedContextFuture = Shared<BoxFuture<'static, Result<Arc<SearchContext>, Arc<PageError>>>>;

/// A context being loaded in the background.
///
/// Cloning is cheap; every clone awaits the same single load.
#[derive(Clone)]
pub struct IndexHandle {
    future: SharedContextFuture,
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("ready", &self.future.peek().is_some())
            .finish()
    }
}

impl IndexHandle {
    /// Starts loading `payload` on the blocking pool. Must be called inside a
    /// Tokio runtime.
    pub fn spawn(payload: String, config: SearchConfig) -> Self {
        let task = tokio::task::spawn_blocking(move || SearchContext::from_payload(&payload, config));

        let future: BoxFuture<'static, Result<Arc<SearchContext>, Arc<PageError>>> =
            Box::pin(async move {
                match task.await {
                    Ok(Ok(context)) => Ok(Arc::new(context)),
                    Ok(Err(e)) => Err(Arc::new(e)),
                    Err(e) => Err(Arc::new(PageError::Load(e.to_string()))),
                }
            });

        Self {
            future: future.shared(),
        }
    }

    /// Waits for the load to finish.
    pub async fn ready(&self) -> Result<Arc<SearchContext>, Arc<PageError>> {
        self.future.clone().await
    }
}
