mod common;

use assert2::{check, let_assert};
use common::{PayloadFile, QUERIES, config, documents, payload, payload_file};
use docsearch::config::SearchConfig;
use docsearch::document::DocumentRecord;
use docsearch::location::{query_from_url, search_page_href, url_with_query};
use docsearch::{IndexHandle, IndexSource, SearchContext, SearchOutcome};
use rstest::rstest;
use url::Url;

/// Test: the top result for an identifier query links to its anchor.
#[rstest]
fn identifier_query_links_to_anchor(payload: String, config: SearchConfig) {
    let context = SearchContext::from_payload(&payload, config).unwrap();
    let_assert!(SearchOutcome::Results(results) = context.search("fetch"));
    check!(results[0].title == "example_pkg.net.fetch()");
    check!(results[0].href == "example_pkg/net.html#example_pkg.net.fetch");
}

/// Test: docstring matches are highlighted and escaped.
#[rstest]
fn docstring_match_highlighted(payload: String, config: SearchConfig) {
    let context = SearchContext::from_payload(&payload, config).unwrap();
    let_assert!(SearchOutcome::Results(results) = context.search("alike"));
    let_assert!(Some(snippet) = results[0].snippet.as_deref());
    check!(snippet.contains("<mark>alike</mark>"));
    check!(snippet.contains("&amp; score &lt;how&gt;"));
}

/// Test: the rebuilt fallback answers every query like the compact index.
#[rstest]
fn rebuilt_index_matches_compact(
    payload: String,
    documents: Vec<DocumentRecord>,
    config: SearchConfig,
) {
    let compact = SearchContext::from_payload(&payload, config.clone()).unwrap();
    let rebuilt = SearchContext::from_parts(None, documents, config).unwrap();
    check!(compact.source() == IndexSource::Compact);
    check!(rebuilt.source() == IndexSource::Rebuilt);

    for query in QUERIES {
        check!(compact.search(query) == rebuilt.search(query), "query '{}' diverged", query);
    }
}

/// Test: a truncated compact index still yields a working page.
#[rstest]
fn truncated_index_falls_back(payload: String, config: SearchConfig) {
    let (mut index, documents) = docsearch::parse_payload(&payload).unwrap();
    index["fieldVectors"] = serde_json::json!([]);

    let context = SearchContext::from_parts(Some(index), documents, config).unwrap();
    check!(context.source() == IndexSource::Rebuilt);
    let_assert!(SearchOutcome::Results(_) = context.search("client"));
}

/// Test: each outcome reports a distinct status line.
#[rstest]
fn outcomes_have_statuses(payload: String, config: SearchConfig) {
    let context = SearchContext::from_payload(&payload, config).unwrap();
    check!(context.search(" ").status() == docsearch::render::STATUS_EMPTY_QUERY);
    check!(context.search("zzzzzz").status() == docsearch::render::STATUS_NO_RESULTS);
    check!(context.search("bogus:field").status() == docsearch::render::STATUS_FAILED);
    check!(context.search("client").status().starts_with("Found "));
}

/// Test: a prohibited-only query lists every other document with zero score.
#[rstest]
fn negated_query_lists_remaining_documents(payload: String, config: SearchConfig) {
    let context = SearchContext::from_payload(&payload, config).unwrap();
    let total = context.documents().len();
    let_assert!(SearchOutcome::Results(results) = context.search("-client"));
    check!(results.len() < total);
    check!(results.iter().all(|r| r.score == 0.0));
    check!(results.iter().all(|r| r.title != "example_pkg.net.Client"));
}

/// Test: configured fuzziness widens plain terms.
#[rstest]
fn configured_fuzziness(payload: String) {
    let strict = SearchContext::from_payload(&payload, SearchConfig::default()).unwrap();
    let fuzzy =
        SearchContext::from_payload(&payload, SearchConfig::default().with_fuzziness(1)).unwrap();
    check!(strict.search("clent") == SearchOutcome::NoResults);
    let_assert!(SearchOutcome::Results(_) = fuzzy.search("clent"));
}

/// Test: the background handle loads a payload from disk once.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn handle_loads_payload_file(payload_file: PayloadFile, config: SearchConfig) {
    let payload = tokio::fs::read_to_string(&payload_file.path).await.unwrap();
    let handle = IndexHandle::spawn(payload, config);

    let other = handle.clone();
    let (a, b) = tokio::join!(handle.ready(), other.ready());
    let (a, b) = (a.unwrap(), b.unwrap());
    check!(std::sync::Arc::ptr_eq(&a, &b));
    let_assert!(SearchOutcome::Results(_) = a.search("config"));
}

/// Test: a query round-trips through the search page URL.
#[test]
fn query_round_trips_through_url() {
    let base = Url::parse("https://docs.example/").unwrap();
    let page = base.join(&search_page_href("example_pkg/index.html")).unwrap();
    check!(page.path() == "/doc-search.html");

    let next = url_with_query(&page, "+parse -fetch");
    check!(query_from_url(&next).as_deref() == Some("+parse -fetch"));
}
