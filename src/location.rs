//! Query text carried in the search page URL.
//!
//! The page reads its query from a `q` search parameter or, failing that,
//! from the URL fragment. Submitting a new query rewrites the fragment.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::Url;

/// File name of the standalone search page, relative to the docs root.
pub const SEARCH_PAGE: &str = "doc-search.html";

/// Characters left unescaped in the fragment, matching what browsers leave
/// alone when encoding a URI component.
const FRAGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Query text from `url`: the `q` parameter if present, else the decoded fragment.
///
/// Returns `None` when neither holds any text.
pub fn query_from_url(url: &Url) -> Option<String> {
    if let Some((_, q)) = url.query_pairs().find(|(k, _)| k == "q") {
        return Some(q.into_owned()).filter(|q| !q.is_empty());
    }

    let fragment = url.fragment()?;
    let decoded = percent_decode_str(fragment).decode_utf8_lossy().into_owned();
    Some(decoded).filter(|q| !q.is_empty())
}

/// `url` with the query moved into the fragment and any `q` parameter dropped.
pub fn url_with_query(url: &Url, query: &str) -> Url {
    let mut next = url.clone();

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "q")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        next.set_query(None);
    } else {
        next.query_pairs_mut().clear().extend_pairs(kept);
    }

    let encoded = utf8_percent_encode(query, FRAGMENT_ENCODE_SET).to_string();
    next.set_fragment(Some(&encoded));
    next
}

/// Relative link from a documentation page to the search page, ready for a
/// query to be appended.
///
/// `page_path` is the page's path relative to the docs root, e.g.
/// `"example_pkg/index.html"`.
pub fn search_page_href(page_path: &str) -> String {
    let depth = page_path.trim_start_matches('/').matches('/').count();
    format!("{}{}#", "../".repeat(depth), SEARCH_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[rstest]
    #[case("https://docs.example/doc-search.html?q=thing", Some("thing"))]
    #[case("https://docs.example/doc-search.html#thing", Some("thing"))]
    #[case("https://docs.example/doc-search.html?q=a+b#ignored", Some("a b"))]
    #[case("https://docs.example/doc-search.html#name%3Afoo%20bar", Some("name:foo bar"))]
    #[case("https://docs.example/doc-search.html", None)]
    #[case("https://docs.example/doc-search.html#", None)]
    #[case("https://docs.example/doc-search.html?q=", None)]
    fn reads_query(#[case] input: &str, #[case] expected: Option<&str>) {
        check!(query_from_url(&url(input)).as_deref() == expected);
    }

    #[test]
    fn writes_query_to_fragment() {
        let next = url_with_query(&url("https://docs.example/doc-search.html?q=old"), "+foo bar~1");
        check!(next.query().is_none());
        check!(next.fragment() == Some("%2Bfoo%20bar~1"));
        check!(query_from_url(&next).as_deref() == Some("+foo bar~1"));
    }

    #[test]
    fn keeps_unrelated_parameters() {
        let next = url_with_query(&url("https://docs.example/doc-search.html?v=2&q=old"), "x");
        check!(next.query() == Some("v=2"));
        check!(next.fragment() == Some("x"));
    }

    #[rstest]
    #[case("index.html", "doc-search.html#")]
    #[case("example_pkg/index.html", "../doc-search.html#")]
    #[case("example_pkg/sub/module.html", "../../doc-search.html#")]
    fn search_link_climbs_to_root(#[case] page: &str, #[case] expected: &str) {
        check!(search_page_href(page) == expected);
    }
}
