//! Shared fixtures for integration tests.
//!
//! Every fixture builds from the same small document corpus so results can be
//! compared between the compact and rebuilt index paths.

use docsearch::config::SearchConfig;
use docsearch::document::DocumentRecord;
use rstest::fixture;
use std::path::PathBuf;
use tempfile::TempDir;

/// A documentation corpus resembling a small package.
pub const CORPUS: &str = r#"[
    {"ref": "example_pkg", "doc": "An example package with several modules.", "url": "example_pkg/index.html", "func": false},
    {"ref": "example_pkg.parse", "doc": "Parse configuration text into a Config.", "url": "example_pkg/index.html", "func": true},
    {"ref": "example_pkg.Config", "doc": "Holds parsed configuration values.", "url": "example_pkg/index.html", "func": false},
    {"ref": "example_pkg.Config.get", "doc": "Look up one value by key. Returns None for missing keys.", "url": "example_pkg/index.html", "func": true},
    {"ref": "example_pkg.net.fetch", "doc": "Fetch a remote resource and parse the response body.", "url": "example_pkg/net.html", "func": true},
    {"ref": "example_pkg.net.Client", "doc": "A reusable network client with connection pooling.", "url": "example_pkg/net.html", "func": false},
    {"ref": "example_pkg.net.Client.close", "doc": "", "url": "example_pkg/net.html", "func": true},
    {"ref": "example_pkg.util.fuzzy_match", "doc": "Compare two strings & score <how> alike they are.", "url": "example_pkg/util.html", "func": true}
]"#;

/// Queries exercised against every index variant.
pub const QUERIES: &[&str] = &[
    "parse",
    "config",
    "Config",
    "client",
    "+parse -fetch",
    "-parse",
    "name:fetch",
    "doc:configuration",
    "pars*",
    "clent~1",
    "fuzzy_match",
    "response^5 body",
    "connection-pooling",
    "nothingmatches",
];

#[fixture]
pub fn documents() -> Vec<DocumentRecord> {
    docsearch::document::parse_documents(CORPUS).expect("corpus is valid")
}

#[fixture]
pub fn config() -> SearchConfig {
    SearchConfig::default()
}

#[fixture]
pub fn payload(config: SearchConfig) -> String {
    docsearch::build_payload(CORPUS, &config).expect("corpus builds")
}

/// A payload written to a temporary file, as the CLI consumes it.
#[allow(dead_code)] // Used by a subset of integration test crates
pub struct PayloadFile {
    _temp: TempDir,
    pub path: PathBuf,
}

#[fixture]
#[allow(dead_code)]
pub fn payload_file(payload: String) -> PayloadFile {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("search.json");
    std::fs::write(&path, payload).expect("write payload");
    PayloadFile { _temp: temp, path }
}
