pub mod cli;
pub mod compact;
pub mod config;
pub mod document;
pub mod error;
pub mod flat;
pub mod location;
pub mod page;
pub mod render;
pub mod search;
pub mod snippet;
pub mod store;
pub mod tracing;

pub use config::SearchConfig;
pub use document::DocumentRecord;
pub use page::{IndexHandle, IndexLoad, IndexSource, SearchContext, load_compact_index};
pub use render::{SearchOutcome, SearchResult};
pub use store::{build_payload, parse_payload};
