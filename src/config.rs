//! Search configuration shared by the build step and the page runtime.

use crate::error::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Characters of context kept on each side of a highlighted match.
pub const DEFAULT_PAD_CHARS: usize = 30;

/// Tunables for index construction and query execution.
///
/// Loaded from a TOML file such as:
///
/// ```toml
/// fuzziness = 1
/// index_docstrings = true
/// pad_chars = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Edit distance appended to every query term that has none of its own.
    pub fuzziness: u32,
    /// When false, docstrings are neither indexed nor shipped in the payload.
    pub index_docstrings: bool,
    /// Snippet context width around each match.
    pub pad_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzziness: 0,
            index_docstrings: true,
            pad_chars: DEFAULT_PAD_CHARS,
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse search configuration")
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read search configuration at {}", path.display()))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(?config, "Loaded search configuration from {}", path.display());
        Ok(config)
    }

    /// Override the edit distance.
    pub const fn with_fuzziness(mut self, fuzziness: u32) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    /// Override whether docstrings are indexed.
    pub const fn with_index_docstrings(mut self, index_docstrings: bool) -> Self {
        self.index_docstrings = index_docstrings;
        self
    }
}
