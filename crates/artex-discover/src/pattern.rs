//! Output pattern compilation.

use glob::{MatchOptions, Pattern};

use crate::error::{DiscoverError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled output pattern.
///
/// `*` matches any run of characters including `/`. Every other character,
/// `?` and `[` included, matches itself.
#[derive(Debug, Clone)]
pub struct OutputPattern {
    source: String,
    compiled: Pattern,
}

impl OutputPattern {
    /// Compile a configured pattern.
    pub fn new(source: &str) -> Result<Self> {
        let escaped = source
            .split('*')
            .map(Pattern::escape)
            .collect::<Vec<_>>();
        // Adjacent stars produce empty segments; dropping them collapses
        // `**` to `*` while keeping a leading or trailing star.
        let mut glob = String::with_capacity(source.len());
        for (i, segment) in escaped.iter().enumerate() {
            if i > 0 && !glob.ends_with('*') {
                glob.push('*');
            }
            glob.push_str(segment);
        }
        let compiled = Pattern::new(&glob).map_err(|source_err| DiscoverError::Pattern {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self {
            source: source.to_string(),
            compiled,
        })
    }

    /// The pattern as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `path` matches the whole pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.compiled.matches_with(path, MATCH_OPTIONS)
    }
}
