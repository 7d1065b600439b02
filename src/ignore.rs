//! Ignore-pattern matching.
//!
//! Paths matched here are exempt from downstream rule checks. Globs use
//! `globset` syntax with a literal separator, so `*` stays within one path
//! segment and `**` is needed to cross directories.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::ContextError;

#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnoreMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ContextError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| ContextError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.kind().to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ContextError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            reason: e.to_string(),
        })?;
        Ok(Self {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            set,
        })
    }

    /// A matcher that ignores nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    pub fn is_ignore(&self, path: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        self.set.is_match(path)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self::empty()
    }
}
