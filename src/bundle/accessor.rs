//! Typed accessors over [`InputBundle`] entries.
//!
//! Components read their inputs through these helpers instead of indexing the
//! map directly. Defaults are always explicit at the call site
//! (`str_or("title", "President")`), and required inputs fail with a
//! [`RenderError`] that names the key and suggests close matches.

use strsim::levenshtein;

use super::{BundleValue, InputBundle};
use crate::core::RenderError;

/// Maximum Levenshtein distance, as a percentage of the requested key length,
/// for a present key to be offered as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

impl InputBundle {
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(BundleValue::as_str)
    }

    /// String input with an explicit default for absent or `null` entries.
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(BundleValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.int(key).unwrap_or(default)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(BundleValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.bool(key).unwrap_or(default)
    }

    pub fn list(&self, key: &str) -> Option<&[BundleValue]> {
        match self.get(key) {
            Some(BundleValue::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn map(&self, key: &str) -> Option<&InputBundle> {
        match self.get(key) {
            Some(BundleValue::Map(bundle)) => Some(bundle),
            _ => None,
        }
    }

    /// Look up a required input. `null` counts as missing.
    pub fn require(&self, key: &str) -> Result<&BundleValue, RenderError> {
        match self.get(key) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(RenderError::MissingInput {
                key: key.to_string(),
                suggestions: self.similar_keys(key),
            }),
        }
    }

    pub fn require_str(&self, key: &str) -> Result<&str, RenderError> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| RenderError::InvalidInput {
            key: key.to_string(),
            expected: "a string",
            found: value.kind(),
        })
    }

    pub fn require_int(&self, key: &str) -> Result<i64, RenderError> {
        match self.require(key)? {
            BundleValue::Int(i) => Ok(*i),
            other => Err(RenderError::InvalidInput {
                key: key.to_string(),
                expected: "an integer",
                found: other.kind(),
            }),
        }
    }

    /// Present keys close to `target`, closest first, at most three.
    pub(crate) fn similar_keys(&self, target: &str) -> Vec<String> {
        let mut scored: Vec<_> = self.keys().map(|key| (key, levenshtein(target, key))).collect();
        scored.sort_by_key(|(_, dist)| *dist);

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(key, _)| key.to_string())
            .collect()
    }
}
