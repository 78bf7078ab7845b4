//! Key/value tag maps for Cloud Map resources
//!
//! Tags are an unordered `key -> value` mapping. [`KeyValueTags`] stores them
//! in a `BTreeMap` so equality and display never depend on insertion order.
//!
//! Two filters hide tags from the local record:
//!
//! | Filter | Drops |
//! |--------|-------|
//! | [`KeyValueTags::ignore_aws`] | keys starting with `aws:` (reserved by AWS) |
//! | [`KeyValueTags::ignore_config`] | keys listed in an [`IgnoreTagsConfig`] |

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Prefix of tag keys reserved for AWS-managed tags
pub const AWS_TAG_PREFIX: &str = "aws:";

/// A set of resource tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyValueTags(BTreeMap<String, String>);

/// Provider-wide rules for tags that should be invisible to the local record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreTagsConfig {
    /// Exact keys to ignore
    #[serde(default)]
    pub keys: BTreeSet<String>,
    /// Key prefixes to ignore
    #[serde(default)]
    pub key_prefixes: Vec<String>,
}

/// Changes needed to turn one tag set into another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    /// Tags that are new or whose value changed
    pub upsert: KeyValueTags,
    /// Keys that must be removed
    pub remove: Vec<String>,
}

/// Error parsing a `key=value` tag argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    #[error("tag {0:?} must have the form key=value")]
    MissingSeparator(String),

    #[error("tag key cannot be empty in {0:?}")]
    EmptyKey(String),
}

impl KeyValueTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Drop tags whose key starts with the reserved `aws:` prefix.
    pub fn ignore_aws(mut self) -> Self {
        self.0.retain(|k, _| !k.starts_with(AWS_TAG_PREFIX));
        self
    }

    /// Drop tags matched by the provider's ignore rules.
    pub fn ignore_config(mut self, config: &IgnoreTagsConfig) -> Self {
        if !config.is_empty() {
            self.0.retain(|k, _| !config.ignores(k));
        }
        self
    }

    /// Compute the changes that turn `self` into `new`.
    ///
    /// Keys are upserted when missing from `self` or mapped to a different
    /// value; keys present in `self` but absent from `new` are removed.
    pub fn diff(&self, new: &KeyValueTags) -> TagDiff {
        let upsert = new
            .0
            .iter()
            .filter(|(k, v)| self.0.get(*k) != Some(*v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let remove = self
            .0
            .keys()
            .filter(|k| !new.0.contains_key(*k))
            .cloned()
            .collect();

        TagDiff { upsert, remove }
    }

    /// Parse a single `key=value` argument. The value may be empty and may
    /// itself contain `=`.
    pub fn parse_pair(s: &str) -> Result<(String, String), TagParseError> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| TagParseError::MissingSeparator(s.to_string()))?;
        if key.is_empty() {
            return Err(TagParseError::EmptyKey(s.to_string()));
        }
        Ok((key.to_string(), value.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueTags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for KeyValueTags {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl std::fmt::Display for KeyValueTags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (k, v) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}

impl IgnoreTagsConfig {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.key_prefixes.is_empty()
    }

    /// Whether a tag key is hidden by these rules
    pub fn ignores(&self, key: &str) -> bool {
        self.keys.contains(key) || self.key_prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.upsert.is_empty() && self.remove.is_empty()
    }

    /// Apply this diff to a tag set.
    #[cfg(test)]
    pub(crate) fn apply(&self, tags: &KeyValueTags) -> KeyValueTags {
        let mut out = tags.clone();
        for key in &self.remove {
            out.0.remove(key);
        }
        for (k, v) in self.upsert.iter() {
            out.insert(k, v);
        }
        out
    }
}
