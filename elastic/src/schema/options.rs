//! Custom definition options with representation-insensitive keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalize a key: surrounding whitespace and a leading `:` are dropped
/// and ASCII letters are lowercased, so `:Foo`, `"foo"` and `"FOO"` all
/// address the same entry.
pub fn canonical_key(key: &str) -> String {
    let key = key.trim();
    key.strip_prefix(':').unwrap_or(key).to_ascii_lowercase()
}

/// String-keyed options attached to a Definition.
///
/// Mutation is only reachable through [`crate::DefinitionBuilder`]; a frozen
/// [`crate::Definition`] hands out shared references only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomOptions {
    entries: IndexMap<String, Value>,
}

impl CustomOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one stored under the same key.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(canonical_key(key.as_ref()), value.into())
    }

    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        self.entries.get(&canonical_key(key.as_ref()))
    }

    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.entries.contains_key(&canonical_key(key.as_ref()))
    }

    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<Value> {
        self.entries.shift_remove(&canonical_key(key.as_ref()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for CustomOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = CustomOptions::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}
