//! Query parameters passed to fetch sources and used to derive cache keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Query Params ==
/// Ordered set of request parameters.
///
/// Keys are kept sorted so serialization is canonical: two parameter sets with
/// the same entries always render to the same JSON and the same cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a parameter, returning the previous value for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    // == Merge ==
    /// Copies every entry of `other` into `self`; entries of `other` win.
    pub fn merge(&mut self, other: &QueryParams) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Returns `self` overlaid with `other`.
    pub fn merged(&self, other: &QueryParams) -> QueryParams {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Compact JSON object with keys in sorted order.
    pub fn to_canonical_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    // == Query Pairs ==
    /// Renders the parameters as URL query pairs.
    ///
    /// Strings are passed through unquoted, nulls are skipped, everything else
    /// is rendered as JSON.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), rendered)
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
