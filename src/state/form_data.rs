//! Submitted form values and pivot attributes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Field name to raw value, in submission order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(IndexMap<String, Value>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, keeping the key's original position if it already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Restrict to the given keys. Keys absent from the data are skipped.
    pub fn only<S: AsRef<str>>(&self, keys: &[S]) -> FormData {
        let wanted: BTreeSet<&str> = keys.iter().map(AsRef::as_ref).collect();
        self.0
            .iter()
            .filter(|(k, _)| wanted.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Split into (kept, taken) where `taken` holds every key in `keys`
    pub fn split_off(self, keys: &BTreeSet<String>) -> (FormData, FormData) {
        let mut kept = FormData::new();
        let mut taken = FormData::new();
        for (key, value) in self.0 {
            if keys.contains(&key) {
                taken.0.insert(key, value);
            } else {
                kept.0.insert(key, value);
            }
        }
        (kept, taken)
    }

    /// Overlay `other` onto this data; keys in `other` win
    pub fn overlay(&mut self, other: FormData) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.0
    }
}

impl From<IndexMap<String, Value>> for FormData {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FormData {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Values destined for the join table of a many-to-many relationship
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PivotData(FormData);

impl PivotData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter()
    }

    pub fn into_form_data(self) -> FormData {
        self.0
    }
}

impl From<FormData> for PivotData {
    fn from(data: FormData) -> Self {
        Self(data)
    }
}
