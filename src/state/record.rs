//! Model definitions and the dynamic records built from them

use crate::error::CreateError;
use crate::state::FormData;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Describes a record type and which attributes may be bulk-assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub table: String,
    /// When set, only these attributes may be mass assigned
    pub fillable: Option<BTreeSet<String>>,
    /// Never mass assignable, even if listed as fillable
    pub guarded: BTreeSet<String>,
}

impl ModelDefinition {
    /// Create a model whose table defaults to the lowercased name plus "s"
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            table: format!("{}s", name.to_lowercase()),
            fillable: None,
            guarded: BTreeSet::new(),
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn with_fillable(mut self, attributes: &[&str]) -> Self {
        self.fillable = Some(attributes.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn with_guarded(mut self, attributes: &[&str]) -> Self {
        self.guarded = attributes.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn is_fillable(&self, attribute: &str) -> bool {
        if self.guarded.contains(attribute) {
            return false;
        }
        self.fillable
            .as_ref()
            .map_or(true, |fillable| fillable.contains(attribute))
    }
}

/// Identity assigned to a record when it is first persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey(pub Uuid);

impl RecordKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<RecordKey> for Value {
    fn from(key: RecordKey) -> Self {
        Value::String(key.0.to_string())
    }
}

/// A dynamic record of some model type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    model: String,
    table: String,
    key: Option<RecordKey>,
    attributes: IndexMap<String, Value>,
    created_at: Option<DateTime<Utc>>,
}

impl Record {
    /// A blank, unpersisted record of the given model
    pub fn new(model: &ModelDefinition) -> Self {
        Self {
            model: model.name.clone(),
            table: model.table.clone(),
            key: None,
            attributes: IndexMap::new(),
            created_at: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key(&self) -> Option<RecordKey> {
        self.key
    }

    pub fn exists(&self) -> bool {
        self.key.is_some()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Bulk-assign attributes, rejecting the whole batch if any attribute is
    /// not mass assignable on `model`
    pub fn fill(&mut self, model: &ModelDefinition, data: FormData) -> Result<(), CreateError> {
        if let Some(rejected) = data.keys().find(|attr| !model.is_fillable(attr)) {
            return Err(CreateError::validation(
                rejected,
                format!("attribute is not mass assignable on {}", model.name),
            ));
        }
        for (attribute, value) in data {
            self.attributes.insert(attribute, value);
        }
        Ok(())
    }

    /// Set a single attribute, bypassing mass-assignment rules
    pub fn set_attribute(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(attribute.into(), value.into());
    }

    pub fn attribute(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn mark_persisted(&mut self, key: RecordKey, at: DateTime<Utc>) {
        self.key = Some(key);
        self.created_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post_model() -> ModelDefinition {
        ModelDefinition::new("Post").with_guarded(&["id"])
    }

    #[test]
    fn test_default_table_name() {
        assert_eq!(ModelDefinition::new("Post").table, "posts");
        assert_eq!(
            ModelDefinition::new("Person").with_table("people").table,
            "people"
        );
    }

    #[test]
    fn test_guarded_wins_over_fillable() {
        let model = ModelDefinition::new("Post")
            .with_fillable(&["title", "id"])
            .with_guarded(&["id"]);
        assert!(model.is_fillable("title"));
        assert!(!model.is_fillable("id"));
        assert!(!model.is_fillable("body"));
    }

    #[test]
    fn test_new_record_is_not_persisted() {
        let record = Record::new(&post_model());
        assert!(!record.exists());
        assert!(record.key().is_none());
        assert!(record.created_at().is_none());
        assert_eq!(record.model(), "Post");
        assert_eq!(record.table(), "posts");
    }

    #[test]
    fn test_fill_assigns_attributes() {
        let mut record = Record::new(&post_model());
        record
            .fill(&post_model(), FormData::new().with("title", "Hello"))
            .unwrap();
        assert_eq!(record.attribute("title"), Some(&json!("Hello")));
    }

    #[test]
    fn test_fill_rejects_guarded_without_partial_assignment() {
        let mut record = Record::new(&post_model());
        let data = FormData::new().with("title", "Hello").with("id", 7);
        let err = record.fill(&post_model(), data).unwrap_err();
        assert!(matches!(err, CreateError::Validation { ref field, .. } if field == "id"));
        assert!(record.attribute("title").is_none());
    }

    #[test]
    fn test_set_attribute_bypasses_guard() {
        let mut record = Record::new(&post_model());
        record.set_attribute("id", 7);
        assert_eq!(record.attribute("id"), Some(&json!(7)));
    }

    #[test]
    fn test_mark_persisted() {
        let mut record = Record::new(&post_model());
        let key = RecordKey::generate();
        record.mark_persisted(key, Utc::now());
        assert!(record.exists());
        assert_eq!(record.key(), Some(key));
    }
}
