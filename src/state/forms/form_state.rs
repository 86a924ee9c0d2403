//! Form state management and the form engine contract

use super::field::FormField;
use crate::error::{CreateError, StoreError};
use crate::state::{FormData, Record};
use crate::store::RelationFieldSaver;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// What the form is currently bound to
#[derive(Debug, Clone, PartialEq)]
pub enum FormModel {
    /// A model type with no identity; relationships are not loaded
    Type(String),
    Record(Record),
}

impl FormModel {
    pub fn record(&self) -> Option<&Record> {
        match self {
            FormModel::Type(_) => None,
            FormModel::Record(record) => Some(record),
        }
    }
}

/// Contract the create workflow uses to talk to a form engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Form: Send {
    /// Current values, unvalidated, including keys not bound to a field
    fn raw_state(&self) -> FormData;

    /// Validated values to build a record from. Relationship-bound fields are excluded.
    fn state(&self) -> Result<FormData, CreateError>;

    fn set_model(&mut self, model: FormModel);

    /// Reset every field to its default
    fn fill(&mut self);

    fn set_raw_state(&mut self, state: FormData);

    /// Persist relationship-bound fields; the form must be bound to a persisted record
    async fn save_relationships(&mut self) -> Result<(), StoreError>;
}

/// Trait for keyboard navigation between fields
pub trait FieldNavigation {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
}

/// An in-process form built from a list of fields
#[derive(Clone)]
pub struct SchemaForm {
    pub fields: Vec<FormField>,
    pub active_field_index: usize,
    model: FormModel,
    /// Raw state keys that no field is bound to
    extra: FormData,
    relationships: HashMap<String, Arc<dyn RelationFieldSaver>>,
}

impl std::fmt::Debug for SchemaForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaForm")
            .field("fields", &self.fields)
            .field("active_field_index", &self.active_field_index)
            .field("model", &self.model)
            .field("extra", &self.extra)
            .field("relationships", &self.relationships.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaForm {
    pub fn new(model_name: &str, fields: Vec<FormField>) -> Self {
        Self {
            fields,
            active_field_index: 0,
            model: FormModel::Type(model_name.to_string()),
            extra: FormData::new(),
            relationships: HashMap::new(),
        }
    }

    /// Register the saver used for fields bound to `name`
    pub fn bind_relationship(mut self, name: &str, saver: Arc<dyn RelationFieldSaver>) -> Self {
        self.relationships.insert(name.to_string(), saver);
        self
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.active_field_index)
    }

    pub fn is_active_field_multiline(&self) -> bool {
        self.fields
            .get(self.active_field_index)
            .is_some_and(|f| f.is_multiline)
    }
}

impl FieldNavigation for SchemaForm {
    fn field_count(&self) -> usize {
        self.fields.len()
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.fields.len().saturating_sub(1));
    }
}

#[async_trait]
impl Form for SchemaForm {
    fn raw_state(&self) -> FormData {
        let mut state: FormData = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.value.to_json()))
            .collect();
        state.overlay(self.extra.clone());
        state
    }

    fn state(&self) -> Result<FormData, CreateError> {
        if let Some(missing) = self.fields.iter().find(|f| f.required && f.value.is_blank()) {
            return Err(CreateError::validation(&missing.name, "is required"));
        }
        let mut state: FormData = self
            .fields
            .iter()
            .filter(|f| f.relationship.is_none())
            .map(|f| (f.name.clone(), f.value.to_json()))
            .collect();
        state.overlay(self.extra.clone());
        Ok(state)
    }

    fn set_model(&mut self, model: FormModel) {
        self.model = model;
    }

    fn fill(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
        self.extra = FormData::new();
        self.active_field_index = 0;
    }

    fn set_raw_state(&mut self, state: FormData) {
        let mut extra = FormData::new();
        for (key, value) in state {
            match self.field_mut(&key) {
                Some(field) => field.set_raw(&value),
                None => {
                    extra.insert(key, value);
                }
            }
        }
        self.extra = extra;
    }

    async fn save_relationships(&mut self) -> Result<(), StoreError> {
        let owner = match &self.model {
            FormModel::Record(record) if record.exists() => record,
            FormModel::Record(record) => {
                return Err(StoreError::MissingKey {
                    model: record.model().to_string(),
                })
            }
            FormModel::Type(name) => return Err(StoreError::MissingKey { model: name.clone() }),
        };

        for field in &self.fields {
            let Some(relationship) = &field.relationship else {
                continue;
            };
            let Some(saver) = self.relationships.get(relationship) else {
                tracing::warn!(
                    field = %field.name,
                    relationship = %relationship,
                    "no saver bound for relationship field, skipping"
                );
                continue;
            };
            saver.save(owner, &field.value.to_json()).await?;
        }
        Ok(())
    }
}
