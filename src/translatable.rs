//! Multi-locale record construction

use crate::error::CreateError;
use crate::state::{FormData, ModelDefinition, Record};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Pluggable record construction for models with per-locale attributes
#[cfg_attr(test, mockall::automock)]
pub trait TranslatableContentDriver: Send + Sync {
    fn make_record(&self, model: &ModelDefinition, data: FormData) -> Result<Record, CreateError>;
}

/// Stores translatable attributes as `{ "<locale>": value }` objects keyed by
/// the active locale; other attributes are assigned as submitted.
#[derive(Debug, Clone)]
pub struct LocaleContentDriver {
    active_locale: String,
    translatable: BTreeSet<String>,
}

impl LocaleContentDriver {
    pub fn new(active_locale: &str, translatable: &[&str]) -> Self {
        Self {
            active_locale: active_locale.to_string(),
            translatable: translatable.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn active_locale(&self) -> &str {
        &self.active_locale
    }

    pub fn is_translatable(&self, attribute: &str) -> bool {
        self.translatable.contains(attribute)
    }
}

impl TranslatableContentDriver for LocaleContentDriver {
    fn make_record(&self, model: &ModelDefinition, data: FormData) -> Result<Record, CreateError> {
        if let Some(rejected) = data.keys().find(|attr| !model.is_fillable(attr)) {
            return Err(CreateError::validation(
                rejected,
                format!("attribute is not mass assignable on {}", model.name),
            ));
        }

        let (plain, translated) = data.split_off(&self.translatable);
        let mut record = Record::new(model);
        record.fill(model, plain)?;
        for (attribute, value) in translated {
            let mut locales = Map::new();
            locales.insert(self.active_locale.clone(), value);
            record.set_attribute(attribute, Value::Object(locales));
        }
        Ok(record)
    }
}
