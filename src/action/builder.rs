//! Building the unpersisted record from entity fields

use crate::error::CreateError;
use crate::state::{FormData, ModelDefinition, Record};
use crate::translatable::TranslatableContentDriver;

/// Instantiate a new record of `model` from `entity_fields`. A translatable
/// content driver, when present, takes over construction entirely.
pub fn build_record(
    model: &ModelDefinition,
    entity_fields: FormData,
    translatable: Option<&dyn TranslatableContentDriver>,
) -> Result<Record, CreateError> {
    if let Some(driver) = translatable {
        return driver.make_record(model, entity_fields);
    }

    let mut record = Record::new(model);
    record.fill(model, entity_fields)?;
    Ok(record)
}
