//! Persisting a new record along the path chosen by its classification

use super::classify::Classification;
use crate::error::CreateError;
use crate::state::{PivotData, Record};
use crate::store::{RecordStore, Relationship};

fn require_handle<'a>(
    relationship: Option<&'a dyn Relationship>,
    classification: &Classification,
) -> Result<&'a dyn Relationship, CreateError> {
    relationship.ok_or_else(|| {
        CreateError::Configuration(format!(
            "a {} relationship was classified but no handle was supplied",
            classification.label()
        ))
    })
}

/// Save `record` exactly once, through the store or the relationship.
/// On failure the record is dropped unpersisted.
pub async fn persist(
    mut record: Record,
    classification: &Classification,
    relationship: Option<&dyn Relationship>,
    store: &dyn RecordStore,
    pivot: &PivotData,
) -> Result<Record, CreateError> {
    match classification {
        Classification::None | Classification::Through => {
            store.insert(&mut record).await?;
        }
        Classification::Direct => {
            require_handle(relationship, classification)?
                .save(&mut record)
                .await?;
        }
        Classification::ManyToManyWithPivot { .. } => {
            require_handle(relationship, classification)?
                .save_with_pivot(&mut record, pivot)
                .await?;
        }
    }

    tracing::debug!(
        model = %record.model(),
        key = ?record.key(),
        path = classification.label(),
        "persisted record"
    );
    Ok(record)
}
