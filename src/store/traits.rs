//! Trait abstraction for storage collaborators to enable mocking in tests

use crate::error::StoreError;
use crate::state::{PivotData, Record};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;

/// Shape of an association between a parent record and the record being created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    HasOne,
    HasMany,
    BelongsTo,
    MorphOne,
    MorphMany,
    BelongsToMany,
    MorphToMany,
    HasOneThrough,
    HasManyThrough,
}

impl RelationKind {
    /// Multi-hop relations with no join rows of their own
    pub fn is_through(&self) -> bool {
        matches!(self, Self::HasOneThrough | Self::HasManyThrough)
    }

    pub fn is_many_to_many(&self) -> bool {
        matches!(self, Self::BelongsToMany | Self::MorphToMany)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::HasOne => "has-one",
            Self::HasMany => "has-many",
            Self::BelongsTo => "belongs-to",
            Self::MorphOne => "morph-one",
            Self::MorphMany => "morph-many",
            Self::BelongsToMany => "belongs-to-many",
            Self::MorphToMany => "morph-to-many",
            Self::HasOneThrough => "has-one-through",
            Self::HasManyThrough => "has-many-through",
        }
    }
}

/// Standalone record persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record, assigning its key
    async fn insert(&self, record: &mut Record) -> Result<(), StoreError>;
}

/// A parent record's association, used to attach newly created records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Relationship: Send + Sync {
    fn kind(&self) -> RelationKind;

    /// Join-table columns, present only for relations backed by a join table
    fn pivot_columns(&self) -> Option<BTreeSet<String>> {
        None
    }

    /// Attach and insert the record through the relation (foreign key write)
    async fn save(&self, record: &mut Record) -> Result<(), StoreError>;

    /// Insert the record and its join row. Both writes succeed or neither does.
    async fn save_with_pivot(
        &self,
        record: &mut Record,
        pivot: &PivotData,
    ) -> Result<(), StoreError> {
        let _ = (record, pivot);
        Err(StoreError::Unsupported {
            operation: "save_with_pivot",
            relation: self.kind().label(),
        })
    }
}

/// Saves a relationship-bound form field once its owner record exists
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationFieldSaver: Send + Sync {
    async fn save(&self, owner: &Record, value: &Value) -> Result<(), StoreError>;
}
