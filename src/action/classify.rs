//! Relationship classification

use crate::store::Relationship;
use std::collections::BTreeSet;

/// How a new record is persisted, decided once per submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No relationship; standalone insert
    None,
    /// Single-hop relation; foreign key write
    Direct,
    /// Join-table relation; record insert plus join row
    ManyToManyWithPivot { pivot_columns: BTreeSet<String> },
    /// Multi-hop relation; standalone insert
    Through,
}

impl Classification {
    /// Columns to move out of the entity fields
    pub fn pivot_columns(&self) -> Option<&BTreeSet<String>> {
        match self {
            Classification::ManyToManyWithPivot { pivot_columns } => Some(pivot_columns),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::None => "none",
            Classification::Direct => "direct",
            Classification::ManyToManyWithPivot { .. } => "many-to-many",
            Classification::Through => "through",
        }
    }
}

/// Classify a relationship handle by its shape
pub fn classify(handle: Option<&dyn Relationship>) -> Classification {
    let Some(handle) = handle else {
        return Classification::None;
    };

    let kind = handle.kind();
    if kind.is_through() {
        return Classification::Through;
    }

    match handle.pivot_columns() {
        Some(pivot_columns) => Classification::ManyToManyWithPivot { pivot_columns },
        None if kind.is_many_to_many() => Classification::ManyToManyWithPivot {
            pivot_columns: BTreeSet::new(),
        },
        None => Classification::Direct,
    }
}
