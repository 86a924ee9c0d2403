//! Splitting submitted data into entity fields and pivot fields

use crate::state::{FormData, PivotData};
use std::collections::BTreeSet;

/// Split `data` into the fields that belong on the record and the fields that
/// belong on the join row. Key order is preserved in both halves.
pub fn partition(data: FormData, pivot_columns: &BTreeSet<String>) -> (FormData, PivotData) {
    if pivot_columns.is_empty() {
        return (data, PivotData::new());
    }
    let (entity, pivot) = data.split_off(pivot_columns);
    (entity, PivotData::from(pivot))
}
