//! In-memory record store and relationship handles backed by it

use super::traits::{RecordStore, RelationFieldSaver, RelationKind, Relationship};
use crate::error::StoreError;
use crate::state::{PivotData, Record, RecordKey};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// A row in a many-to-many join table
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRow {
    pub parent_key: RecordKey,
    pub related_key: RecordKey,
    pub pivot: PivotData,
}

#[derive(Debug, Default)]
struct Tables {
    records: HashMap<String, Vec<Record>>,
    join_rows: HashMap<String, Vec<JoinRow>>,
    failing: BTreeSet<String>,
    writes: usize,
}

impl Tables {
    fn check_writable(&self, table: &str) -> Result<(), StoreError> {
        if self.failing.contains(table) {
            return Err(StoreError::WriteFailed {
                table: table.to_string(),
                reason: "table is not writable".to_string(),
            });
        }
        Ok(())
    }

    fn insert(&mut self, record: &mut Record) {
        record.mark_persisted(RecordKey::generate(), Utc::now());
        self.records
            .entry(record.table().to_string())
            .or_default()
            .push(record.clone());
        self.writes += 1;
    }

    fn push_join_row(&mut self, table: &str, row: JoinRow) {
        self.join_rows.entry(table.to_string()).or_default().push(row);
        self.writes += 1;
    }
}

/// Process-local storage. Every operation takes the store lock once, so
/// multi-row writes are all-or-nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }

    /// Make every later write touching `table` fail
    pub async fn fail_writes_to(&self, table: &str) {
        self.lock().await.failing.insert(table.to_string());
    }

    pub async fn clear_failures(&self) {
        self.lock().await.failing.clear();
    }

    pub async fn records(&self, table: &str) -> Vec<Record> {
        self.lock()
            .await
            .records
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn join_rows(&self, table: &str) -> Vec<JoinRow> {
        self.lock()
            .await
            .join_rows
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of rows written so far, records and join rows alike
    pub async fn write_count(&self) -> usize {
        self.lock().await.writes
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &mut Record) -> Result<(), StoreError> {
        let mut tables = self.lock().await;
        tables.check_writable(record.table())?;
        tables.insert(record);
        tracing::debug!(table = %record.table(), key = ?record.key(), "inserted record");
        Ok(())
    }
}

fn require_key(record: &Record) -> Result<RecordKey, StoreError> {
    record.key().ok_or_else(|| StoreError::MissingKey {
        model: record.model().to_string(),
    })
}

/// Single-hop relation persisted with a foreign key write
#[derive(Debug, Clone)]
pub struct DirectRelation {
    store: Arc<MemoryStore>,
    kind: RelationKind,
    parent_key: RecordKey,
    parent_table: String,
    parent_model: String,
    foreign_key: String,
    morph_type: Option<String>,
}

impl DirectRelation {
    fn new(
        store: Arc<MemoryStore>,
        kind: RelationKind,
        parent: &Record,
        foreign_key: &str,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            store,
            kind,
            parent_key: require_key(parent)?,
            parent_table: parent.table().to_string(),
            parent_model: parent.model().to_string(),
            foreign_key: foreign_key.to_string(),
            morph_type: None,
        })
    }

    /// Children reference `parent` through `foreign_key`
    pub fn has_many(
        store: Arc<MemoryStore>,
        parent: &Record,
        foreign_key: &str,
    ) -> Result<Self, StoreError> {
        Self::new(store, RelationKind::HasMany, parent, foreign_key)
    }

    pub fn has_one(
        store: Arc<MemoryStore>,
        parent: &Record,
        foreign_key: &str,
    ) -> Result<Self, StoreError> {
        Self::new(store, RelationKind::HasOne, parent, foreign_key)
    }

    /// `parent` references the new record through its own `foreign_key`
    pub fn belongs_to(
        store: Arc<MemoryStore>,
        parent: &Record,
        foreign_key: &str,
    ) -> Result<Self, StoreError> {
        Self::new(store, RelationKind::BelongsTo, parent, foreign_key)
    }

    /// Children reference `parent` through `{name}_id` and `{name}_type`
    pub fn morph_many(
        store: Arc<MemoryStore>,
        parent: &Record,
        name: &str,
    ) -> Result<Self, StoreError> {
        Self::morph(store, RelationKind::MorphMany, parent, name)
    }

    pub fn morph_one(
        store: Arc<MemoryStore>,
        parent: &Record,
        name: &str,
    ) -> Result<Self, StoreError> {
        Self::morph(store, RelationKind::MorphOne, parent, name)
    }

    fn morph(
        store: Arc<MemoryStore>,
        kind: RelationKind,
        parent: &Record,
        name: &str,
    ) -> Result<Self, StoreError> {
        let mut relation = Self::new(store, kind, parent, &format!("{name}_id"))?;
        relation.morph_type = Some(format!("{name}_type"));
        Ok(relation)
    }
}

#[async_trait]
impl Relationship for DirectRelation {
    fn kind(&self) -> RelationKind {
        self.kind
    }

    async fn save(&self, record: &mut Record) -> Result<(), StoreError> {
        let mut tables = self.store.lock().await;

        if self.kind == RelationKind::BelongsTo {
            tables.check_writable(record.table())?;
            tables.check_writable(&self.parent_table)?;
            let parent_exists = tables
                .records
                .get(&self.parent_table)
                .is_some_and(|rows| rows.iter().any(|r| r.key() == Some(self.parent_key)));
            if !parent_exists {
                return Err(StoreError::WriteFailed {
                    table: self.parent_table.clone(),
                    reason: format!("parent {} not found", self.parent_key),
                });
            }

            tables.insert(record);
            let key = require_key(record)?;
            if let Some(parent) = tables
                .records
                .get_mut(&self.parent_table)
                .and_then(|rows| rows.iter_mut().find(|r| r.key() == Some(self.parent_key)))
            {
                parent.set_attribute(self.foreign_key.clone(), key);
            }
            tables.writes += 1;
            return Ok(());
        }

        tables.check_writable(record.table())?;
        record.set_attribute(self.foreign_key.clone(), self.parent_key);
        if let Some(morph_type) = &self.morph_type {
            record.set_attribute(morph_type.clone(), self.parent_model.clone());
        }
        tables.insert(record);
        Ok(())
    }
}

/// Many-to-many relation backed by a join table
#[derive(Debug, Clone)]
pub struct BelongsToManyRelation {
    store: Arc<MemoryStore>,
    parent_key: RecordKey,
    join_table: String,
    pivot_columns: BTreeSet<String>,
}

impl BelongsToManyRelation {
    pub fn new(
        store: Arc<MemoryStore>,
        parent: &Record,
        join_table: &str,
        pivot_columns: &[&str],
    ) -> Result<Self, StoreError> {
        Ok(Self {
            store,
            parent_key: require_key(parent)?,
            join_table: join_table.to_string(),
            pivot_columns: pivot_columns.iter().map(|c| c.to_string()).collect(),
        })
    }
}

#[async_trait]
impl Relationship for BelongsToManyRelation {
    fn kind(&self) -> RelationKind {
        RelationKind::BelongsToMany
    }

    fn pivot_columns(&self) -> Option<BTreeSet<String>> {
        Some(self.pivot_columns.clone())
    }

    async fn save(&self, record: &mut Record) -> Result<(), StoreError> {
        self.save_with_pivot(record, &PivotData::new()).await
    }

    async fn save_with_pivot(
        &self,
        record: &mut Record,
        pivot: &PivotData,
    ) -> Result<(), StoreError> {
        let mut tables = self.store.lock().await;
        tables.check_writable(record.table())?;
        tables.check_writable(&self.join_table)?;

        tables.insert(record);
        let related_key = require_key(record)?;
        tables.push_join_row(
            &self.join_table,
            JoinRow {
                parent_key: self.parent_key,
                related_key,
                pivot: pivot.clone(),
            },
        );
        Ok(())
    }
}

/// Multi-hop relation; records can't be saved through it
#[derive(Debug, Clone, Copy)]
pub struct ThroughRelation {
    kind: RelationKind,
}

impl ThroughRelation {
    pub fn has_many_through() -> Self {
        Self {
            kind: RelationKind::HasManyThrough,
        }
    }

    pub fn has_one_through() -> Self {
        Self {
            kind: RelationKind::HasOneThrough,
        }
    }
}

#[async_trait]
impl Relationship for ThroughRelation {
    fn kind(&self) -> RelationKind {
        self.kind
    }

    async fn save(&self, _record: &mut Record) -> Result<(), StoreError> {
        Err(StoreError::Unsupported {
            operation: "save",
            relation: self.kind.label(),
        })
    }
}

/// Attaches the keys held by a form field to the owner through a join table
#[derive(Debug, Clone)]
pub struct AttachKeys {
    store: Arc<MemoryStore>,
    join_table: String,
}

impl AttachKeys {
    pub fn new(store: Arc<MemoryStore>, join_table: &str) -> Self {
        Self {
            store,
            join_table: join_table.to_string(),
        }
    }

    fn parse_keys(&self, value: &Value) -> Result<Vec<RecordKey>, StoreError> {
        let items: &[Value] = match value {
            Value::Array(items) => items.as_slice(),
            Value::Null => &[],
            other => std::slice::from_ref(other),
        };
        items
            .iter()
            .filter(|item| !matches!(item, Value::String(s) if s.trim().is_empty()))
            .map(|item| {
                item.as_str()
                    .and_then(|s| Uuid::parse_str(s.trim()).ok())
                    .map(RecordKey)
                    .ok_or_else(|| StoreError::WriteFailed {
                        table: self.join_table.clone(),
                        reason: format!("invalid related key {item}"),
                    })
            })
            .collect()
    }
}

#[async_trait]
impl RelationFieldSaver for AttachKeys {
    async fn save(&self, owner: &Record, value: &Value) -> Result<(), StoreError> {
        let parent_key = require_key(owner)?;
        let keys = self.parse_keys(value)?;

        let mut tables = self.store.lock().await;
        tables.check_writable(&self.join_table)?;
        for related_key in keys {
            tables.push_join_row(
                &self.join_table,
                JoinRow {
                    parent_key,
                    related_key,
                    pivot: PivotData::new(),
                },
            );
        }
        Ok(())
    }
}
