//! Storage collaborators: the record store, relationship handles, and an
//! in-memory implementation of both

mod memory;
mod traits;

pub use memory::{AttachKeys, BelongsToManyRelation, DirectRelation, JoinRow, MemoryStore, ThroughRelation};
pub use traits::{RecordStore, RelationFieldSaver, RelationKind, Relationship};

#[cfg(test)]
pub use traits::{MockRecordStore, MockRelationFieldSaver, MockRelationship};
