//! The create-record workflow
//!
//! - `partition`: splits submitted data into entity and pivot fields
//! - `classify`: decides the persistence path from a relationship's shape
//! - `builder`: instantiates the unpersisted record
//! - `persist`: saves it along the chosen path
//! - `completion`: the submit / persisted / looping / terminal state machine
//! - `create`: the configurable action tying them together

mod builder;
mod classify;
mod completion;
mod create;
mod lifecycle;
mod partition;
mod persist;

pub use builder::build_record;
pub use classify::{classify, Classification};
pub use completion::{ContinuationState, Cycle, Outcome, PersistedCycle, Phase, PreserveFields};
pub use create::{
    ActionContext, CreateAction, CreateAnother, RelationshipResolver, SubmitAction,
    SubmitArguments,
};
pub use lifecycle::{ActionLifecycle, LifecycleEvent, RecordingLifecycle};
pub use partition::partition;
pub use persist::persist;

#[cfg(test)]
pub use lifecycle::MockActionLifecycle;
