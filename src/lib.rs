//! Record creation workflow
//!
//! Splits a submitted form into entity and pivot fields, picks a persistence
//! path from the shape of the owning relationship, saves the record, and
//! drives the "create another" loop that keeps a form open between records.

pub mod action;
pub mod config;
pub mod error;
pub mod state;
pub mod store;
pub mod translatable;

pub use action::{ActionContext, CreateAction, Outcome, PreserveFields, SubmitArguments};
pub use config::ActionConfig;
pub use error::{CreateError, StoreError};
