//! Form domain layer
//!
//! Field value objects, an in-process schema form, and the `Form` contract
//! the create workflow drives.

mod field;
mod form_state;

pub use field::{FieldValue, FormField};
pub use form_state::{FieldNavigation, Form, FormModel, SchemaForm};

#[cfg(test)]
pub use form_state::MockForm;
