//! Workflow state: submitted data, records, and forms

mod form_data;
mod forms;
mod record;

pub use form_data::*;
pub use forms::*;
pub use record::*;
