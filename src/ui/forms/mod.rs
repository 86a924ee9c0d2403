//! Form rendering module
//!
//! - `field_renderer`: Field rendering utilities
//! - `create_form`: The create form with its submit actions

mod create_form;
mod field_renderer;

pub use create_form::draw_create;
