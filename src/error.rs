//! Error types for the create workflow and its storage collaborator

use thiserror::Error;

/// Failures reported by a record store or relationship handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("failed to write to `{table}`: {reason}")]
    WriteFailed { table: String, reason: String },

    #[error("`{operation}` is not supported by a {relation} relationship")]
    Unsupported {
        operation: &'static str,
        relation: &'static str,
    },

    #[error("record `{model}` has no key; it must be persisted first")]
    MissingKey { model: String },
}

/// Failures surfaced by the create workflow to the calling UI layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    /// Input rejected before anything was written; shown inline on the form
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },

    /// Storage write failed; the form state is left as submitted
    #[error("failed to persist record: {0}")]
    Persistence(#[from] StoreError),

    #[error("invalid create action configuration: {0}")]
    Configuration(String),
}

impl CreateError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CreateError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if the submitted form state should be kept for a retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, CreateError::Persistence(_))
    }
}
