//! Completion controller: the per-submission state machine
//!
//! A submission moves `Submitting -> Persisted -> {Looping, Terminal}`.
//! [`Cycle`] is the submitting phase, [`PersistedCycle`] owns the record
//! created by this submission until [`PersistedCycle::complete`] hands it back
//! as an [`Outcome`].

use super::lifecycle::ActionLifecycle;
use crate::error::CreateError;
use crate::state::{Form, FormData, FormModel, Record};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Submitting,
    Persisted,
    Looping,
    Terminal,
}

/// Which raw form values survive into the next "create another" cycle
#[derive(Clone)]
pub enum PreserveFields {
    /// Keep these keys; keys missing from the form are skipped
    Only(Vec<String>),
    Using(Arc<dyn Fn(&FormData) -> FormData + Send + Sync>),
}

impl PreserveFields {
    pub fn only<S: AsRef<str>>(fields: &[S]) -> Self {
        PreserveFields::Only(fields.iter().map(|f| f.as_ref().to_string()).collect())
    }

    pub fn using(selector: impl Fn(&FormData) -> FormData + Send + Sync + 'static) -> Self {
        PreserveFields::Using(Arc::new(selector))
    }

    pub fn select(&self, raw_state: &FormData) -> FormData {
        match self {
            PreserveFields::Only(fields) => {
                let missing: Vec<&str> = fields
                    .iter()
                    .map(String::as_str)
                    .filter(|f| !raw_state.contains_key(f))
                    .collect();
                if !missing.is_empty() {
                    tracing::debug!(?missing, "preserved fields absent from form state");
                }
                raw_state.only(fields.as_slice())
            }
            PreserveFields::Using(selector) => selector(raw_state),
        }
    }
}

impl fmt::Debug for PreserveFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreserveFields::Only(fields) => f.debug_tuple("Only").field(fields).finish(),
            PreserveFields::Using(_) => f.write_str("Using(..)"),
        }
    }
}

/// Data carried from one "create another" cycle into the next. A cycle is
/// non-terminal exactly when it holds one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContinuationState {
    pub preserved: FormData,
}

/// Result of a completed submission
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Terminal success; the caller may navigate away
    Created(Record),
    /// Halted for another submission; the form has been re-armed
    CreatedAnother(Record),
}

impl Outcome {
    pub fn record(&self) -> &Record {
        match self {
            Outcome::Created(record) | Outcome::CreatedAnother(record) => record,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            Outcome::Created(record) | Outcome::CreatedAnother(record) => record,
        }
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, Outcome::CreatedAnother(_))
    }
}

/// A submission before its record exists
#[derive(Debug)]
pub struct Cycle {
    continuation: Option<ContinuationState>,
}

impl Cycle {
    /// Enter `Submitting`. When another record was requested, capture the
    /// preserved subset of the form's raw state now, before anything is built.
    pub fn begin(another: bool, form: &dyn Form, preserve: Option<&PreserveFields>) -> Self {
        let continuation = another.then(|| ContinuationState {
            preserved: preserve
                .map(|p| p.select(&form.raw_state()))
                .unwrap_or_default(),
        });
        Self { continuation }
    }

    pub fn phase(&self) -> Phase {
        Phase::Submitting
    }

    pub fn continuation(&self) -> Option<&ContinuationState> {
        self.continuation.as_ref()
    }

    pub fn is_non_terminal(&self) -> bool {
        self.continuation.is_some()
    }

    /// Enter `Persisted`: bind the form to the new record and save its
    /// relationship-bound fields. A failure here leaves the record persisted.
    pub async fn persisted(
        self,
        record: Record,
        form: &mut dyn Form,
    ) -> Result<PersistedCycle, CreateError> {
        form.set_model(FormModel::Record(record.clone()));
        form.save_relationships().await?;
        Ok(PersistedCycle {
            continuation: self.continuation,
            current_record: Some(record),
        })
    }
}

/// A submission whose record has been persisted
#[derive(Debug)]
pub struct PersistedCycle {
    continuation: Option<ContinuationState>,
    current_record: Option<Record>,
}

impl PersistedCycle {
    pub fn phase(&self) -> Phase {
        Phase::Persisted
    }

    pub fn current_record(&self) -> Option<&Record> {
        self.current_record.as_ref()
    }

    pub fn is_non_terminal(&self) -> bool {
        self.continuation.is_some()
    }

    /// The phase `complete` will enter
    pub fn next_phase(&self) -> Phase {
        if self.continuation.is_some() {
            Phase::Looping
        } else {
            Phase::Terminal
        }
    }

    /// Enter `Looping` or `Terminal` and hand the record back
    pub fn complete(
        mut self,
        model_name: &str,
        form: &mut dyn Form,
        lifecycle: &mut dyn ActionLifecycle,
        notification_title: &str,
    ) -> Result<Outcome, CreateError> {
        let record = self.current_record.take().ok_or_else(|| {
            CreateError::Configuration("completed a cycle with no current record".to_string())
        })?;

        let Some(continuation) = self.continuation.take() else {
            tracing::debug!(model = %model_name, "create finished");
            lifecycle.success(notification_title);
            return Ok(Outcome::Created(record));
        };

        lifecycle.call_after();
        lifecycle.send_success_notification(notification_title);

        // Anonymize the form so relationships of the old record aren't loaded
        form.set_model(FormModel::Type(model_name.to_string()));
        form.fill();

        let mut state = form.raw_state();
        state.overlay(continuation.preserved);
        form.set_raw_state(state);

        tracing::debug!(model = %model_name, "form re-armed for another record");
        Ok(Outcome::CreatedAnother(record))
    }
}
