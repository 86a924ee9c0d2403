//! Main application state and logic

use crate::platform;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use record_create::action::{RecordingLifecycle, SubmitAction};
use record_create::state::{
    FieldNavigation, FieldValue, Form, FormData, FormField, FormModel, ModelDefinition, Record,
    SchemaForm,
};
use record_create::store::{DirectRelation, MemoryStore, RecordStore, Relationship};
use record_create::{
    ActionConfig, ActionContext, CreateAction, CreateError, PreserveFields, SubmitArguments,
};
use serde_json::Value;
use std::sync::Arc;

const TASK_MODEL: &str = "Task";

/// Main application state
pub struct App {
    store: Arc<MemoryStore>,
    action: CreateAction,
    pub form: SchemaForm,
    lifecycle: RecordingLifecycle,
    team: Record,
    created: Vec<Record>,
    stored_tasks: usize,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
    quit: bool,
}

impl App {
    pub async fn new(config: &ActionConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());

        let team_model = ModelDefinition::new("Team");
        let mut team = Record::new(&team_model);
        team.fill(&team_model, FormData::new().with("name", "Platform"))?;
        store.insert(&mut team).await?;

        let tasks: Arc<dyn Relationship> =
            Arc::new(DirectRelation::has_many(store.clone(), &team, "team_id")?);
        let action = CreateAction::new(
            ModelDefinition::new(TASK_MODEL).with_guarded(&["id"]),
            store.clone(),
        )
        .relationship(move || Some(tasks.clone()))
        .preserve_form_data_when_creating_another(PreserveFields::only(&["priority"]))
        .apply_config(config);

        tracing::info!(action = ?action, "create action ready");

        Ok(Self {
            store,
            action,
            form: task_form(),
            lifecycle: RecordingLifecycle::new(),
            team,
            created: Vec::new(),
            stored_tasks: 0,
            status_message: None,
            error_message: None,
            quit: false,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn team(&self) -> &Record {
        &self.team
    }

    pub fn created(&self) -> &[Record] {
        &self.created
    }

    /// Number of records the store holds for the task table
    pub fn stored_tasks(&self) -> usize {
        self.stored_tasks
    }

    pub fn submit_actions(&self) -> Vec<SubmitAction> {
        self.action.submit_actions()
    }

    pub fn can_create_another(&self) -> bool {
        self.action.can_create_another()
    }

    pub fn notification(&self) -> Option<&str> {
        self.lifecycle.last_notification()
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
            }
            KeyCode::Tab => self.form.next_field(),
            KeyCode::BackTab => self.form.prev_field(),
            // Keyboard shortcuts (work from any field)
            KeyCode::Char('s') if platform::is_shortcut(key.modifiers) => {
                self.submit(false).await;
            }
            KeyCode::Char('n') if platform::is_shortcut(key.modifiers) => {
                if self.can_create_another() {
                    self.submit(true).await;
                } else {
                    tracing::debug!("create another is not offered, ignoring shortcut");
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.form.get_active_field_mut() {
                    field.push_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.form.get_active_field_mut() {
                    field.pop_char();
                }
            }
            KeyCode::Enter => {
                // Enter in a multiline field adds a newline
                if self.form.is_active_field_multiline() {
                    if let Some(field) = self.form.get_active_field_mut() {
                        field.push_char('\n');
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Submit the form through the create action
    async fn submit(&mut self, another: bool) {
        self.error_message = None;
        let ctx = ActionContext::new(&mut self.form, &mut self.lifecycle);
        match self.action.execute(SubmitArguments { another }, ctx).await {
            Ok(outcome) => {
                let title = outcome
                    .record()
                    .attribute("title")
                    .and_then(Value::as_str)
                    .unwrap_or("record")
                    .to_string();
                let halted = outcome.is_halted();
                self.created.push(outcome.into_record());
                self.stored_tasks = self.store.records(&self.action.model().table).await.len();
                if halted {
                    self.status_message =
                        Some(format!("\"{title}\" created! Ready for the next one."));
                } else {
                    self.status_message = Some(format!("\"{title}\" created!"));
                    self.reopen_form();
                }
            }
            Err(err) => self.push_error(&err),
        }
    }

    /// Start a fresh create form after a terminal submission
    fn reopen_form(&mut self) {
        self.form.set_model(FormModel::Type(TASK_MODEL.to_string()));
        self.form.fill();
    }

    fn push_error(&mut self, err: &CreateError) {
        tracing::warn!(error = %err, "create failed");
        let hint = if err.is_retryable() {
            " (try again)"
        } else {
            ""
        };
        self.error_message = Some(format!("{err}{hint}"));
    }
}

fn task_form() -> SchemaForm {
    SchemaForm::new(
        TASK_MODEL,
        vec![
            FormField::text("title", "Title", false).required(),
            FormField::text("description", "Description", true),
            FormField::number("priority", "Priority").default_value(FieldValue::Number(Some(2))),
            FormField::toggle("urgent", "Urgent (space)"),
        ],
    )
}
