//! The create action: configuration plus the submission workflow

use super::builder::build_record;
use super::classify::classify;
use super::completion::{Cycle, Outcome, PreserveFields};
use super::lifecycle::ActionLifecycle;
use super::partition::partition;
use super::persist::persist;
use crate::config::ActionConfig;
use crate::error::CreateError;
use crate::state::{Form, ModelDefinition};
use crate::store::{RecordStore, Relationship};
use crate::translatable::TranslatableContentDriver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub type RelationshipResolver = Arc<dyn Fn() -> Option<Arc<dyn Relationship>> + Send + Sync>;

/// Whether the "create another" choice is offered
#[derive(Clone)]
pub enum CreateAnother {
    Enabled(bool),
    When(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl CreateAnother {
    fn evaluate(&self) -> bool {
        match self {
            CreateAnother::Enabled(enabled) => *enabled,
            CreateAnother::When(predicate) => predicate(),
        }
    }
}

impl fmt::Debug for CreateAnother {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateAnother::Enabled(enabled) => f.debug_tuple("Enabled").field(enabled).finish(),
            CreateAnother::When(_) => f.write_str("When(..)"),
        }
    }
}

/// Arguments sent with a submit button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitArguments {
    pub another: bool,
}

/// A submit button the modal footer should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAction {
    pub name: &'static str,
    pub arguments: SubmitArguments,
}

/// Collaborators for one submission
pub struct ActionContext<'a> {
    pub form: &'a mut dyn Form,
    pub lifecycle: &'a mut dyn ActionLifecycle,
    /// Relationship supplied by the surrounding table; wins over the action's own
    pub table_relationship: Option<Arc<dyn Relationship>>,
    pub translatable: Option<&'a dyn TranslatableContentDriver>,
}

impl<'a> ActionContext<'a> {
    pub fn new(form: &'a mut dyn Form, lifecycle: &'a mut dyn ActionLifecycle) -> Self {
        Self {
            form,
            lifecycle,
            table_relationship: None,
            translatable: None,
        }
    }

    pub fn with_table_relationship(mut self, relationship: Arc<dyn Relationship>) -> Self {
        self.table_relationship = Some(relationship);
        self
    }

    pub fn with_translatable(mut self, driver: &'a dyn TranslatableContentDriver) -> Self {
        self.translatable = Some(driver);
        self
    }
}

/// Creates records of one model from form submissions
#[derive(Clone)]
pub struct CreateAction {
    name: String,
    model: ModelDefinition,
    store: Arc<dyn RecordStore>,
    create_another: CreateAnother,
    preserve: Option<PreserveFields>,
    relationship: Option<RelationshipResolver>,
    recheck_create_another: bool,
    success_notification_title: String,
}

impl fmt::Debug for CreateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAction")
            .field("name", &self.name)
            .field("model", &self.model.name)
            .field("create_another", &self.create_another)
            .field("preserve", &self.preserve)
            .field("has_relationship", &self.relationship.is_some())
            .field("recheck_create_another", &self.recheck_create_another)
            .finish()
    }
}

impl CreateAction {
    pub const DEFAULT_NAME: &'static str = "create";
    pub const CREATE_ANOTHER_NAME: &'static str = "createAnother";
    pub const DEFAULT_SUCCESS_TITLE: &'static str = "Created";

    pub fn new(model: ModelDefinition, store: Arc<dyn RecordStore>) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            model,
            store,
            create_another: CreateAnother::Enabled(true),
            preserve: None,
            relationship: None,
            recheck_create_another: false,
            success_notification_title: Self::DEFAULT_SUCCESS_TITLE.to_string(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn create_another(mut self, enabled: bool) -> Self {
        self.create_another = CreateAnother::Enabled(enabled);
        self
    }

    pub fn create_another_when(
        mut self,
        predicate: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        self.create_another = CreateAnother::When(Arc::new(predicate));
        self
    }

    #[deprecated(note = "use `create_another` instead")]
    pub fn disable_create_another(self, disabled: bool) -> Self {
        self.create_another(!disabled)
    }

    #[deprecated(note = "use `create_another_when` instead")]
    pub fn disable_create_another_when(
        self,
        predicate: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        self.create_another_when(move || !predicate())
    }

    pub fn preserve_form_data_when_creating_another(mut self, preserve: PreserveFields) -> Self {
        self.preserve = Some(preserve);
        self
    }

    /// Resolve the relationship new records are attached through.
    /// Called on every submission.
    pub fn relationship(
        mut self,
        resolver: impl Fn() -> Option<Arc<dyn Relationship>> + Send + Sync + 'static,
    ) -> Self {
        self.relationship = Some(Arc::new(resolver));
        self
    }

    /// Ignore a stale "create another" request when the choice is no longer offered
    pub fn recheck_create_another_on_submit(mut self, recheck: bool) -> Self {
        self.recheck_create_another = recheck;
        self
    }

    pub fn success_notification_title(mut self, title: &str) -> Self {
        self.success_notification_title = title.to_string();
        self
    }

    /// Layer user configuration over the builder settings
    pub fn apply_config(mut self, config: &ActionConfig) -> Self {
        if let Some(enabled) = config.create_another {
            self = self.create_another(enabled);
        }
        if let Some(fields) = &config.preserve_fields {
            self.preserve = Some(PreserveFields::only(fields.as_slice()));
        }
        if let Some(recheck) = config.recheck_create_another {
            self.recheck_create_another = recheck;
        }
        if let Some(title) = &config.success_notification_title {
            self.success_notification_title = title.clone();
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &ModelDefinition {
        &self.model
    }

    pub fn notification_title(&self) -> &str {
        &self.success_notification_title
    }

    pub fn can_create_another(&self) -> bool {
        self.create_another.evaluate()
    }

    /// The action never keeps a record bound between submissions
    pub fn should_clear_record_after(&self) -> bool {
        true
    }

    pub fn get_relationship(&self) -> Option<Arc<dyn Relationship>> {
        self.relationship.as_ref().and_then(|resolve| resolve())
    }

    /// Submit buttons to offer, primary first
    pub fn submit_actions(&self) -> Vec<SubmitAction> {
        let mut actions = vec![SubmitAction {
            name: Self::DEFAULT_NAME,
            arguments: SubmitArguments { another: false },
        }];
        if self.can_create_another() {
            actions.push(SubmitAction {
                name: Self::CREATE_ANOTHER_NAME,
                arguments: SubmitArguments { another: true },
            });
        }
        actions
    }

    fn wants_another(&self, arguments: SubmitArguments) -> bool {
        if !arguments.another {
            return false;
        }
        if self.recheck_create_another && !self.can_create_another() {
            tracing::warn!(
                action = %self.name,
                "create another was requested but is no longer offered, finishing instead"
            );
            return false;
        }
        true
    }

    /// Handle one submission: build, persist, and complete
    pub async fn execute(
        &self,
        arguments: SubmitArguments,
        ctx: ActionContext<'_>,
    ) -> Result<Outcome, CreateError> {
        let another = self.wants_another(arguments);
        let cycle = Cycle::begin(another, &*ctx.form, self.preserve.as_ref());

        let data = ctx.form.state()?;

        let relationship = ctx
            .table_relationship
            .clone()
            .or_else(|| self.get_relationship());
        let classification = classify(relationship.as_deref());
        tracing::info!(
            action = %self.name,
            model = %self.model.name,
            relationship = classification.label(),
            another,
            "creating record"
        );

        let no_pivot = BTreeSet::new();
        let (entity_fields, pivot) =
            partition(data, classification.pivot_columns().unwrap_or(&no_pivot));
        let record = build_record(&self.model, entity_fields, ctx.translatable)?;
        let record = persist(
            record,
            &classification,
            relationship.as_deref(),
            self.store.as_ref(),
            &pivot,
        )
        .await?;

        let cycle = cycle.persisted(record, ctx.form).await?;
        cycle.complete(
            &self.model.name,
            ctx.form,
            ctx.lifecycle,
            &self.success_notification_title,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::lifecycle::{LifecycleEvent, MockActionLifecycle, RecordingLifecycle};
    use crate::error::StoreError;
    use crate::state::{FieldValue, FormData, FormField, FormModel, MockForm, Record, SchemaForm};
    use crate::store::{
        AttachKeys, BelongsToManyRelation, DirectRelation, MemoryStore, ThroughRelation,
    };
    use crate::translatable::LocaleContentDriver;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn post_model() -> ModelDefinition {
        ModelDefinition::new("Post").with_guarded(&["id"])
    }

    fn post_form() -> SchemaForm {
        SchemaForm::new(
            "Post",
            vec![
                FormField::text("title", "Title", false).required(),
                FormField::text("category", "Category", false)
                    .default_value(FieldValue::Text("general".into())),
            ],
        )
    }

    async fn parent(store: &MemoryStore, model: &str) -> Record {
        let mut record = Record::new(&ModelDefinition::new(model));
        store.insert(&mut record).await.unwrap();
        record
    }

    mod configuration {
        use super::*;
        use pretty_assertions::assert_eq;

        fn action() -> CreateAction {
            CreateAction::new(post_model(), Arc::new(MemoryStore::new()))
        }

        #[test]
        fn test_defaults() {
            let action = action();
            assert_eq!(action.name(), "create");
            assert!(action.can_create_another());
            assert!(action.should_clear_record_after());
            assert!(action.get_relationship().is_none());
            assert_eq!(action.notification_title(), "Created");
        }

        #[test]
        fn test_submit_actions_offer_create_another_when_enabled() {
            let names: Vec<_> = action().submit_actions().iter().map(|a| a.name).collect();
            assert_eq!(names, ["create", "createAnother"]);
            assert!(action().submit_actions()[1].arguments.another);
        }

        #[test]
        fn test_submit_actions_hide_create_another_when_disabled() {
            let actions = action().create_another(false).submit_actions();
            assert_eq!(
                actions,
                vec![SubmitAction {
                    name: "create",
                    arguments: SubmitArguments { another: false },
                }]
            );
        }

        #[test]
        #[allow(deprecated)]
        fn test_disable_create_another_inverts() {
            assert!(!action().disable_create_another(true).can_create_another());
            assert!(action().disable_create_another(false).can_create_another());
        }

        #[test]
        #[allow(deprecated)]
        fn test_disable_create_another_when_negates_predicate() {
            let flag = Arc::new(AtomicBool::new(true));
            let gate = flag.clone();
            let action = action().disable_create_another_when(move || gate.load(Ordering::SeqCst));
            assert!(!action.can_create_another());
            flag.store(false, Ordering::SeqCst);
            assert!(action.can_create_another());
        }

        #[test]
        fn test_create_another_predicate_is_evaluated_each_time() {
            let flag = Arc::new(AtomicBool::new(true));
            let gate = flag.clone();
            let action = action().create_another_when(move || gate.load(Ordering::SeqCst));
            assert!(action.can_create_another());
            flag.store(false, Ordering::SeqCst);
            assert!(!action.can_create_another());
        }

        #[test]
        fn test_apply_config() {
            let config = ActionConfig {
                create_another: Some(false),
                preserve_fields: Some(vec!["category".into()]),
                recheck_create_another: Some(true),
                success_notification_title: Some("Post saved".into()),
            };
            let action = action().apply_config(&config);
            assert!(!action.can_create_another());
            assert!(action.recheck_create_another);
            assert_eq!(action.notification_title(), "Post saved");
            assert!(matches!(action.preserve, Some(PreserveFields::Only(ref f)) if f == &["category"]));
        }

        #[test]
        fn test_empty_config_changes_nothing() {
            let action = action()
                .create_another(false)
                .apply_config(&ActionConfig::default());
            assert!(!action.can_create_another());
            assert_eq!(action.notification_title(), "Created");
        }

        #[test]
        fn test_submit_arguments_default_when_absent() {
            let args: SubmitArguments = serde_json::from_str("{}").unwrap();
            assert!(!args.another);
            let args: SubmitArguments = serde_json::from_str(r#"{"another": true}"#).unwrap();
            assert!(args.another);
        }
    }

    mod workflow {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_terminal_create_without_relationship() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store.clone());
            let mut form = post_form();
            form.set_raw_state(FormData::new().with("title", "Hello"));
            let mut lifecycle = RecordingLifecycle::new();

            let outcome = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap();

            assert!(!outcome.is_halted());
            assert_eq!(store.records("posts").await, vec![outcome.record().clone()]);
            assert_eq!(
                lifecycle.events(),
                [
                    LifecycleEvent::Notified("Created".into()),
                    LifecycleEvent::After
                ]
            );
            // No reset on the terminal path
            assert_eq!(form.field("title").unwrap().as_text(), "Hello");
            assert_eq!(form.model().record(), Some(outcome.record()));
        }

        #[tokio::test]
        async fn test_many_to_many_splits_pivot_fields() {
            let store = Arc::new(MemoryStore::new());
            let team = parent(&store, "Team").await;
            let relation: Arc<dyn Relationship> = Arc::new(
                BelongsToManyRelation::new(store.clone(), &team, "team_user", &["pivot_role"])
                    .unwrap(),
            );
            let action = CreateAction::new(ModelDefinition::new("User"), store.clone());
            let mut form = SchemaForm::new(
                "User",
                vec![
                    FormField::text("name", "Name", false),
                    FormField::text("pivot_role", "Role", false),
                ],
            );
            form.set_raw_state(
                FormData::new()
                    .with("name", "Ada")
                    .with("pivot_role", "editor"),
            );
            let mut lifecycle = RecordingLifecycle::new();
            let writes_before = store.write_count().await;

            let outcome = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle).with_table_relationship(relation),
                )
                .await
                .unwrap();

            let record = outcome.record();
            assert_eq!(record.attribute("name"), Some(&json!("Ada")));
            assert!(record.attribute("pivot_role").is_none());
            assert_eq!(store.write_count().await - writes_before, 2);
            let rows = store.join_rows("team_user").await;
            assert_eq!(rows.len(), 1);
            assert_eq!(
                rows[0].pivot.clone().into_form_data(),
                FormData::new().with("pivot_role", "editor")
            );
        }

        #[tokio::test]
        async fn test_table_relationship_wins_over_action_relationship() {
            let store = Arc::new(MemoryStore::new());
            let team = parent(&store, "Team").await;
            let table_relation: Arc<dyn Relationship> =
                Arc::new(DirectRelation::has_many(store.clone(), &team, "team_id").unwrap());
            let action = CreateAction::new(post_model(), store.clone())
                .relationship(|| {
                    Some(Arc::new(ThroughRelation::has_many_through()) as Arc<dyn Relationship>)
                });

            let mut form = post_form();
            form.set_raw_state(FormData::new().with("title", "Hello"));
            let mut lifecycle = RecordingLifecycle::new();
            let outcome = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle)
                        .with_table_relationship(table_relation),
                )
                .await
                .unwrap();

            assert!(outcome.record().attribute("team_id").is_some());
        }

        #[tokio::test]
        async fn test_has_many_through_saves_standalone() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store.clone())
                .relationship(|| {
                    Some(Arc::new(ThroughRelation::has_many_through()) as Arc<dyn Relationship>)
                });
            let mut form = post_form();
            form.set_raw_state(FormData::new().with("title", "Hello"));
            let mut lifecycle = RecordingLifecycle::new();

            let outcome = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap();

            assert!(outcome.record().exists());
            assert_eq!(store.records("posts").await.len(), 1);
        }

        #[tokio::test]
        async fn test_relationship_resolved_per_submission() {
            let store = Arc::new(MemoryStore::new());
            let team = parent(&store, "Team").await;
            let attach = Arc::new(AtomicBool::new(false));
            let resolver_store = store.clone();
            let resolver_flag = attach.clone();
            let action = CreateAction::new(post_model(), store.clone()).relationship(move || {
                if !resolver_flag.load(Ordering::SeqCst) {
                    return None;
                }
                DirectRelation::has_many(resolver_store.clone(), &team, "team_id")
                    .ok()
                    .map(|r| Arc::new(r) as Arc<dyn Relationship>)
            });
            let mut lifecycle = RecordingLifecycle::new();

            let mut form = post_form();
            form.set_raw_state(FormData::new().with("title", "One"));
            let first = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap();
            assert!(first.record().attribute("team_id").is_none());

            attach.store(true, Ordering::SeqCst);
            form.set_raw_state(FormData::new().with("title", "Two"));
            let second = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap();
            assert!(second.record().attribute("team_id").is_some());
        }

        #[tokio::test]
        async fn test_translatable_driver_builds_record() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store.clone());
            let driver = LocaleContentDriver::new("de", &["title"]);
            let mut form = post_form();
            form.set_raw_state(FormData::new().with("title", "Hallo"));
            let mut lifecycle = RecordingLifecycle::new();

            let outcome = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle).with_translatable(&driver),
                )
                .await
                .unwrap();

            assert_eq!(
                outcome.record().attribute("title"),
                Some(&json!({"de": "Hallo"}))
            );
        }

        #[tokio::test]
        async fn test_relationship_fields_saved_after_record() {
            let store = Arc::new(MemoryStore::new());
            let tag = parent(&store, "Tag").await;
            let action = CreateAction::new(post_model(), store.clone());
            let mut form = SchemaForm::new(
                "Post",
                vec![
                    FormField::text("title", "Title", false),
                    FormField::related_keys("tags", "Tags", "tags"),
                ],
            )
            .bind_relationship("tags", Arc::new(AttachKeys::new(store.clone(), "post_tag")));
            form.set_raw_state(
                FormData::new()
                    .with("title", "Hello")
                    .with("tags", json!([tag.key().unwrap().to_string()])),
            );
            let mut lifecycle = RecordingLifecycle::new();

            let outcome = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap();

            assert!(outcome.record().attribute("tags").is_none());
            let rows = store.join_rows("post_tag").await;
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].parent_key, outcome.record().key().unwrap());
        }
    }

    mod create_another {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_another_without_selector_resets_to_defaults_and_halts() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store.clone());
            let mut form = post_form();
            let defaults = form.raw_state();
            form.set_raw_state(FormData::new().with("title", "Hello").with("category", "news"));
            let mut lifecycle = RecordingLifecycle::new();

            let outcome = action
                .execute(
                    SubmitArguments { another: true },
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap();

            assert!(outcome.is_halted());
            assert_eq!(form.raw_state(), defaults);
            assert_eq!(form.model(), &FormModel::Type("Post".into()));
            assert_eq!(
                lifecycle.events(),
                [
                    LifecycleEvent::After,
                    LifecycleEvent::Notified("Created".into())
                ]
            );
        }

        #[tokio::test]
        async fn test_preserved_fields_survive_repeated_cycles() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store.clone())
                .preserve_form_data_when_creating_another(PreserveFields::only(&["category"]));
            let mut form = post_form();
            let mut lifecycle = RecordingLifecycle::new();

            for title in ["First", "Second", "Third"] {
                form.set_raw_state(FormData::new().with("title", title).with("category", "news"));
                action
                    .execute(
                        SubmitArguments { another: true },
                        ActionContext::new(&mut form, &mut lifecycle),
                    )
                    .await
                    .unwrap();
                assert_eq!(
                    form.raw_state(),
                    FormData::new().with("title", "").with("category", "news")
                );
            }
            assert_eq!(store.records("posts").await.len(), 3);
        }

        #[tokio::test]
        async fn test_stale_another_request_still_loops_by_default() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store).create_another(false);
            let mut form = post_form();
            form.set_raw_state(FormData::new().with("title", "Hello"));
            let mut lifecycle = RecordingLifecycle::new();

            let outcome = action
                .execute(
                    SubmitArguments { another: true },
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap();
            assert!(outcome.is_halted());
        }

        #[tokio::test]
        async fn test_recheck_turns_stale_request_terminal() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store)
                .create_another(false)
                .recheck_create_another_on_submit(true);
            let mut form = post_form();
            form.set_raw_state(FormData::new().with("title", "Hello"));
            let mut lifecycle = MockActionLifecycle::new();
            lifecycle.expect_success().times(1).return_const(());
            lifecycle.expect_call_after().never();
            lifecycle.expect_send_success_notification().never();

            let outcome = action
                .execute(
                    SubmitArguments { another: true },
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap();
            assert!(!outcome.is_halted());
            assert_eq!(form.field("title").unwrap().as_text(), "Hello");
        }

        #[tokio::test]
        async fn test_another_false_ignores_gate() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store).create_another(true);
            let mut form = post_form();
            form.set_raw_state(FormData::new().with("title", "Hello"));
            let mut lifecycle = MockActionLifecycle::new();
            lifecycle.expect_success().times(1).return_const(());

            let outcome = action
                .execute(
                    SubmitArguments { another: false },
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap();
            assert!(!outcome.is_halted());
        }
    }

    mod failures {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_validation_error_writes_nothing() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store.clone());
            let mut form = post_form();
            let mut lifecycle = MockActionLifecycle::new();
            lifecycle.expect_success().never();

            let err = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, CreateError::Validation { ref field, .. } if field == "title"));
            assert_eq!(store.write_count().await, 0);
        }

        #[tokio::test]
        async fn test_guarded_attribute_is_validation_error() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store.clone());
            let mut form = post_form();
            form.set_raw_state(FormData::new().with("title", "Hello").with("id", 5));
            let mut lifecycle = RecordingLifecycle::new();

            let err = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, CreateError::Validation { ref field, .. } if field == "id"));
            assert!(store.records("posts").await.is_empty());
        }

        #[tokio::test]
        async fn test_persistence_error_leaves_form_intact() {
            let store = Arc::new(MemoryStore::new());
            store.fail_writes_to("posts").await;
            let action = CreateAction::new(post_model(), store.clone())
                .preserve_form_data_when_creating_another(PreserveFields::only(&["category"]));
            let mut form = post_form();
            let submitted = FormData::new().with("title", "Hello").with("category", "news");
            form.set_raw_state(submitted.clone());
            let mut lifecycle = MockActionLifecycle::new();
            lifecycle.expect_success().never();
            lifecycle.expect_call_after().never();
            lifecycle.expect_send_success_notification().never();

            let err = action
                .execute(
                    SubmitArguments { another: true },
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap_err();

            assert!(err.is_retryable());
            assert_eq!(form.raw_state(), submitted);
            assert_eq!(form.model(), &FormModel::Type("Post".into()));
        }

        #[tokio::test]
        async fn test_relationship_field_failure_keeps_primary_record() {
            let store = Arc::new(MemoryStore::new());
            let action = CreateAction::new(post_model(), store.clone());
            let mut form = MockForm::new();
            form.expect_raw_state().returning(FormData::new);
            form.expect_state()
                .returning(|| Ok(FormData::new().with("title", "Hello")));
            form.expect_set_model().return_const(());
            form.expect_save_relationships().returning(|| {
                Err(StoreError::WriteFailed {
                    table: "post_tag".into(),
                    reason: "locked".into(),
                })
            });
            let mut lifecycle = RecordingLifecycle::new();

            let err = action
                .execute(
                    SubmitArguments::default(),
                    ActionContext::new(&mut form, &mut lifecycle),
                )
                .await
                .unwrap_err();

            assert!(matches!(err, CreateError::Persistence(_)));
            assert_eq!(store.records("posts").await.len(), 1);
            assert!(lifecycle.events().is_empty());
        }
    }
}
