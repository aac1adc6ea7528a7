//! The form validation engine.
//!
//! A [`FormEngine`] owns one form's [`FormState`] and drives it through the
//! edit, blur, validate and submit lifecycle against a [`Schema`]. The engine
//! is a cheap clonable handle: field bindings and an in-flight submit all see
//! the same state.
//!
//! Validation runs against a copy of the values; no lock is held while the
//! schema or the submit handler executes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hacksite_core::boundary::panic_message;
use hacksite_core::logging::form_span;
use hacksite_core::settings::FormSettings;
use hacksite_core::{SiteError, SiteResult};
use serde_json::Value;
use tracing::instrument::WithSubscriber;
use tracing::Instrument;

use crate::bound_field::FieldProps;
use crate::path::FieldPath;
use crate::schema::{Schema, Violation};
use crate::state::{dirty_fields, overlaps, FormState, FormValues};
use crate::submit::{SubmitEvent, SubmitHandler, SubmitOutcome};

const DEFAULT_FORM_NAME: &str = "form";

/// Mutable state plus the bookkeeping for in-flight submits.
#[derive(Debug, Default)]
struct Shared {
    state: FormState,
    in_flight: usize,
    /// Bumped by `reset()` so submits started earlier can no longer touch the state.
    epoch: u64,
}

struct Inner {
    name: String,
    schema: Arc<dyn Schema>,
    on_submit: Option<Arc<dyn SubmitHandler>>,
    initial: FormValues,
    surface_submit_errors: bool,
    log_submitted_values: bool,
    shared: RwLock<Shared>,
}

impl Inner {
    fn read(&self) -> RwLockReadGuard<'_, Shared> {
        self.shared.read().expect("form state lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Shared> {
        self.shared.write().expect("form state lock poisoned")
    }
}

/// Keeps the submitting flag raised for as long as it is alive.
///
/// Dropping the guard lowers the flag whether the handler finished, failed,
/// or panicked. Guards from before the last `reset()` are ignored.
struct SubmittingGuard {
    inner: Arc<Inner>,
    epoch: u64,
}

impl SubmittingGuard {
    fn begin(inner: &Arc<Inner>) -> Self {
        let mut shared = inner.write();
        shared.in_flight += 1;
        shared.state.is_submitting = true;
        shared.state.submit_error = None;
        Self {
            inner: Arc::clone(inner),
            epoch: shared.epoch,
        }
    }

    /// Records a failure message if this submit still belongs to the current epoch.
    fn record_failure(&self, message: &str) {
        if !self.inner.surface_submit_errors {
            return;
        }
        let mut shared = self.inner.write();
        if shared.epoch == self.epoch {
            shared.state.submit_error = Some(message.to_string());
        }
    }
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        let mut shared = self
            .inner
            .shared
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if shared.epoch == self.epoch {
            shared.in_flight = shared.in_flight.saturating_sub(1);
            shared.state.is_submitting = shared.in_flight > 0;
        }
    }
}

/// Builder for [`FormEngine`].
pub struct FormEngineBuilder {
    name: String,
    schema: Arc<dyn Schema>,
    initial: FormValues,
    on_submit: Option<Arc<dyn SubmitHandler>>,
    settings: FormSettings,
}

impl FormEngineBuilder {
    /// Seeds the form. These values are also what `reset()` restores.
    #[must_use]
    pub fn initial_values(mut self, values: FormValues) -> Self {
        self.initial = values;
        self
    }

    #[must_use]
    pub fn on_submit(mut self, handler: impl SubmitHandler + 'static) -> Self {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    /// Names the form in log output.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: &FormSettings) -> Self {
        self.settings = settings.clone();
        self
    }

    pub fn build(self) -> FormEngine {
        tracing::debug!(form = %self.name, fields = self.initial.len(), "form engine created");
        FormEngine {
            inner: Arc::new(Inner {
                name: self.name,
                schema: self.schema,
                on_submit: self.on_submit,
                shared: RwLock::new(Shared {
                    state: FormState::new(self.initial.clone()),
                    ..Shared::default()
                }),
                initial: self.initial,
                surface_submit_errors: self.settings.surface_submit_errors,
                log_submitted_values: self.settings.log_submitted_values,
            }),
        }
    }
}

/// Tracks one form's values, errors, touched fields and submit lifecycle.
///
/// # Examples
///
/// ```
/// use hacksite_forms::engine::FormEngine;
/// use hacksite_forms::schema::{FieldSchema, ObjectSchema};
/// use serde_json::json;
///
/// let form = FormEngine::new(
///     ObjectSchema::new().field("name", FieldSchema::string().min_length(2, "Too short")),
/// );
///
/// form.set_value("name", json!("J"));
/// assert!(form.errors().is_empty()); // untouched fields are not re-validated
///
/// form.handle_blur("name");
/// assert_eq!(form.error("name").as_deref(), Some("Too short"));
///
/// form.set_value("name", json!("Jo"));
/// assert!(form.is_valid());
/// ```
#[derive(Clone)]
pub struct FormEngine {
    inner: Arc<Inner>,
}

impl fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("name", &self.inner.name)
            .field("state", &self.inner.read().state)
            .finish_non_exhaustive()
    }
}

impl FormEngine {
    /// An engine with empty initial values and no submit handler.
    pub fn new(schema: impl Schema + 'static) -> Self {
        Self::builder(schema).build()
    }

    pub fn builder(schema: impl Schema + 'static) -> FormEngineBuilder {
        FormEngineBuilder {
            name: DEFAULT_FORM_NAME.to_string(),
            schema: Arc::new(schema),
            initial: FormValues::new(),
            on_submit: None,
            settings: FormSettings::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Writes a value, re-validating the field if it has been touched.
    ///
    /// Unknown fields are added. A path whose array index lies more than one
    /// past the end of its array is ignored.
    pub fn set_value(&self, path: impl Into<FieldPath>, value: Value) {
        let path = path.into();
        let (written, touched) = {
            let mut shared = self.inner.write();
            let written = path.set(&mut shared.state.values, value.clone());
            (written, shared.state.is_touched(&path))
        };
        if !written {
            tracing::warn!(form = %self.inner.name, field = %path, "index out of range, value ignored");
            return;
        }
        if touched {
            self.validate_field(&path, value);
        }
    }

    /// Marks a field touched and validates it if it has a value.
    pub fn handle_blur(&self, path: impl Into<FieldPath>) {
        let path = path.into();
        let current = {
            let mut shared = self.inner.write();
            shared.state.touched.insert(path.clone());
            path.get(&shared.state.values).cloned()
        };
        if let Some(value) = current {
            self.validate_field(&path, value);
        }
    }

    /// Validates one field as if it held `value`, updating its errors.
    ///
    /// Errors at, underneath, or enclosing `path` are replaced; errors on
    /// other branches are left alone. The stored values are not modified and the field is not marked
    /// touched. Returns `true` when no error remains for the field.
    pub fn validate_field(&self, path: &FieldPath, value: Value) -> bool {
        let mut candidate = self.values();
        path.set(&mut candidate, value);
        let violations = self.inner.schema.validate(&candidate).err().unwrap_or_default();

        let mut shared = self.inner.write();
        shared.state.clear_errors_for(path);
        for (failing, message) in first_messages(violations) {
            if overlaps(&failing, path) {
                shared.state.errors.insert(failing, message);
            }
        }
        let valid = !shared.state.errors.keys().any(|p| overlaps(p, path));
        tracing::trace!(form = %self.inner.name, field = %path, valid, "field validated");
        valid
    }

    /// Validates all values, replacing the error map. Returns `true` if valid.
    pub fn validate_form(&self) -> bool {
        let values = self.values();
        let errors = match self.inner.schema.validate(&values) {
            Ok(()) => BTreeMap::new(),
            Err(violations) => first_messages(violations),
        };
        let valid = errors.is_empty();
        tracing::debug!(form = %self.inner.name, errors = errors.len(), "form validated");
        self.inner.write().state.errors = errors;
        valid
    }

    /// Validates and, if a handler is configured, submits the form.
    ///
    /// Every top-level field is marked touched first so all errors become
    /// visible. Handler failures and panics are logged and reported as
    /// [`SubmitOutcome::Failed`]; the submitting flag is lowered in every case.
    /// The handler runs on its own tokio task, so it completes even if the
    /// returned future is dropped. Polled outside a tokio runtime, a valid
    /// form with a handler reports [`SubmitOutcome::Failed`] without calling
    /// the handler.
    pub async fn handle_submit(&self, event: Option<&mut SubmitEvent>) -> SubmitOutcome {
        if let Some(event) = event {
            event.prevent_default();
        }
        {
            let mut shared = self.inner.write();
            let keys: Vec<FieldPath> = shared.state.values.keys().map(FieldPath::key).collect();
            shared.state.touched.extend(keys);
        }

        if !self.validate_form() {
            tracing::debug!(form = %self.inner.name, "submit blocked by validation errors");
            return SubmitOutcome::Invalid;
        }
        let Some(handler) = self.inner.on_submit.clone() else {
            return SubmitOutcome::Validated;
        };

        if tokio::runtime::Handle::try_current().is_err() {
            let message = "no tokio runtime to run the submit handler".to_string();
            tracing::error!(form = %self.inner.name, error = %message, "submit handler failed");
            if self.inner.surface_submit_errors {
                self.inner.write().state.submit_error = Some(message.clone());
            }
            return SubmitOutcome::Failed(message);
        }

        let values = self.values();
        if self.inner.log_submitted_values {
            let payload = Value::Object(values.clone());
            tracing::debug!(form = %self.inner.name, values = %payload, "submitting form");
        } else {
            tracing::debug!(form = %self.inner.name, "submitting form");
        }

        let guard = SubmittingGuard::begin(&self.inner);
        let span = form_span(&self.inner.name);
        let run = tokio::spawn(
            async move { handler.submit(values).await }.with_current_subscriber(),
        );
        let settle = tokio::spawn(
            async move {
                let result = match run.await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(error)) => Err(format!("{error:#}")),
                    Err(join) if join.is_panic() => {
                        Err(panic_message(&*join.into_panic()))
                    }
                    Err(join) => Err(join.to_string()),
                };
                match &result {
                    Ok(()) => tracing::info!("form submitted"),
                    Err(message) => {
                        tracing::error!(error = %message, "submit handler failed");
                        guard.record_failure(message);
                    }
                }
                drop(guard);
                result
            }
            .instrument(span)
            .with_current_subscriber(),
        );

        match settle.await {
            Ok(Ok(())) => SubmitOutcome::Submitted,
            Ok(Err(message)) => SubmitOutcome::Failed(message),
            Err(join) => SubmitOutcome::Failed(join.to_string()),
        }
    }

    /// Restores the initial values and clears errors, touched and submit state.
    ///
    /// Submits still in flight finish in the background but no longer affect
    /// the state.
    pub fn reset(&self) {
        let mut shared = self.inner.write();
        shared.epoch += 1;
        shared.in_flight = 0;
        shared.state = FormState::new(self.inner.initial.clone());
        tracing::debug!(form = %self.inner.name, "form reset");
    }

    /// A binding for one input. Missing and `null` values bind as `""`.
    pub fn field_props(&self, path: impl Into<FieldPath>) -> FieldProps {
        let path = path.into();
        let (value, error) = {
            let shared = self.inner.read();
            let value = match path.get(&shared.state.values) {
                None | Some(Value::Null) => Value::String(String::new()),
                Some(value) => value.clone(),
            };
            let error = if shared.state.is_touched(&path) {
                shared.state.errors.get(&path).cloned()
            } else {
                None
            };
            (value, error)
        };
        FieldProps::new(self.clone(), path, value, error)
    }

    /// `true` iff no errors are recorded as of the last validation pass.
    pub fn is_valid(&self) -> bool {
        self.inner.read().state.is_valid()
    }

    pub fn is_submitting(&self) -> bool {
        self.inner.read().state.is_submitting
    }

    /// Message of the most recent failed submit, if errors are surfaced.
    pub fn submit_error(&self) -> Option<String> {
        self.inner.read().state.submit_error.clone()
    }

    pub fn values(&self) -> FormValues {
        self.inner.read().state.values.clone()
    }

    pub fn value(&self, path: impl Into<FieldPath>) -> Option<Value> {
        let path = path.into();
        path.get(&self.inner.read().state.values).cloned()
    }

    pub fn errors(&self) -> BTreeMap<FieldPath, String> {
        self.inner.read().state.errors.clone()
    }

    pub fn error(&self, path: impl Into<FieldPath>) -> Option<String> {
        self.inner.read().state.errors.get(&path.into()).cloned()
    }

    pub fn touched(&self) -> BTreeSet<FieldPath> {
        self.inner.read().state.touched.clone()
    }

    pub fn is_touched(&self, path: impl Into<FieldPath>) -> bool {
        self.inner.read().state.is_touched(&path.into())
    }

    /// Top-level fields whose value differs from the initial snapshot.
    pub fn dirty_fields(&self) -> BTreeSet<FieldPath> {
        dirty_fields(&self.inner.initial, &self.inner.read().state.values)
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_fields().is_empty()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> FormState {
        self.inner.read().state.clone()
    }

    /// The state as a JSON object for renderers, plus `name`, `is_valid` and `is_dirty`.
    pub fn as_context(&self) -> SiteResult<Value> {
        let mut context = serde_json::to_value(self.snapshot())?;
        let Value::Object(map) = &mut context else {
            return Err(SiteError::Serialization(
                "form state did not serialize to an object".to_string(),
            ));
        };
        map.insert("name".to_string(), Value::String(self.inner.name.clone()));
        map.insert("is_valid".to_string(), Value::Bool(self.is_valid()));
        map.insert("is_dirty".to_string(), Value::Bool(self.is_dirty()));
        Ok(context)
    }
}

/// Keeps the first message reported for each path.
fn first_messages(violations: Vec<Violation>) -> BTreeMap<FieldPath, String> {
    let mut errors = BTreeMap::new();
    for violation in violations {
        errors
            .entry(violation.path)
            .or_insert(violation.error.message);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, FnSchema, ObjectSchema};
    use crate::submit::submit_fn;
    use hacksite_core::ValidationError;
    use serde_json::json;

    fn values(v: Value) -> FormValues {
        v.as_object().cloned().unwrap_or_default()
    }

    fn name_schema() -> ObjectSchema {
        ObjectSchema::new()
            .field(
                "name",
                FieldSchema::string().min_length(2, "Name must be at least 2 characters"),
            )
            .field(
                "email",
                FieldSchema::string().email("Please enter a valid email address"),
            )
    }

    #[test]
    fn test_set_value_untouched_does_not_validate() {
        let form = FormEngine::new(name_schema());
        form.set_value("name", json!("J"));
        assert_eq!(form.value("name"), Some(json!("J")));
        assert!(form.errors().is_empty());
        assert!(form.is_valid());
    }

    #[test]
    fn test_set_value_unknown_field_is_added() {
        let form = FormEngine::new(name_schema());
        form.set_value("nickname", json!("jj"));
        assert_eq!(form.values()["nickname"], json!("jj"));
    }

    #[test]
    fn test_blur_then_edit_revalidates() {
        let form = FormEngine::new(name_schema());
        form.set_value("name", json!("J"));
        form.handle_blur("name");
        assert_eq!(
            form.error("name").as_deref(),
            Some("Name must be at least 2 characters")
        );
        form.set_value("name", json!("Jo"));
        assert_eq!(form.error("name"), None);
    }

    #[test]
    fn test_blur_without_value_only_marks_touched() {
        let form = FormEngine::new(name_schema());
        form.handle_blur("email");
        assert!(form.is_touched("email"));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_validate_field_does_not_store_value_or_touch() {
        let form = FormEngine::new(name_schema());
        assert!(!form.validate_field(&FieldPath::key("name"), json!("J")));
        assert_eq!(form.value("name"), None);
        assert!(form.touched().is_empty());
        assert!(form.error("name").is_some());
    }

    #[test]
    fn test_validate_field_leaves_other_errors() {
        let form = FormEngine::new(name_schema());
        assert!(!form.validate_form());
        assert_eq!(form.errors().len(), 2);
        assert!(form.validate_field(&FieldPath::key("name"), json!("Jane")));
        let errors = form.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key(&FieldPath::key("email")));
    }

    #[test]
    fn test_validate_field_nested_object() {
        let schema = ObjectSchema::new().field(
            "teamLeader",
            FieldSchema::object(
                ObjectSchema::new()
                    .field("name", FieldSchema::string().min_length(2, "short"))
                    .field("email", FieldSchema::string().email("bad email")),
            ),
        );
        let form = FormEngine::new(schema);
        let leader = FieldPath::key("teamLeader");
        assert!(!form.validate_field(&leader, json!({ "name": "A", "email": "nope" })));
        assert_eq!(form.error(FieldPath::parse("teamLeader.name")).as_deref(), Some("short"));
        assert_eq!(
            form.error(FieldPath::parse("teamLeader.email")).as_deref(),
            Some("bad email")
        );

        assert!(form.validate_field(&FieldPath::parse("teamLeader.email"), json!("a@b.co")));
        assert_eq!(form.errors().len(), 1);
    }

    #[test]
    fn test_validate_form_keeps_first_message_per_path() {
        let schema = FnSchema::new(|_: &FormValues| {
            Err(vec![
                Violation::new(FieldPath::key("code"), ValidationError::new("first", "a")),
                Violation::new(FieldPath::key("code"), ValidationError::new("second", "b")),
            ])
        });
        let form = FormEngine::new(schema);
        assert!(!form.validate_form());
        assert_eq!(form.error("code").as_deref(), Some("first"));
    }

    #[test]
    fn test_validate_form_success_clears_errors() {
        let form = FormEngine::builder(name_schema())
            .initial_values(values(json!({ "name": "J", "email": "x" })))
            .build();
        assert!(!form.validate_form());
        form.set_value("name", json!("Jane"));
        form.set_value("email", json!("jane@example.com"));
        assert!(!form.is_valid());
        assert!(form.validate_form());
        assert!(form.is_valid());
    }

    #[test]
    fn test_field_props_hides_untouched_errors() {
        let form = FormEngine::new(name_schema());
        form.validate_form();
        let props = form.field_props("name");
        assert_eq!(props.value, json!(""));
        assert_eq!(props.error, None);

        form.handle_blur("name");
        assert_eq!(
            form.field_props("name").error.as_deref(),
            Some("This field is required.")
        );
    }

    #[test]
    fn test_reset_restores_initial_snapshot() {
        let initial = values(json!({ "name": "", "email": "" }));
        let form = FormEngine::builder(name_schema())
            .initial_values(initial.clone())
            .build();
        form.set_value("name", json!("Zed"));
        form.handle_blur("name");
        form.validate_form();
        assert!(form.is_dirty());

        form.reset();
        let state = form.snapshot();
        assert_eq!(state, FormState::new(initial));
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_dirty_fields() {
        let form = FormEngine::builder(name_schema())
            .initial_values(values(json!({ "name": "", "email": "" })))
            .build();
        form.set_value("email", json!("a@b.co"));
        assert_eq!(
            form.dirty_fields().into_iter().collect::<Vec<_>>(),
            vec![FieldPath::key("email")]
        );
    }

    #[test]
    fn test_as_context() {
        let form = FormEngine::builder(name_schema()).name("contact").build();
        form.set_value("name", json!("J"));
        form.handle_blur("name");
        let context = form.as_context().unwrap();
        assert_eq!(context["name"], "contact");
        assert_eq!(context["values"]["name"], "J");
        assert_eq!(context["errors"]["name"], "Name must be at least 2 characters");
        assert_eq!(context["touched"], json!(["name"]));
        assert_eq!(context["is_valid"], false);
        assert_eq!(context["is_dirty"], true);
    }

    #[test]
    fn test_set_value_ignores_index_past_end() {
        let form = FormEngine::builder(name_schema())
            .initial_values(values(json!({ "members": [{ "email": "a@b.co" }] })))
            .build();
        form.handle_blur("members");
        let before = form.snapshot();

        form.set_value(FieldPath::parse("members.18446744073709551615.email"), json!("x"));
        form.set_value(FieldPath::parse("members.10000000000.email"), json!("x"));
        assert_eq!(form.snapshot(), before);

        form.set_value(FieldPath::parse("members.1.email"), json!("c@d.io"));
        assert_eq!(
            form.value(FieldPath::parse("members.1.email")),
            Some(json!("c@d.io"))
        );
    }

    #[test]
    fn test_field_props_binds_null_as_empty_string() {
        let form = FormEngine::builder(name_schema())
            .initial_values(values(json!({ "name": null, "email": 7 })))
            .build();
        assert_eq!(form.field_props("name").value, json!(""));
        assert_eq!(form.field_props("email").value, json!(7));
    }

    #[test]
    fn test_submit_outside_runtime_fails_without_panicking() {
        use std::future::Future;
        use std::task::{Context, Poll, Wake, Waker};

        struct NoopWake;
        impl Wake for NoopWake {
            fn wake(self: Arc<Self>) {}
        }

        let form = FormEngine::builder(name_schema())
            .initial_values(values(json!({ "name": "Jane", "email": "jane@example.com" })))
            .on_submit(submit_fn(|_| async { anyhow::Ok(()) }))
            .build();
        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);
        let mut submit = std::pin::pin!(form.handle_submit(None));
        match submit.as_mut().poll(&mut cx) {
            Poll::Ready(SubmitOutcome::Failed(message)) => {
                assert!(message.contains("tokio runtime"));
            }
            other => panic!("unexpected poll result: {other:?}"),
        }
        assert!(!form.is_submitting());
        assert!(form.submit_error().is_some());
    }

    #[tokio::test]
    async fn test_submit_with_value_logging_enabled() {
        let settings = FormSettings {
            log_submitted_values: true,
            ..FormSettings::default()
        };
        let form = FormEngine::builder(name_schema())
            .initial_values(values(json!({ "name": "Jane", "email": "jane@example.com" })))
            .settings(&settings)
            .on_submit(submit_fn(|values: FormValues| async move {
                anyhow::ensure!(values["name"] == json!("Jane"), "wrong values");
                Ok(())
            }))
            .build();
        assert_eq!(form.handle_submit(None).await, SubmitOutcome::Submitted);
    }

    #[test]
    fn test_clones_share_state() {
        let form = FormEngine::new(name_schema());
        let other = form.clone();
        other.set_value("name", json!("Ann"));
        assert_eq!(form.value("name"), Some(json!("Ann")));
    }

    #[tokio::test]
    async fn test_submit_without_handler_is_validated() {
        let form = FormEngine::builder(name_schema())
            .initial_values(values(json!({ "name": "Jane", "email": "jane@example.com" })))
            .build();
        let mut event = SubmitEvent::new();
        assert_eq!(form.handle_submit(Some(&mut event)).await, SubmitOutcome::Validated);
        assert!(event.default_prevented());
        assert_eq!(form.touched().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_failure_hidden_when_not_surfaced() {
        let settings = FormSettings {
            surface_submit_errors: false,
            ..FormSettings::default()
        };
        let form = FormEngine::builder(name_schema())
            .initial_values(values(json!({ "name": "Jane", "email": "jane@example.com" })))
            .settings(&settings)
            .on_submit(submit_fn(|_| async { Err::<(), _>(anyhow::anyhow!("mail server down")) }))
            .build();
        let outcome = form.handle_submit(None).await;
        assert_eq!(outcome, SubmitOutcome::Failed("mail server down".into()));
        assert_eq!(form.submit_error(), None);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_error_cleared_on_next_submit() {
        let attempts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let form = FormEngine::builder(name_schema())
            .initial_values(values(json!({ "name": "Jane", "email": "jane@example.com" })))
            .on_submit(submit_fn(move |_| {
                let attempt = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async move {
                    anyhow::ensure!(attempt > 0, "first attempt fails");
                    Ok(())
                }
            }))
            .build();
        assert!(matches!(form.handle_submit(None).await, SubmitOutcome::Failed(_)));
        assert_eq!(form.submit_error().as_deref(), Some("first attempt fails"));
        assert_eq!(form.handle_submit(None).await, SubmitOutcome::Submitted);
        assert_eq!(form.submit_error(), None);
    }
}
