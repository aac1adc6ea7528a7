//! Field bindings: one input wired to a form engine.
//!
//! [`FieldProps`] pairs a field's current value and visible error with the
//! change and blur handlers an input needs. It is a snapshot taken when
//! [`FormEngine::field_props`] is called; the handlers act on the live form.

use serde::Serialize;
use serde_json::Value;

use crate::engine::FormEngine;
use crate::path::FieldPath;

/// The props an input binds to.
#[derive(Debug, Clone, Serialize)]
pub struct FieldProps {
    /// The input's name attribute, the dotted field path.
    pub name: String,
    /// The structured path behind `name`.
    #[serde(skip)]
    pub path: FieldPath,
    /// The current value, or an empty string when the field has no value.
    pub value: Value,
    /// The field's error, only once the field has been touched.
    pub error: Option<String>,
    #[serde(skip)]
    form: FormEngine,
}

impl FieldProps {
    pub(crate) fn new(form: FormEngine, path: FieldPath, value: Value, error: Option<String>) -> Self {
        Self {
            name: path.to_string(),
            path,
            value,
            error,
            form,
        }
    }

    /// Forwards an edit to [`FormEngine::set_value`].
    pub fn on_change(&self, value: Value) {
        self.form.set_value(&self.path, value);
    }

    /// Forwards a blur to [`FormEngine::handle_blur`].
    pub fn on_blur(&self) {
        self.form.handle_blur(&self.path);
    }

    /// The HTML `id` for this input.
    pub fn auto_id(&self) -> String {
        format!("id_{}", self.name.replace('.', "_"))
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The value as display text; strings are unquoted, null is empty.
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}
