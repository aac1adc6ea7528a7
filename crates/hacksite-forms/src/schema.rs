//! Schemas: declarative validity constraints over form values.
//!
//! The engine only knows the [`Schema`] trait: given the full candidate
//! values, succeed or return every violation as a `(path, message)` pair.
//! [`ObjectSchema`] and [`FieldSchema`] are the built-in implementation;
//! [`FnSchema`] adapts any closure, so a different validation library can be
//! plugged in behind the same trait.
//!
//! Validation never stops at the first failure. Violations are reported in
//! field declaration order, and within a field in rule order, so "the first
//! violation for a path" is well defined.

use std::fmt;
use std::sync::Arc;

use hacksite_core::ValidationError;
use regex::Regex;
use serde_json::Value;

use crate::path::FieldPath;
use crate::rules::{
    Accepted, Email, MaxItems, MaxLength, MaxValue, MinItems, MinLength, MinValue, OneOf, Pattern,
    Rule, Url,
};
use crate::state::FormValues;

/// Message used when a required value is missing.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// One failed constraint at one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where the failure is.
    pub path: FieldPath,
    /// What failed.
    pub error: ValidationError,
}

impl Violation {
    pub fn new(path: FieldPath, error: ValidationError) -> Self {
        Self { path, error }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.error.message
    }
}

/// Anything that can validate a complete set of form values.
pub trait Schema: Send + Sync {
    /// Validates `values`, returning every violation on failure.
    fn validate(&self, values: &FormValues) -> Result<(), Vec<Violation>>;
}

impl<S: Schema + ?Sized> Schema for Arc<S> {
    fn validate(&self, values: &FormValues) -> Result<(), Vec<Violation>> {
        (**self).validate(values)
    }
}

impl<S: Schema + ?Sized> Schema for Box<S> {
    fn validate(&self, values: &FormValues) -> Result<(), Vec<Violation>> {
        (**self).validate(values)
    }
}

/// A schema backed by a closure.
///
/// # Examples
///
/// ```
/// use hacksite_core::ValidationError;
/// use hacksite_forms::path::FieldPath;
/// use hacksite_forms::schema::{FnSchema, Schema, Violation};
///
/// let schema = FnSchema::new(|values: &hacksite_forms::FormValues| {
///     if values.contains_key("name") {
///         Ok(())
///     } else {
///         Err(vec![Violation::new(
///             FieldPath::key("name"),
///             ValidationError::new("Required", "required"),
///         )])
///     }
/// });
/// assert!(schema.validate(&Default::default()).is_err());
/// ```
pub struct FnSchema<F> {
    func: F,
}

impl<F> FnSchema<F>
where
    F: Fn(&FormValues) -> Result<(), Vec<Violation>> + Send + Sync,
{
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Schema for FnSchema<F>
where
    F: Fn(&FormValues) -> Result<(), Vec<Violation>> + Send + Sync,
{
    fn validate(&self, values: &FormValues) -> Result<(), Vec<Violation>> {
        (self.func)(values)
    }
}

impl<F> fmt::Debug for FnSchema<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSchema").finish_non_exhaustive()
    }
}

/// The type a field value must have.
#[derive(Debug)]
enum FieldKind {
    String,
    Number,
    Boolean,
    Any,
    Object(ObjectSchema),
    Array(Box<FieldSchema>),
}

impl FieldKind {
    const fn expected(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Any => "any",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }

    const fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Object(_), Value::Object(_))
                | (Self::Array(_), Value::Array(_))
                | (Self::Any, _)
        )
    }
}

const fn received(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The constraints on a single field.
///
/// Fields are required unless marked [`optional`](Self::optional). A missing
/// or `null` value is "absent"; for optional string fields an empty string is
/// absent too. Absent required fields report only the required message, and
/// values of the wrong type report only the type message.
#[derive(Debug)]
pub struct FieldSchema {
    kind: FieldKind,
    optional: bool,
    required_message: Option<String>,
    type_message: Option<String>,
    rules: Vec<Box<dyn Rule>>,
}

impl FieldSchema {
    fn with_kind(kind: FieldKind) -> Self {
        Self {
            kind,
            optional: false,
            required_message: None,
            type_message: None,
            rules: Vec::new(),
        }
    }

    /// A text field.
    pub fn string() -> Self {
        Self::with_kind(FieldKind::String)
    }

    /// A numeric field.
    pub fn number() -> Self {
        Self::with_kind(FieldKind::Number)
    }

    /// A checkbox-style field.
    pub fn boolean() -> Self {
        Self::with_kind(FieldKind::Boolean)
    }

    /// A field of any type.
    pub fn any() -> Self {
        Self::with_kind(FieldKind::Any)
    }

    /// A nested group of fields.
    pub fn object(schema: ObjectSchema) -> Self {
        Self::with_kind(FieldKind::Object(schema))
    }

    /// A repeatable group whose items follow `item`.
    pub fn array(item: Self) -> Self {
        Self::with_kind(FieldKind::Array(Box::new(item)))
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    /// Appends a rule. Rules are checked in the order they are added.
    #[must_use]
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    #[must_use]
    pub fn min_length(self, min: usize, message: impl Into<String>) -> Self {
        self.rule(MinLength::new(min).with_message(message))
    }

    #[must_use]
    pub fn max_length(self, max: usize, message: impl Into<String>) -> Self {
        self.rule(MaxLength::new(max).with_message(message))
    }

    #[must_use]
    pub fn email(self, message: impl Into<String>) -> Self {
        self.rule(Email::new().with_message(message))
    }

    #[must_use]
    pub fn url(self, message: impl Into<String>) -> Self {
        self.rule(Url::new().with_message(message))
    }

    #[must_use]
    pub fn pattern(self, regex: Regex, message: impl Into<String>) -> Self {
        self.rule(Pattern::new(regex).with_message(message))
    }

    #[must_use]
    pub fn min(self, min: f64, message: impl Into<String>) -> Self {
        self.rule(MinValue::new(min).with_message(message))
    }

    #[must_use]
    pub fn max(self, max: f64, message: impl Into<String>) -> Self {
        self.rule(MaxValue::new(max).with_message(message))
    }

    #[must_use]
    pub fn one_of<I, S>(self, choices: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule(OneOf::new(choices).with_message(message))
    }

    #[must_use]
    pub fn accepted(self, message: impl Into<String>) -> Self {
        self.rule(Accepted::new().with_message(message))
    }

    #[must_use]
    pub fn min_items(self, min: usize, message: impl Into<String>) -> Self {
        self.rule(MinItems::new(min).with_message(message))
    }

    #[must_use]
    pub fn max_items(self, max: usize, message: impl Into<String>) -> Self {
        self.rule(MaxItems::new(max).with_message(message))
    }

    fn is_absent(&self, value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => self.optional && s.is_empty(),
            Some(_) => false,
        }
    }

    /// Validates one value at `path`, appending violations to `out`.
    pub fn validate_value(&self, value: Option<&Value>, path: &FieldPath, out: &mut Vec<Violation>) {
        if self.is_absent(value) {
            if !self.optional {
                let message = self
                    .required_message
                    .clone()
                    .unwrap_or_else(|| REQUIRED_MESSAGE.to_string());
                out.push(Violation::new(
                    path.clone(),
                    ValidationError::new(message, "required"),
                ));
            }
            return;
        }
        let Some(value) = value else {
            return;
        };

        if !self.kind.accepts(value) {
            let expected = self.kind.expected();
            let message = self
                .type_message
                .clone()
                .unwrap_or_else(|| format!("Expected {expected}, received {}.", received(value)));
            out.push(Violation::new(
                path.clone(),
                ValidationError::new(message, "invalid_type")
                    .with_param("expected", expected)
                    .with_param("received", received(value)),
            ));
            return;
        }

        for rule in &self.rules {
            if let Err(error) = rule.check(value) {
                out.push(Violation::new(path.clone(), error));
            }
        }

        match (&self.kind, value) {
            (FieldKind::Object(schema), Value::Object(map)) => {
                schema.validate_object(map, path, out);
            }
            (FieldKind::Array(item), Value::Array(items)) => {
                for (i, entry) in items.iter().enumerate() {
                    item.validate_value(Some(entry), &path.index(i), out);
                }
            }
            _ => {}
        }
    }
}

type RefineFn = dyn Fn(&FormValues) -> bool + Send + Sync;

/// A cross-field check attached to an [`ObjectSchema`].
struct Refinement {
    path: FieldPath,
    message: String,
    check: Box<RefineFn>,
}

/// An ordered set of named fields plus cross-field checks.
///
/// # Examples
///
/// ```
/// use hacksite_forms::schema::{FieldSchema, ObjectSchema, Schema};
/// use serde_json::json;
///
/// let schema = ObjectSchema::new()
///     .field("name", FieldSchema::string().min_length(2, "Name must be at least 2 characters"))
///     .field("email", FieldSchema::string().email("Please enter a valid email address"));
///
/// let values = json!({ "name": "J", "email": "j@example.com" });
/// let violations = schema.validate(values.as_object().unwrap()).unwrap_err();
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].path.to_string(), "name");
/// ```
#[derive(Default)]
pub struct ObjectSchema {
    fields: Vec<(String, FieldSchema)>,
    refinements: Vec<Refinement>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field. Fields are validated in the order they are added.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.push((name.into(), schema));
        self
    }

    /// Adds a cross-field check reported at `path` (relative to this object).
    ///
    /// Checks run after the field checks, whether or not those passed, so the
    /// closure must cope with missing or malformed values.
    #[must_use]
    pub fn refine<F>(mut self, path: FieldPath, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&FormValues) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            path,
            message: message.into(),
            check: Box::new(check),
        });
        self
    }

    /// The declared field names, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Validates an object found at `base`, appending violations to `out`.
    pub fn validate_object(&self, map: &FormValues, base: &FieldPath, out: &mut Vec<Violation>) {
        for (name, field) in &self.fields {
            field.validate_value(map.get(name), &base.child(name.as_str()), out);
        }
        for refinement in &self.refinements {
            if !(refinement.check)(map) {
                out.push(Violation::new(
                    base.join(&refinement.path),
                    ValidationError::new(refinement.message.clone(), "custom"),
                ));
            }
        }
    }
}

impl Schema for ObjectSchema {
    fn validate(&self, values: &FormValues) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        self.validate_object(values, &FieldPath::root(), &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("fields", &self.fields)
            .field("refinements", &self.refinements.len())
            .finish()
    }
}
