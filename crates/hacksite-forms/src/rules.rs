//! Field rules.
//!
//! A [`Rule`] checks one constraint on a single field value. Rules only look
//! at values of the type they understand (a length rule ignores numbers), so
//! type checking stays with the [`FieldSchema`](crate::schema::FieldSchema)
//! that owns them. Every rule has a default message that can be replaced with
//! [`with_message`](MinLength::with_message)-style builders.

use std::fmt;

use hacksite_core::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("valid regex"));

/// A single constraint on a field value.
///
/// # Examples
///
/// ```
/// use hacksite_forms::rules::{MinLength, Rule};
/// use serde_json::json;
///
/// let rule = MinLength::new(2).with_message("Name must be at least 2 characters");
/// assert!(rule.check(&json!("Jo")).is_ok());
/// assert_eq!(
///     rule.check(&json!("J")).unwrap_err().message,
///     "Name must be at least 2 characters"
/// );
/// ```
pub trait Rule: Send + Sync + fmt::Debug {
    /// Checks the value, returning an error if the constraint is violated.
    fn check(&self, value: &Value) -> Result<(), ValidationError>;

    /// A human-readable name for this rule.
    fn name(&self) -> &str;
}

/// Requires a string to have at least `min` characters.
#[derive(Debug, Clone)]
pub struct MinLength {
    pub min: usize,
    message: Option<String>,
}

impl MinLength {
    pub const fn new(min: usize) -> Self {
        Self { min, message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for MinLength {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        if let Value::String(s) = value {
            let len = s.chars().count();
            if len < self.min {
                let message = self.message.clone().unwrap_or_else(|| {
                    format!(
                        "Ensure this value has at least {} characters (it has {len}).",
                        self.min
                    )
                });
                return Err(ValidationError::new(message, "min_length")
                    .with_param("min", self.min.to_string()));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MinLength"
    }
}

/// Limits a string to at most `max` characters.
#[derive(Debug, Clone)]
pub struct MaxLength {
    pub max: usize,
    message: Option<String>,
}

impl MaxLength {
    pub const fn new(max: usize) -> Self {
        Self { max, message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for MaxLength {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        if let Value::String(s) = value {
            let len = s.chars().count();
            if len > self.max {
                let message = self.message.clone().unwrap_or_else(|| {
                    format!(
                        "Ensure this value has at most {} characters (it has {len}).",
                        self.max
                    )
                });
                return Err(ValidationError::new(message, "max_length")
                    .with_param("max", self.max.to_string()));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MaxLength"
    }
}

/// Requires a string to look like an email address.
#[derive(Debug, Clone, Default)]
pub struct Email {
    message: Option<String>,
}

impl Email {
    pub const fn new() -> Self {
        Self { message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for Email {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::String(s) if !EMAIL_RE.is_match(s) => Err(ValidationError::new(
                self.message
                    .clone()
                    .unwrap_or_else(|| "Enter a valid email address.".to_string()),
                "invalid_email",
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Email"
    }
}

/// Requires a string to be an http(s) URL.
#[derive(Debug, Clone, Default)]
pub struct Url {
    message: Option<String>,
}

impl Url {
    pub const fn new() -> Self {
        Self { message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for Url {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::String(s) if !URL_RE.is_match(s) => Err(ValidationError::new(
                self.message
                    .clone()
                    .unwrap_or_else(|| "Enter a valid URL.".to_string()),
                "invalid_url",
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Url"
    }
}

/// Requires a string to match a regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    message: Option<String>,
}

impl Pattern {
    /// Creates the rule from an already-compiled regex.
    pub fn new(regex: Regex) -> Self {
        Self {
            regex,
            message: None,
        }
    }

    /// Compiles `pattern` and creates the rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(Regex::new(pattern)?))
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for Pattern {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::String(s) if !self.regex.is_match(s) => Err(ValidationError::new(
                self.message
                    .clone()
                    .unwrap_or_else(|| "Enter a valid value.".to_string()),
                "invalid",
            )
            .with_param("pattern", self.regex.as_str())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Pattern"
    }
}

/// Requires a number to be at least `min`.
#[derive(Debug, Clone)]
pub struct MinValue {
    pub min: f64,
    message: Option<String>,
}

impl MinValue {
    pub fn new(min: f64) -> Self {
        Self { min, message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for MinValue {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match value.as_f64() {
            Some(n) if n < self.min => Err(ValidationError::new(
                self.message.clone().unwrap_or_else(|| {
                    format!("Ensure this value is greater than or equal to {}.", self.min)
                }),
                "min_value",
            )
            .with_param("min", self.min.to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "MinValue"
    }
}

/// Requires a number to be at most `max`.
#[derive(Debug, Clone)]
pub struct MaxValue {
    pub max: f64,
    message: Option<String>,
}

impl MaxValue {
    pub fn new(max: f64) -> Self {
        Self { max, message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for MaxValue {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match value.as_f64() {
            Some(n) if n > self.max => Err(ValidationError::new(
                self.message.clone().unwrap_or_else(|| {
                    format!("Ensure this value is less than or equal to {}.", self.max)
                }),
                "max_value",
            )
            .with_param("max", self.max.to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "MaxValue"
    }
}

/// Requires a string to be one of a fixed set of choices.
#[derive(Debug, Clone)]
pub struct OneOf {
    pub choices: Vec<String>,
    message: Option<String>,
}

impl OneOf {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for OneOf {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::String(s) if !self.choices.iter().any(|c| c == s) => {
                Err(ValidationError::new(
                    self.message.clone().unwrap_or_else(|| {
                        format!("Select a valid choice. {s} is not one of the available choices.")
                    }),
                    "invalid_choice",
                ))
            }
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "OneOf"
    }
}

/// Requires a boolean to be `true` (terms-of-service checkboxes).
#[derive(Debug, Clone, Default)]
pub struct Accepted {
    message: Option<String>,
}

impl Accepted {
    pub const fn new() -> Self {
        Self { message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for Accepted {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::Bool(false) => Err(ValidationError::new(
                self.message
                    .clone()
                    .unwrap_or_else(|| "This box must be checked.".to_string()),
                "not_accepted",
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Accepted"
    }
}

/// Requires an array to have at least `min` items.
#[derive(Debug, Clone)]
pub struct MinItems {
    pub min: usize,
    message: Option<String>,
}

impl MinItems {
    pub const fn new(min: usize) -> Self {
        Self { min, message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for MinItems {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::Array(items) if items.len() < self.min => Err(ValidationError::new(
                self.message
                    .clone()
                    .unwrap_or_else(|| format!("Add at least {} items.", self.min)),
                "min_items",
            )
            .with_param("min", self.min.to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "MinItems"
    }
}

/// Limits an array to at most `max` items.
#[derive(Debug, Clone)]
pub struct MaxItems {
    pub max: usize,
    message: Option<String>,
}

impl MaxItems {
    pub const fn new(max: usize) -> Self {
        Self { max, message: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Rule for MaxItems {
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::Array(items) if items.len() > self.max => Err(ValidationError::new(
                self.message
                    .clone()
                    .unwrap_or_else(|| format!("Add at most {} items.", self.max)),
                "max_items",
            )
            .with_param("max", self.max.to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "MaxItems"
    }
}
