//! Form state: values, errors, touched fields, and the submitting flag.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::path::FieldPath;

/// Field values keyed by top-level field name.
///
/// Values may be strings, numbers, booleans, nested objects, or arrays of
/// nested objects for repeatable groups.
pub type FormValues = serde_json::Map<String, Value>;

/// A snapshot of one form's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    /// Current field values.
    pub values: FormValues,
    /// One message per failing field path.
    pub errors: BTreeMap<FieldPath, String>,
    /// Fields that were blurred or included in a submit.
    pub touched: BTreeSet<FieldPath>,
    /// Whether a submit handler is still running.
    pub is_submitting: bool,
    /// Message of the most recent failed submission, if kept.
    pub submit_error: Option<String>,
}

impl FormState {
    /// Creates a fresh state seeded with `values`.
    pub fn new(values: FormValues) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Returns `true` if no errors are recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` if `path` or one of its ancestors is touched.
    pub fn is_touched(&self, path: &FieldPath) -> bool {
        path.ancestors().any(|p| self.touched.contains(&p))
    }

    /// Removes every error at, underneath, or enclosing `path`.
    pub fn clear_errors_for(&mut self, path: &FieldPath) {
        self.errors.retain(|p, _| !overlaps(p, path));
    }
}

/// Returns `true` if one path lies on the other's branch.
pub fn overlaps(a: &FieldPath, b: &FieldPath) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// Returns the top-level fields whose values differ between `initial` and `current`.
///
/// A field present on only one side counts as changed.
pub fn dirty_fields(initial: &FormValues, current: &FormValues) -> BTreeSet<FieldPath> {
    let mut dirty: BTreeSet<FieldPath> = current
        .iter()
        .filter(|(name, value)| initial.get(*name) != Some(*value))
        .map(|(name, _)| FieldPath::key(name.as_str()))
        .collect();
    dirty.extend(
        initial
            .keys()
            .filter(|name| !current.contains_key(*name))
            .map(|name| FieldPath::key(name.as_str())),
    );
    dirty
}
