//! Error reporting for the site.
//!
//! The [`ErrorLogger`] gives every reported error an opaque [`ErrorId`] that a
//! fallback UI can show to the visitor and that support can look up later.
//! Reports are kept in a bounded in-memory history and mirrored to `tracing`.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SiteError;
use crate::settings::ErrorLogSettings;

/// An opaque identifier assigned to a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorId(Uuid);

impl ErrorId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns a short, human-friendly form such as `ERR-1A2B3C4D`.
    pub fn short(&self, prefix: &str) -> String {
        let simple = self.0.simple().to_string().to_uppercase();
        format!("{prefix}-{}", &simple[..8])
    }
}

impl Default for ErrorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recorded error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// The identifier handed back to the caller.
    pub id: ErrorId,
    /// The error code (see [`SiteError::code`]).
    pub code: String,
    /// The error message.
    pub message: String,
    /// Where the error happened (component or form name).
    pub context: String,
    /// When the error was reported.
    pub occurred_at: DateTime<Utc>,
}

/// Records errors with opaque identifiers and a bounded history.
///
/// # Examples
///
/// ```
/// use hacksite_core::error::SiteError;
/// use hacksite_core::error_log::ErrorLogger;
///
/// let logger = ErrorLogger::new(10);
/// let id = logger.report(&SiteError::Render("gallery grid".into()), "Gallery");
/// assert_eq!(logger.get(id).unwrap().context, "Gallery");
/// ```
#[derive(Debug)]
pub struct ErrorLogger {
    capacity: usize,
    id_prefix: String,
    reports: Mutex<VecDeque<ErrorReport>>,
}

impl ErrorLogger {
    /// Creates a logger that keeps at most `capacity` reports.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            id_prefix: ErrorLogSettings::default().id_prefix,
            reports: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Creates a logger from the error log settings.
    pub fn from_settings(settings: &ErrorLogSettings) -> Self {
        Self {
            id_prefix: settings.id_prefix.clone(),
            ..Self::new(settings.capacity)
        }
    }

    /// Reports an error, returning its identifier.
    pub fn report(&self, error: &SiteError, context: &str) -> ErrorId {
        self.report_message(error.code(), &error.to_string(), context)
    }

    /// Reports an error given only its code and message.
    ///
    /// Used for panics and other failures that are not a [`SiteError`].
    pub fn report_message(&self, code: &str, message: &str, context: &str) -> ErrorId {
        let id = ErrorId::new();
        tracing::error!(
            error_id = %id.short(&self.id_prefix),
            code,
            context,
            "{message}"
        );

        if self.capacity == 0 {
            return id;
        }

        let report = ErrorReport {
            id,
            code: code.to_string(),
            message: message.to_string(),
            context: context.to_string(),
            occurred_at: Utc::now(),
        };

        let mut reports = self.reports.lock().expect("error log lock poisoned");
        while reports.len() >= self.capacity {
            reports.pop_front();
        }
        reports.push_back(report);
        id
    }

    /// Looks up a report by identifier.
    pub fn get(&self, id: ErrorId) -> Option<ErrorReport> {
        self.reports
            .lock()
            .expect("error log lock poisoned")
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Returns the retained reports, oldest first.
    pub fn recent(&self) -> Vec<ErrorReport> {
        self.reports
            .lock()
            .expect("error log lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Returns the number of retained reports.
    pub fn len(&self) -> usize {
        self.reports.lock().expect("error log lock poisoned").len()
    }

    /// Returns `true` if no reports are retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all retained reports.
    pub fn clear(&self) {
        self.reports.lock().expect("error log lock poisoned").clear();
    }

    /// The prefix used for short identifiers.
    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }
}

impl Default for ErrorLogger {
    fn default() -> Self {
        Self::from_settings(&ErrorLogSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_assigns_unique_ids() {
        let logger = ErrorLogger::new(10);
        let a = logger.report(&SiteError::Render("a".into()), "Hero");
        let b = logger.report(&SiteError::Render("b".into()), "Hero");
        assert_ne!(a, b);
        assert_eq!(logger.len(), 2);
    }

    #[test]
    fn test_report_records_code_and_message() {
        let logger = ErrorLogger::new(10);
        let id = logger.report(&SiteError::Submission("timeout".into()), "contact");
        let report = logger.get(id).unwrap();
        assert_eq!(report.code, "submission");
        assert_eq!(report.message, "Submission failed: timeout");
        assert_eq!(report.context, "contact");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let logger = ErrorLogger::new(2);
        let first = logger.report_message("render", "one", "A");
        logger.report_message("render", "two", "B");
        logger.report_message("render", "three", "C");
        assert_eq!(logger.len(), 2);
        assert!(logger.get(first).is_none());
        let messages: Vec<String> = logger.recent().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let logger = ErrorLogger::new(0);
        logger.report_message("render", "gone", "A");
        assert!(logger.is_empty());
    }

    #[test]
    fn test_clear() {
        let logger = ErrorLogger::new(5);
        logger.report_message("render", "x", "A");
        logger.clear();
        assert!(logger.is_empty());
    }

    #[test]
    fn test_short_id_format() {
        let id = ErrorId::new();
        let short = id.short("ERR");
        assert!(short.starts_with("ERR-"));
        assert_eq!(short.len(), 12);
        assert_eq!(short, short.to_uppercase());
    }

    #[test]
    fn test_from_settings() {
        let settings = ErrorLogSettings {
            capacity: 3,
            id_prefix: "HF".to_string(),
        };
        let logger = ErrorLogger::from_settings(&settings);
        assert_eq!(logger.id_prefix(), "HF");
        for i in 0..5 {
            logger.report_message("render", &i.to_string(), "A");
        }
        assert_eq!(logger.len(), 3);
    }
}
