//! Settings for hacksite.
//!
//! This module provides the [`Settings`] struct, which holds all site
//! configuration. Every field has a sensible default so a partial
//! configuration file is enough. Settings are passed to whatever needs them;
//! there is no global instance.

use serde::{Deserialize, Serialize};

/// Error logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorLogSettings {
    /// How many recent error reports are kept in memory.
    pub capacity: usize,
    /// The prefix shown before an error identifier in fallback UIs.
    pub id_prefix: String,
}

impl Default for ErrorLogSettings {
    fn default() -> Self {
        Self {
            capacity: 100,
            id_prefix: "ERR".to_string(),
        }
    }
}

/// Form engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormSettings {
    /// Whether a failed submission is stored on the form state as `submit_error`.
    ///
    /// When `false` submission failures are only logged.
    pub surface_submit_errors: bool,
    /// Whether `handle_submit` logs the submitted values at debug level.
    pub log_submitted_values: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            surface_submit_errors: true,
            log_submitted_values: false,
        }
    }
}

/// The complete set of site settings.
///
/// # Examples
///
/// ```
/// use hacksite_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The site's display name.
    pub site_name: String,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "info", "debug", "hacksite_forms=trace").
    pub log_level: String,

    // ── Error reporting ──────────────────────────────────────────────

    /// Error logger configuration.
    pub error_log: ErrorLogSettings,

    // ── Forms ────────────────────────────────────────────────────────

    /// Form engine configuration.
    pub forms: FormSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            site_name: "Hackathon".to_string(),
            log_level: "info".to_string(),
            error_log: ErrorLogSettings::default(),
            forms: FormSettings::default(),
        }
    }
}
