//! # hacksite
//!
//! The hackathon site's form layer in one crate.
//!
//! This is the meta-crate that re-exports the sub-crates and wires them
//! together through [`Site`]: settings, logging, the shared error logger,
//! and pre-configured contact and registration forms.

use std::sync::Arc;

use hacksite_core::boundary::ErrorBoundary;
use hacksite_core::error_log::ErrorLogger;
use hacksite_core::logging::setup_logging;
use hacksite_core::Settings;
use hacksite_forms::site_forms::{contact_schema, registration_schema};
use hacksite_forms::{FormEngineBuilder, FormValues, Schema};
use serde_json::json;

/// Core types, settings, logging, error logger and error boundary.
pub use hacksite_core as core;

/// Field paths, schemas, the validation engine and the site forms.
pub use hacksite_forms as forms;

// Third-party re-exports for user convenience
pub use anyhow;
pub use async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Commonly used items.
pub mod prelude {
    pub use crate::Site;
    pub use hacksite_core::boundary::{BoundaryOutcome, ErrorBoundary};
    pub use hacksite_core::{SiteError, SiteResult, ValidationError};
    pub use hacksite_forms::{
        submit_fn, FieldPath, FieldProps, FieldSchema, FormEngine, FormValues, ObjectSchema,
        Schema, SubmitEvent, SubmitOutcome,
    };
}

/// One running site: its settings and the error logger its sections share.
#[derive(Debug)]
pub struct Site {
    settings: Settings,
    error_log: Arc<ErrorLogger>,
}

impl Site {
    pub fn new(settings: Settings) -> Self {
        let error_log = Arc::new(ErrorLogger::from_settings(&settings.error_log));
        Self {
            settings,
            error_log,
        }
    }

    /// Installs logging, then builds the site.
    ///
    /// Only the first call installs a subscriber; later calls just build.
    pub fn init(settings: Settings) -> Self {
        setup_logging(&settings);
        tracing::info!(site = %settings.site_name, debug = settings.debug, "site initialized");
        Self::new(settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn error_log(&self) -> &Arc<ErrorLogger> {
        &self.error_log
    }

    /// Starts a form using this site's form settings.
    pub fn form(&self, name: &str, schema: impl Schema + 'static) -> FormEngineBuilder {
        hacksite_forms::FormEngine::builder(schema)
            .name(name)
            .settings(&self.settings.forms)
    }

    /// The contact form, seeded with empty fields.
    pub fn contact_form(&self) -> FormEngineBuilder {
        self.form("contact", contact_schema())
            .initial_values(seed(&json!({
                "name": "",
                "email": "",
                "subject": "",
                "message": ""
            })))
    }

    /// The registration form, seeded with an empty leader and one empty member.
    pub fn registration_form(&self) -> FormEngineBuilder {
        self.form("registration", registration_schema())
            .initial_values(seed(&json!({
                "teamName": "",
                "teamLeader": { "name": "", "email": "", "phone": "" },
                "members": [{ "name": "", "email": "" }],
                "track": "",
                "experience": "",
                "agreeToTerms": false
            })))
    }

    /// An error boundary reporting to this site's error logger.
    pub fn boundary(&self, section: &str) -> ErrorBoundary {
        ErrorBoundary::new(section, Arc::clone(&self.error_log))
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

fn seed(values: &serde_json::Value) -> FormValues {
    values.as_object().cloned().unwrap_or_default()
}
