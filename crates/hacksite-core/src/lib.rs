//! # hacksite-core
//!
//! Core types for the hackathon site: error types, settings and their
//! loader, tracing setup, the error logger and the section error boundary.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Site settings
//! - [`settings_loader`] - TOML/JSON/env settings loading
//! - [`logging`] - Tracing-based logging integration
//! - [`error_log`] - Error reports with opaque identifiers
//! - [`boundary`] - Catch-and-report wrapper for page sections

pub mod boundary;
pub mod error;
pub mod error_log;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{SiteError, SiteResult, ValidationError};
pub use settings::Settings;
