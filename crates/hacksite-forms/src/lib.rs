//! # hacksite-forms
//!
//! Schema-driven form validation for the hackathon site. A [`FormEngine`]
//! tracks one form's values, per-field errors, touched fields and submit
//! lifecycle against any [`Schema`].
//!
//! ## Modules
//!
//! - [`path`] - Structured field paths (`teamLeader.name`, `members.0.email`)
//! - [`state`] - Form values and state snapshots
//! - [`rules`] - Reusable value constraints
//! - [`schema`] - The schema trait and the declarative object schema
//! - [`engine`] - The validation engine
//! - [`bound_field`] - Input bindings produced by the engine
//! - [`submit`] - Submit handlers, events and outcomes
//! - [`site_forms`] - The contact and registration schemas

pub mod bound_field;
pub mod engine;
pub mod path;
pub mod rules;
pub mod schema;
pub mod site_forms;
pub mod state;
pub mod submit;

pub use bound_field::FieldProps;
pub use engine::{FormEngine, FormEngineBuilder};
pub use path::{FieldPath, PathSegment};
pub use schema::{FieldSchema, FnSchema, ObjectSchema, Schema, Violation};
pub use state::{FormState, FormValues};
pub use submit::{submit_fn, SubmitEvent, SubmitHandler, SubmitOutcome};
