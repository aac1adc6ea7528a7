//! Error boundary for page sections.
//!
//! An [`ErrorBoundary`] wraps the rendering of one section of the site. When
//! the render closure returns an error or panics, the failure is reported to
//! the shared [`ErrorLogger`] and the boundary switches to a fallback carrying
//! the error's identifier. The fallback persists until [`ErrorBoundary::reset`]
//! (the "Try again" button) or [`ErrorBoundary::retry`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::SiteError;
use crate::error_log::{ErrorId, ErrorLogger};

/// What the boundary shows instead of the failed section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    /// Identifier of the reported error.
    pub error_id: ErrorId,
    /// Short identifier suitable for display.
    pub display_id: String,
    /// The error message.
    pub message: String,
}

/// Result of rendering through a boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryOutcome<T> {
    /// The section rendered.
    Rendered(T),
    /// The section failed; show the fallback.
    Fallback(Fallback),
}

impl<T> BoundaryOutcome<T> {
    /// Returns the rendered value, if any.
    pub fn rendered(self) -> Option<T> {
        match self {
            Self::Rendered(value) => Some(value),
            Self::Fallback(_) => None,
        }
    }
}

/// Catches failures from one section and reports them.
#[derive(Debug)]
pub struct ErrorBoundary {
    name: String,
    logger: Arc<ErrorLogger>,
    failure: Option<Fallback>,
    retries: usize,
}

impl ErrorBoundary {
    /// Creates a boundary for the named section.
    pub fn new(name: impl Into<String>, logger: Arc<ErrorLogger>) -> Self {
        Self {
            name: name.into(),
            logger,
            failure: None,
            retries: 0,
        }
    }

    /// Renders the section.
    ///
    /// While a previous failure has not been reset the closure is not called
    /// and the existing fallback is returned.
    pub fn render<T, F>(&mut self, render: F) -> BoundaryOutcome<T>
    where
        F: FnOnce() -> Result<T, SiteError>,
    {
        if let Some(fallback) = &self.failure {
            return BoundaryOutcome::Fallback(fallback.clone());
        }

        let (error_id, message) = match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(Ok(value)) => return BoundaryOutcome::Rendered(value),
            Ok(Err(err)) => (self.logger.report(&err, &self.name), err.to_string()),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                (
                    self.logger.report_message("panic", &message, &self.name),
                    message,
                )
            }
        };

        let fallback = Fallback {
            error_id,
            display_id: error_id.short(self.logger.id_prefix()),
            message,
        };
        self.failure = Some(fallback.clone());
        BoundaryOutcome::Fallback(fallback)
    }

    /// Clears the failure so the next render runs again.
    pub fn reset(&mut self) {
        self.failure = None;
    }

    /// Clears the failure and renders again.
    pub fn retry<T, F>(&mut self, render: F) -> BoundaryOutcome<T>
    where
        F: FnOnce() -> Result<T, SiteError>,
    {
        self.retries += 1;
        tracing::info!(boundary = %self.name, retries = self.retries, "retrying section");
        self.reset();
        self.render(render)
    }

    /// Returns `true` if the boundary is showing a fallback.
    pub fn has_error(&self) -> bool {
        self.failure.is_some()
    }

    /// The current fallback, if any.
    pub fn fallback(&self) -> Option<&Fallback> {
        self.failure.as_ref()
    }

    /// How many times [`retry`](Self::retry) was called.
    pub fn retry_count(&self) -> usize {
        self.retries
    }

    /// The section name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary() -> (ErrorBoundary, Arc<ErrorLogger>) {
        let logger = Arc::new(ErrorLogger::new(10));
        (ErrorBoundary::new("Schedule", Arc::clone(&logger)), logger)
    }

    #[test]
    fn test_render_ok() {
        let (mut b, logger) = boundary();
        let out = b.render(|| Ok::<_, SiteError>("<section/>"));
        assert_eq!(out, BoundaryOutcome::Rendered("<section/>"));
        assert!(!b.has_error());
        assert!(logger.is_empty());
    }

    #[test]
    fn test_render_error_reports_and_falls_back() {
        let (mut b, logger) = boundary();
        let out: BoundaryOutcome<()> = b.render(|| Err(SiteError::Render("bad slot".into())));
        let BoundaryOutcome::Fallback(fallback) = out else {
            panic!("expected fallback");
        };
        assert!(b.has_error());
        assert_eq!(fallback.message, "Render error: bad slot");
        assert!(fallback.display_id.starts_with("ERR-"));
        let report = logger.get(fallback.error_id).unwrap();
        assert_eq!(report.context, "Schedule");
        assert_eq!(report.code, "render");
    }

    #[test]
    fn test_render_panic_is_caught() {
        let (mut b, logger) = boundary();
        let out: BoundaryOutcome<()> = b.render(|| panic!("index out of range"));
        let BoundaryOutcome::Fallback(fallback) = out else {
            panic!("expected fallback");
        };
        assert_eq!(fallback.message, "index out of range");
        assert_eq!(logger.get(fallback.error_id).unwrap().code, "panic");
    }

    #[test]
    fn test_fallback_sticks_until_reset() {
        let (mut b, logger) = boundary();
        let _: BoundaryOutcome<()> = b.render(|| Err(SiteError::Render("x".into())));
        let out = b.render(|| Ok::<_, SiteError>(1));
        assert!(out.rendered().is_none());
        assert_eq!(logger.len(), 1);

        b.reset();
        assert_eq!(b.render(|| Ok::<_, SiteError>(1)).rendered(), Some(1));
    }

    #[test]
    fn test_retry_counts() {
        let (mut b, _) = boundary();
        let _: BoundaryOutcome<()> = b.render(|| Err(SiteError::Render("x".into())));
        let out = b.retry(|| Ok::<_, SiteError>("ok"));
        assert_eq!(out.rendered(), Some("ok"));
        assert_eq!(b.retry_count(), 1);
        assert!(b.fallback().is_none());
    }

    #[test]
    fn test_panic_message_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
