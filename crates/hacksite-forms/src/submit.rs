//! Submit handlers and submit outcomes.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use crate::state::FormValues;

/// Receives the validated values when a form is submitted.
///
/// Handlers may do asynchronous work and may fail. Failures are caught by the
/// engine, logged, and reported through
/// [`SubmitOutcome::Failed`]; they never propagate out of
/// [`FormEngine::handle_submit`](crate::engine::FormEngine::handle_submit).
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    /// Handles one submission.
    async fn submit(&self, values: FormValues) -> anyhow::Result<()>;
}

/// A [`SubmitHandler`] backed by an async closure.
pub struct FnSubmitHandler<F> {
    func: F,
}

impl<F> fmt::Debug for FnSubmitHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSubmitHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> SubmitHandler for FnSubmitHandler<F>
where
    F: Fn(FormValues) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn submit(&self, values: FormValues) -> anyhow::Result<()> {
        (self.func)(values).await
    }
}

/// Wraps an async closure as a [`SubmitHandler`].
///
/// # Examples
///
/// ```
/// use hacksite_forms::submit::submit_fn;
///
/// let handler = submit_fn(|values| async move {
///     tracing::info!(fields = values.len(), "sending contact message");
///     Ok::<(), anyhow::Error>(())
/// });
/// # let _ = handler;
/// ```
pub fn submit_fn<F, Fut>(func: F) -> FnSubmitHandler<F>
where
    F: Fn(FormValues) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnSubmitHandler { func }
}

/// The browser-side submit event, reduced to what the engine touches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the native form submission.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// How a call to `handle_submit` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the handler was not called.
    Invalid,
    /// Validation passed and no handler is configured.
    Validated,
    /// The handler completed successfully.
    Submitted,
    /// The handler returned an error or panicked.
    Failed(String),
}

impl SubmitOutcome {
    /// Returns `true` if the handler ran and succeeded.
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}
