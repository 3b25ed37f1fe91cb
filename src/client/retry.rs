//! Bounded retry around namenode requests
//!
//! Every transport failure is treated as "maybe the wrong namenode": the
//! default hook re-locates the active node and the request is re-sent
//! immediately. There is no backoff.

use crate::common::{Error, Result};
use crate::coordinator::CoordinatorLocator;
use crate::protocol::UrlTemplate;
use crate::transport::{Method, Transport};

/// One invocation of the retry executor
#[derive(Debug, Clone)]
pub struct TransferAttempt {
    template: UrlTemplate,
    method: Method,
    attempts: u32,
    budget: u32,
}

impl TransferAttempt {
    /// A budget of zero still allows one attempt
    pub fn new(template: UrlTemplate, budget: u32) -> Self {
        let method = template.operation().method();
        Self {
            template,
            method,
            attempts: 0,
            budget: budget.max(1),
        }
    }

    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Failed attempts so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.budget
    }
}

/// What the hook gets to see about a failed attempt
#[derive(Debug)]
pub struct AttemptFailure<'a> {
    pub url: &'a str,
    pub method: Method,
    pub error: &'a Error,
    pub attempt: u32,
    pub budget: u32,
    pub is_final: bool,
}

/// Reaction to a failed attempt. Returning an error aborts the retry loop.
pub trait FailureHook {
    fn on_failure(
        &self,
        failure: &AttemptFailure<'_>,
        locator: &mut CoordinatorLocator,
        transport: &dyn Transport,
    ) -> Result<()>;
}

/// Log the failure and, unless it was the last attempt, re-locate the active namenode
#[derive(Debug, Default, Clone, Copy)]
pub struct RefreshCoordinator;

impl FailureHook for RefreshCoordinator {
    fn on_failure(
        &self,
        failure: &AttemptFailure<'_>,
        locator: &mut CoordinatorLocator,
        transport: &dyn Transport,
    ) -> Result<()> {
        if failure.is_final {
            tracing::error!(
                url = failure.url,
                method = %failure.method,
                attempts = failure.attempt,
                error = %failure.error,
                "Request failed, giving up"
            );
            return Ok(());
        }
        tracing::warn!(
            url = failure.url,
            method = %failure.method,
            attempt = failure.attempt,
            budget = failure.budget,
            error = %failure.error,
            "Request failed, refreshing active namenode and retrying"
        );
        locator.refresh(transport)?;
        Ok(())
    }
}

/// Log only; keep routing to the same namenode
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnly;

impl FailureHook for LogOnly {
    fn on_failure(
        &self,
        failure: &AttemptFailure<'_>,
        _locator: &mut CoordinatorLocator,
        _transport: &dyn Transport,
    ) -> Result<()> {
        tracing::warn!(
            url = failure.url,
            attempt = failure.attempt,
            budget = failure.budget,
            final_attempt = failure.is_final,
            error = %failure.error,
            "Request failed"
        );
        Ok(())
    }
}

/// Run `op` against the active namenode until it succeeds or the budget is
/// spent. `Ok(None)` means the budget ran out; errors that are not
/// retryable, and errors raised by the hook, propagate.
pub fn execute<R, F>(
    locator: &mut CoordinatorLocator,
    transport: &dyn Transport,
    attempt: &mut TransferAttempt,
    hook: &dyn FailureHook,
    mut op: F,
) -> Result<Option<R>>
where
    F: FnMut(&dyn Transport, &str, Method) -> Result<R>,
{
    loop {
        let url = {
            let node = locator.ensure_fresh(transport)?;
            attempt.template.resolve(node)
        };

        let error = match op(transport, &url, attempt.method) {
            Ok(value) => return Ok(Some(value)),
            Err(e) if e.is_retryable() => e,
            Err(e) => return Err(e),
        };

        attempt.attempts += 1;
        let failure = AttemptFailure {
            url: &url,
            method: attempt.method,
            error: &error,
            attempt: attempt.attempts,
            budget: attempt.budget,
            is_final: attempt.is_exhausted(),
        };
        hook.on_failure(&failure, locator, transport)?;
        if failure.is_final {
            return Ok(None);
        }
    }
}
