//! Result handlers: where every execution terminates.
//!
//! Handlers compose in registration order; the first one that accepts a
//! result ends the chain. When the host registers none, the builder appends
//! [`ReplyResultHandler`] so no result is ever dropped silently.

use async_trait::async_trait;
use tracing::{debug, error, warn};

use solder_core::{CallerContext, ExecuteResult, Response, ServiceScope};

/// Receives the terminal result of an execution.
#[async_trait]
pub trait ResultHandler: Send + Sync {
    /// Processes the result. Returning `true` stops the handler chain.
    async fn handle(
        &self,
        caller: &dyn CallerContext,
        result: &ExecuteResult,
        services: &ServiceScope,
    ) -> bool;
}

/// The default handler: replies with the success display text (when the
/// command produced one) or with the failure message, and logs either way.
pub struct ReplyResultHandler;

#[async_trait]
impl ResultHandler for ReplyResultHandler {
    async fn handle(
        &self,
        caller: &dyn CallerContext,
        result: &ExecuteResult,
        _services: &ServiceScope,
    ) -> bool {
        match result {
            ExecuteResult::Success(success) => {
                debug!(command = %success.command, "command succeeded");
                if let Some(text) = success.output.display_text() {
                    if let Err(reason) = caller.respond(Response::Text(text.to_string())).await {
                        error!(%reason, "failed to deliver reply");
                    }
                }
            }
            ExecuteResult::Canceled => {
                debug!(caller = caller.identity(), "execution canceled");
            }
            failure => {
                warn!(caller = caller.identity(), %failure, "execution failed");
                if let Err(reason) = caller.respond(Response::Text(failure.to_string())).await {
                    error!(%reason, "failed to deliver failure reply");
                }
            }
        }
        true
    }
}

/// Wraps a plain closure into a [`ResultHandler`].
pub struct ResultHandlerFn<F> {
    handle: F,
}

impl<F> ResultHandlerFn<F>
where
    F: Fn(&dyn CallerContext, &ExecuteResult, &ServiceScope) -> bool + Send + Sync,
{
    /// Creates a handler from a closure; the closure's return value decides
    /// whether the chain stops.
    pub fn new(handle: F) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl<F> ResultHandler for ResultHandlerFn<F>
where
    F: Fn(&dyn CallerContext, &ExecuteResult, &ServiceScope) -> bool + Send + Sync,
{
    async fn handle(
        &self,
        caller: &dyn CallerContext,
        result: &ExecuteResult,
        services: &ServiceScope,
    ) -> bool {
        (self.handle)(caller, result, services)
    }
}
