//! Per-execution options.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use solder_core::{NameComparer, ServiceScope};

/// How the caller observes completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecuteMode {
    /// The `execute` call returns only after the result was delivered.
    #[default]
    Await,
    /// The pipeline runs on a detached task; `execute` returns immediately.
    /// The result is still delivered to the handler chain.
    Discard,
}

/// Options for a single `execute` call.
///
/// ```rust,ignore
/// let options = ExecuteOptions::default()
///     .mode(ExecuteMode::Discard)
///     .cancel(token.clone());
/// ```
#[derive(Clone)]
pub struct ExecuteOptions {
    pub(crate) mode: ExecuteMode,
    pub(crate) skip_preconditions: bool,
    pub(crate) skip_postconditions: bool,
    pub(crate) continue_on_invoke_failure: bool,
    pub(crate) remainder_separator: char,
    pub(crate) name_comparer: Option<NameComparer>,
    pub(crate) services: Arc<ServiceScope>,
    pub(crate) cancel: CancellationToken,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            mode: ExecuteMode::Await,
            skip_preconditions: false,
            skip_postconditions: false,
            continue_on_invoke_failure: false,
            remainder_separator: ' ',
            name_comparer: None,
            services: Arc::new(ServiceScope::new()),
            cancel: CancellationToken::new(),
        }
    }
}

impl ExecuteOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the completion mode.
    pub fn mode(mut self, mode: ExecuteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Skips pre-condition evaluation for this execution.
    pub fn skip_preconditions(mut self, skip: bool) -> Self {
        self.skip_preconditions = skip;
        self
    }

    /// Skips post-condition evaluation for this execution.
    pub fn skip_postconditions(mut self, skip: bool) -> Self {
        self.skip_postconditions = skip;
        self
    }

    /// Falls back to the next candidate when a command body fails.
    ///
    /// Off by default: the command already ran, so the failure is terminal
    /// unless the host explicitly opts in.
    pub fn continue_on_invoke_failure(mut self, fallback: bool) -> Self {
        self.continue_on_invoke_failure = fallback;
        self
    }

    /// The separator used when joining a string remainder (default `' '`).
    pub fn remainder_separator(mut self, separator: char) -> Self {
        self.remainder_separator = separator;
        self
    }

    /// Overrides the manager's comparer for named argument keys.
    pub fn name_comparer(mut self, comparer: NameComparer) -> Self {
        self.name_comparer = Some(comparer);
        self
    }

    /// The service scope exposed to parsers, conditions, and bodies.
    pub fn services(mut self, services: Arc<ServiceScope>) -> Self {
        self.services = services;
        self
    }

    /// The cancellation token observed at every suspension point.
    pub fn cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl std::fmt::Debug for ExecuteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecuteOptions")
            .field("mode", &self.mode)
            .field("skip_preconditions", &self.skip_preconditions)
            .field("skip_postconditions", &self.skip_postconditions)
            .finish_non_exhaustive()
    }
}
