//! The frozen manager and its execute APIs.

use std::sync::Arc;

use solder_core::{
    ArgumentSource, CallerContext, ComponentCatalog, NameComparer, RawValue,
};

use crate::builder::ManagerBuilder;
use crate::handler::ResultHandler;
use crate::options::{ExecuteMode, ExecuteOptions};
use crate::pipeline::{self, PipelineRun};
use crate::tokenizer::tokenize;

/// The frozen command dispatch entry point.
///
/// Holds the catalog and the handler chain behind `Arc`s; everything is
/// read-only after [`ManagerBuilder::build`], so a manager is cheap to clone
/// and safe to share across concurrent executions.
#[derive(Clone)]
pub struct CommandManager {
    catalog: Arc<ComponentCatalog>,
    handlers: Arc<[Arc<dyn ResultHandler>]>,
    comparer: NameComparer,
}

impl CommandManager {
    pub(crate) fn new(
        catalog: Arc<ComponentCatalog>,
        handlers: Arc<[Arc<dyn ResultHandler>]>,
        comparer: NameComparer,
    ) -> Self {
        Self {
            catalog,
            handlers,
            comparer,
        }
    }

    /// Starts a registration builder.
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    /// The frozen catalog.
    pub fn catalog(&self) -> &Arc<ComponentCatalog> {
        &self.catalog
    }

    /// Executes over positional raw values.
    pub async fn execute(
        &self,
        caller: Arc<dyn CallerContext>,
        values: Vec<RawValue>,
        options: ExecuteOptions,
    ) {
        let source = ArgumentSource::from_values(values, self.key_comparer(&options));
        self.dispatch(caller, source, options).await;
    }

    /// Executes over key/value pairs; a pair with a `None` value is demoted
    /// to a positional of the key string.
    pub async fn execute_named(
        &self,
        caller: Arc<dyn CallerContext>,
        pairs: Vec<(String, Option<RawValue>)>,
        options: ExecuteOptions,
    ) {
        let source = ArgumentSource::from_pairs(pairs, self.key_comparer(&options));
        self.dispatch(caller, source, options).await;
    }

    /// Tokenizes a command line and executes it.
    pub async fn execute_string(
        &self,
        caller: Arc<dyn CallerContext>,
        line: &str,
        options: ExecuteOptions,
    ) {
        let source = ArgumentSource::from_tokens(tokenize(line), self.key_comparer(&options));
        self.dispatch(caller, source, options).await;
    }

    fn key_comparer(&self, options: &ExecuteOptions) -> NameComparer {
        options.name_comparer.unwrap_or(self.comparer)
    }

    async fn dispatch(
        &self,
        caller: Arc<dyn CallerContext>,
        source: ArgumentSource,
        options: ExecuteOptions,
    ) {
        let mode = options.mode;
        let run = PipelineRun {
            catalog: Arc::clone(&self.catalog),
            handlers: Arc::clone(&self.handlers),
            caller,
            source,
            options,
        };
        match mode {
            ExecuteMode::Await => pipeline::run(run).await,
            ExecuteMode::Discard => {
                tokio::spawn(pipeline::run(run));
            }
        }
    }
}

impl std::fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandManager")
            .field("catalog", &self.catalog)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
