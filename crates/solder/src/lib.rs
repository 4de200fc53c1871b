//! # Solder
//!
//! An async command dispatch framework: given raw argument values and a
//! registered set of commands, solder finds the best-matching command, parses
//! its arguments into typed parameters, evaluates authorization conditions,
//! invokes the body, and delivers the result.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐    ┌────────┐    ┌──────┐    ┌────────────┐    ┌────────┐
//! │ Manager  │───▶│ Search │───▶│ Bind │───▶│ Conditions │───▶│ Invoke │
//! │ (frozen) │    │catalog │    │parse │    │  pre/post  │    │  body  │
//! └──────────┘    └────────┘    └──────┘    └────────────┘    └───┬────┘
//!                                                                 ▼
//!                                                          result handlers
//! ```
//!
//! - **Catalog**: groups and commands registered once at startup, ranked by
//!   priority, score, and registration order
//! - **Binding**: positional and named raw values parsed into typed
//!   parameters, with collections, enums, constructed aggregates, and
//!   remainders
//! - **Conditions**: pre/post rules, OR within a group key, AND across keys
//! - **Pipeline**: `Await` or `Discard` mode; exactly one result delivered
//!   per execution
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solder::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BuildError> {
//!     let manager = CommandManager::builder()
//!         .command(
//!             CommandBuilder::new("greet")
//!                 .param(Param::with_default::<String>("name", "world".into()))
//!                 .invoke(|inv| async move {
//!                     let name = inv.arguments.get::<String>(0)?;
//!                     Ok(InvokeOutput::with_display(format!("Hello, {name}!")))
//!                 }),
//!         )
//!         .build()?;
//!
//!     manager.execute_string(caller, "greet", ExecuteOptions::default()).await;
//!     Ok(())
//! }
//! ```

pub use solder_core as core;
pub use solder_framework as framework;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use solder::prelude::*;
/// ```
pub mod prelude {
    // Entry point and registration surface
    pub use solder_framework::{
        CommandBuilder, CommandManager, ExecuteMode, ExecuteOptions, GroupBuilder, ManagerBuilder,
    };

    // Parameter and parser declarations
    pub use solder_core::{Param, ParseContext, RawValue, TypeParser};

    // Conditions
    pub use solder_core::{ConditionContext, ConditionFn, ConditionPhase, ExecuteCondition};

    // Caller contract and execution results
    pub use solder_core::{
        BuildError, CallerContext, ExecuteResult, Invocation, InvokeOutput, NameComparer,
        Response, ServiceScope,
    };

    // Result delivery
    pub use solder_framework::{ReplyResultHandler, ResultHandler, ResultHandlerFn};
}
