//! # Solder Framework
//!
//! The execution and registration layer of the solder command dispatch
//! framework.
//!
//! This crate turns the foundation types from `solder-core` into a working
//! pipeline:
//!
//! - [`ManagerBuilder`] / [`GroupBuilder`] / [`CommandBuilder`] – the fluent
//!   registration surface that freezes into a manager
//! - [`CommandManager`] – the frozen entry point with the `execute`,
//!   `execute_named`, and `execute_string` APIs
//! - the pipeline – *search → length gate → bind → pre-conditions → invoke →
//!   post-conditions → deliver*, in `Await` or `Discard` mode
//! - [`ResultHandler`] – the delivery chain every execution terminates in
//! - [`tokenize`] – shell-style splitting backing `execute_string`
//!
//! # Example
//!
//! ```rust,ignore
//! use solder_framework::{CommandBuilder, CommandManager, ExecuteOptions};
//! use solder_core::{InvokeOutput, Param};
//!
//! let manager = CommandManager::builder()
//!     .command(
//!         CommandBuilder::new("sum")
//!             .param(Param::required::<f64>("a"))
//!             .param(Param::required::<f64>("b"))
//!             .invoke(|inv| async move {
//!                 let a = *inv.arguments.get::<f64>(0)?;
//!                 let b = *inv.arguments.get::<f64>(1)?;
//!                 Ok(InvokeOutput::with_display(a + b))
//!             }),
//!     )
//!     .build()?;
//!
//! manager.execute_string(caller, "sum 2.5 3", ExecuteOptions::default()).await;
//! ```

mod bind;
mod pipeline;

pub mod builder;
pub mod handler;
pub mod manager;
pub mod options;
pub mod tokenizer;

pub use builder::{CommandBuilder, GroupBuilder, ManagerBuilder};
pub use handler::{ReplyResultHandler, ResultHandler, ResultHandlerFn};
pub use manager::CommandManager;
pub use options::{ExecuteMode, ExecuteOptions};
pub use tokenizer::tokenize;
