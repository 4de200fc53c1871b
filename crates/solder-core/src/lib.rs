//! # Solder Core
//!
//! Foundation types for the solder command dispatch framework.
//!
//! This layer defines the data model shared by every stage of the
//! *search → parse → condition → invoke* pipeline:
//!
//! - [`RawValue`] / [`ParsedValue`] – the tagged input values and the
//!   type-erased parsed values flowing through the framework
//! - [`CallerContext`] – the contract the host implements for whoever issued
//!   the command
//! - [`TypeParser`] and [`ParserRegistry`] – the parser contract plus
//!   resolution of enum and collection parsers
//! - [`Parameter`] / [`Param`] – frozen parameter metadata and its builder
//! - [`Command`], [`CommandGroup`], [`ComponentCatalog`] – the registered
//!   component hierarchy and its search
//! - [`ArgumentSource`] – the consumable adapter over raw input
//! - [`ExecuteCondition`] – pre/post conditions with OR/AND grouping
//! - [`ExecuteResult`] – the sum type delivered at the end of every execution
//!
//! The execution pipeline and the registration surface live in
//! `solder-framework`, which builds on these types.

pub mod arguments;
pub mod caller;
pub mod comparer;
pub mod component;
pub mod condition;
pub mod error;
pub mod invoke;
pub mod parameter;
pub mod parser;
pub mod result;
pub mod value;

pub use arguments::ArgumentSource;
pub use caller::{CallerContext, Response, ServiceScope};
pub use comparer::NameComparer;
pub use component::{
    Attribute, Command, CommandGroup, CommandSpec, Component, ComponentCatalog, SearchCandidate,
};
pub use condition::{
    ConditionContext, ConditionEntry, ConditionFn, ConditionPhase, ConditionVerdict,
    ExecuteCondition, evaluate_conditions,
};
pub use error::BuildError;
pub use invoke::{BoundArgument, BoxedInvoker, Invocation, ParsedArguments};
pub use parameter::{Activator, ConstructedParameter, LeafParameter, Param, Parameter};
pub use parser::{ParseContext, ParserRegistry, TypeParser, TypeSpec};
pub use result::{
    ConditionFailure, ExecuteResult, InvokeFailure, InvokeOutput, LengthDirection, LengthMismatch,
    ParseFailure, ParseFailureKind, SearchFailure, Success,
};
pub use value::{ParsedValue, RawValue, parsed};
