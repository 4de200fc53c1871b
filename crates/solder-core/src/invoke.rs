//! Invocation types: bound arguments and the invoker contract.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::caller::{CallerContext, ServiceScope};
use crate::component::Command;
use crate::result::InvokeOutput;
use crate::value::ParsedValue;

/// One bound argument: the parameter name plus its parsed value.
///
/// `value` is `None` only for an optional parameter that was absent and has
/// no default; typed access through [`ParsedArguments::opt`] surfaces that as
/// `None`.
#[derive(Clone)]
pub struct BoundArgument {
    pub(crate) name: String,
    pub(crate) value: Option<ParsedValue>,
}

impl BoundArgument {
    /// Creates a bound argument, present or absent.
    pub fn new(name: impl Into<String>, value: Option<ParsedValue>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Creates a present bound argument.
    pub fn present(name: impl Into<String>, value: ParsedValue) -> Self {
        Self::new(name, Some(value))
    }

    /// The parameter name this value was bound for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw parsed value, if present.
    pub fn value(&self) -> Option<&ParsedValue> {
        self.value.as_ref()
    }
}

/// The parsed argument vector handed to a command body or an activator.
///
/// Values are accessed by declaration index:
///
/// ```rust,ignore
/// let a = invocation.arguments.get::<f64>(0)?;
/// let name = invocation.arguments.opt::<String>(1);
/// ```
#[derive(Clone, Default)]
pub struct ParsedArguments {
    values: Vec<BoundArgument>,
}

impl ParsedArguments {
    pub fn new(values: Vec<BoundArgument>) -> Self {
        Self { values }
    }

    /// Number of bound arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no arguments were bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Typed access to a required argument.
    ///
    /// Fails with a descriptive reason when the index is out of range, the
    /// value is absent, or the type does not match the declaration.
    pub fn get<T: 'static>(&self, index: usize) -> Result<&T, String> {
        let arg = self
            .values
            .get(index)
            .ok_or_else(|| format!("no argument at index {index}"))?;
        let value = arg
            .value
            .as_ref()
            .ok_or_else(|| format!("argument '{}' was not provided", arg.name))?;
        value.downcast_ref::<T>().ok_or_else(|| {
            format!(
                "argument '{}' is not a {}",
                arg.name,
                std::any::type_name::<T>()
            )
        })
    }

    /// Typed access to an optional argument; `None` when absent.
    pub fn opt<T: 'static>(&self, index: usize) -> Option<&T> {
        self.values
            .get(index)
            .and_then(|arg| arg.value.as_ref())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Iterates over the bound arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundArgument> {
        self.values.iter()
    }
}

impl fmt::Debug for ParsedArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(|arg| &arg.name))
            .finish()
    }
}

/// Everything a command body receives when invoked.
pub struct Invocation {
    /// The caller the command runs on behalf of.
    pub caller: Arc<dyn CallerContext>,
    /// The resolved command.
    pub command: Arc<Command>,
    /// The parsed argument vector, in declaration order.
    pub arguments: ParsedArguments,
    /// Services scoped to this execution.
    pub services: Arc<ServiceScope>,
    /// Cancellation token for cooperative abort.
    pub cancel: CancellationToken,
}

/// The type-erased command body.
///
/// Bodies report failure as `Err(reason)`; the pipeline wraps it into an
/// invoke failure without unwinding.
pub type BoxedInvoker =
    Arc<dyn Fn(Invocation) -> BoxFuture<'static, Result<InvokeOutput, String>> + Send + Sync>;
