//! The registered component hierarchy.
//!
//! A *component* is either a [`CommandGroup`] (named, holds children) or a
//! [`Command`] (named, executable leaf). The frozen tree is owned by the
//! [`ComponentCatalog`]; groups own their children, and everything a command
//! needs from its ancestors (full name, inherited conditions) is flattened
//! onto it when the tree is built, so the runtime structure is acyclic and
//! freely shareable.

mod catalog;
mod command;
mod group;

use std::sync::Arc;

pub use catalog::{ComponentCatalog, SearchCandidate};
pub use command::{Command, CommandSpec};
pub use group::CommandGroup;

use crate::comparer::NameComparer;

/// A metadata tag attached to a group or command.
///
/// Attributes are opaque to the framework; conditions and result handlers
/// consult them by key.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// The tag name.
    pub key: String,
    /// An arbitrary payload.
    pub value: serde_json::Value,
}

impl Attribute {
    /// Creates an attribute.
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One node of the frozen component tree.
#[derive(Clone)]
pub enum Component {
    /// A named group of child components.
    Group(Arc<CommandGroup>),
    /// An executable leaf.
    Command(Arc<Command>),
}

impl Component {
    /// The component's aliases; empty only for a default command.
    pub fn aliases(&self) -> &[String] {
        match self {
            Self::Group(group) => group.aliases(),
            Self::Command(command) => command.aliases(),
        }
    }

    /// The component's structural specificity score.
    pub fn score(&self) -> f64 {
        match self {
            Self::Group(group) => group.score(),
            Self::Command(command) => command.score(),
        }
    }

    /// Whether any alias matches `token` under `comparer`.
    pub(crate) fn matches_alias(&self, token: &str, comparer: NameComparer) -> bool {
        self.aliases().iter().any(|alias| comparer.eq(alias, token))
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group(group) => write!(f, "Group({})", group.name()),
            Self::Command(command) => write!(f, "Command({})", command.full_name()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use futures::FutureExt;

    use super::{Command, CommandSpec};
    use crate::invoke::BoxedInvoker;
    use crate::result::InvokeOutput;

    /// A no-op invoker for structural tests.
    pub(crate) fn noop_invoker() -> BoxedInvoker {
        Arc::new(|_invocation| async { Ok(InvokeOutput::void()) }.boxed())
    }

    /// A parameterless command for tests that only need a command value.
    pub(crate) fn empty_command(name: &str) -> Command {
        Command::new(CommandSpec {
            aliases: vec![name.to_string()],
            full_name: name.to_string(),
            attributes: Vec::new(),
            parameters: Vec::new(),
            priority: 0,
            conditions: Vec::new(),
            invoker: noop_invoker(),
            is_default: false,
            sequence: 0,
        })
        .expect("test command is well-formed")
    }
}
