//! The fluent registration surface.
//!
//! Registration happens once, at startup, through three builders:
//!
//! - [`ManagerBuilder`] – parsers, enum declarations, top-level components,
//!   result handlers, and the alias comparer
//! - [`GroupBuilder`] – a named group: aliases, attributes, conditions its
//!   descendants inherit, and child components
//! - [`CommandBuilder`] – an executable leaf: aliases, priority, parameters,
//!   conditions, and the body
//!
//! `build()` consumes the builder and freezes everything into a
//! [`CommandManager`]: parameter types resolve against the registry, scores
//! and arities derive, group conditions and attributes flatten onto their
//! descendant commands, and the catalog validates alias disjointness.
//! Because the builder is gone afterwards, registration can never overlap
//! execution.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;

use solder_core::{
    Attribute, BuildError, Command, CommandGroup, CommandSpec, Component, ComponentCatalog,
    ConditionEntry, ConditionPhase, ExecuteCondition, Invocation, InvokeOutput, NameComparer,
    Param, ParserRegistry, ServiceScope, TypeParser,
};

use crate::handler::{ReplyResultHandler, ResultHandler};
use crate::manager::CommandManager;

enum ComponentDraft {
    Group(GroupBuilder),
    Command(CommandBuilder),
}

/// Builds a [`CommandManager`].
///
/// ```rust,ignore
/// let manager = CommandManager::builder()
///     .group(
///         GroupBuilder::new("math")
///             .command(CommandBuilder::new("sum").param(..).invoke(..)),
///     )
///     .build()?;
/// ```
pub struct ManagerBuilder {
    registry: ParserRegistry,
    children: Vec<ComponentDraft>,
    handlers: Vec<Arc<dyn ResultHandler>>,
    comparer: NameComparer,
}

impl Default for ManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagerBuilder {
    /// Creates a builder with the primitive parsers pre-registered.
    pub fn new() -> Self {
        Self {
            registry: ParserRegistry::with_defaults(),
            children: Vec::new(),
            handlers: Vec::new(),
            comparer: NameComparer::default(),
        }
    }

    /// Registers (or replaces) the parser for type `T`.
    pub fn parser<T: Send + Sync + 'static>(mut self, parser: impl TypeParser + 'static) -> Self {
        self.registry.register::<T>(Arc::new(parser));
        self
    }

    /// Declares an enum parameter type by its variant table.
    ///
    /// ```rust,ignore
    /// builder.enum_type::<Color>(&[("red", Color::Red), ("green", Color::Green)])
    /// ```
    pub fn enum_type<T: Clone + Send + Sync + 'static>(mut self, variants: &[(&str, T)]) -> Self {
        self.registry.declare_enum::<T>(variants);
        self
    }

    /// Adds a top-level group.
    pub fn group(mut self, group: GroupBuilder) -> Self {
        self.children.push(ComponentDraft::Group(group));
        self
    }

    /// Adds a top-level command.
    pub fn command(mut self, command: CommandBuilder) -> Self {
        self.children.push(ComponentDraft::Command(command));
        self
    }

    /// Appends a result handler; handlers run in registration order until
    /// one accepts the result.
    pub fn result_handler(mut self, handler: impl ResultHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Sets the comparer for aliases and named argument keys.
    pub fn name_comparer(mut self, comparer: NameComparer) -> Self {
        self.comparer = comparer;
        self
    }

    /// Freezes the registration into a [`CommandManager`].
    pub fn build(mut self) -> Result<CommandManager, BuildError> {
        let mut sequence = 0usize;
        let mut roots = Vec::with_capacity(self.children.len());
        let inherited = Inherited {
            path: String::new(),
            conditions: Vec::new(),
            attributes: Vec::new(),
        };
        for draft in self.children {
            roots.push(freeze_draft(
                draft,
                &inherited,
                &mut self.registry,
                &mut sequence,
            )?);
        }
        let catalog = ComponentCatalog::new(roots, self.comparer)?;

        let mut handlers = self.handlers;
        if handlers.is_empty() {
            handlers.push(Arc::new(ReplyResultHandler));
        }

        debug!(commands = sequence, "catalog frozen");
        Ok(CommandManager::new(
            Arc::new(catalog),
            handlers.into(),
            self.comparer,
        ))
    }
}

/// What a component inherits from its ancestors while freezing.
struct Inherited {
    path: String,
    conditions: Vec<ConditionEntry>,
    attributes: Vec<Attribute>,
}

impl Inherited {
    fn join(&self, alias: &str) -> String {
        if self.path.is_empty() {
            alias.to_string()
        } else {
            format!("{} {alias}", self.path)
        }
    }
}

fn freeze_draft(
    draft: ComponentDraft,
    inherited: &Inherited,
    registry: &mut ParserRegistry,
    sequence: &mut usize,
) -> Result<Component, BuildError> {
    match draft {
        ComponentDraft::Command(command) => {
            command.freeze(inherited, registry, sequence).map(Component::Command)
        }
        ComponentDraft::Group(group) => group.freeze(inherited, registry, sequence),
    }
}

// ============================================================================
// GroupBuilder
// ============================================================================

/// Builds a command group.
pub struct GroupBuilder {
    aliases: Vec<String>,
    attributes: Vec<Attribute>,
    conditions: Vec<ConditionEntry>,
    children: Vec<ComponentDraft>,
}

impl GroupBuilder {
    /// Creates a group with one alias.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            aliases: vec![name.into()],
            attributes: Vec::new(),
            conditions: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds another alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Attaches a metadata tag.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }

    /// Attaches a pre-condition inherited by every descendant command.
    pub fn precondition(mut self, condition: impl ExecuteCondition + 'static) -> Self {
        self.conditions.push(ConditionEntry {
            phase: ConditionPhase::Pre,
            condition: Arc::new(condition),
        });
        self
    }

    /// Attaches a post-condition inherited by every descendant command.
    pub fn postcondition(mut self, condition: impl ExecuteCondition + 'static) -> Self {
        self.conditions.push(ConditionEntry {
            phase: ConditionPhase::Post,
            condition: Arc::new(condition),
        });
        self
    }

    /// Adds a child group.
    pub fn group(mut self, group: GroupBuilder) -> Self {
        self.children.push(ComponentDraft::Group(group));
        self
    }

    /// Adds a child command.
    pub fn command(mut self, command: CommandBuilder) -> Self {
        self.children.push(ComponentDraft::Command(command));
        self
    }

    fn freeze(
        self,
        inherited: &Inherited,
        registry: &mut ParserRegistry,
        sequence: &mut usize,
    ) -> Result<Component, BuildError> {
        let name = self
            .aliases
            .first()
            .cloned()
            .ok_or_else(|| BuildError::InvalidShape {
                name: inherited.path.clone(),
                reason: "a group needs at least one alias".to_string(),
            })?;

        let mut conditions = inherited.conditions.clone();
        conditions.extend(self.conditions);
        let mut attributes = inherited.attributes.clone();
        attributes.extend(self.attributes.iter().cloned());

        let next = Inherited {
            path: inherited.join(&name),
            conditions,
            attributes,
        };

        let mut children = Vec::with_capacity(self.children.len());
        for child in self.children {
            children.push(freeze_draft(child, &next, registry, sequence)?);
        }

        Ok(Component::Group(Arc::new(CommandGroup::new(
            self.aliases,
            self.attributes,
            children,
        ))))
    }
}

// ============================================================================
// CommandBuilder
// ============================================================================

/// Builds an executable command.
pub struct CommandBuilder {
    aliases: Vec<String>,
    is_default: bool,
    attributes: Vec<Attribute>,
    priority: i32,
    params: Vec<Param>,
    conditions: Vec<ConditionEntry>,
    invoker: Option<solder_core::BoxedInvoker>,
}

impl CommandBuilder {
    /// Creates a command with one alias.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            aliases: vec![name.into()],
            is_default: false,
            attributes: Vec::new(),
            priority: 0,
            params: Vec::new(),
            conditions: Vec::new(),
            invoker: None,
        }
    }

    /// Creates a group's default command: no aliases, invoked when the name
    /// path ends at the parent group.
    pub fn default_command() -> Self {
        Self {
            aliases: Vec::new(),
            is_default: true,
            attributes: Vec::new(),
            priority: 0,
            params: Vec::new(),
            conditions: Vec::new(),
            invoker: None,
        }
    }

    /// Adds another alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Attaches a metadata tag.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }

    /// Sets the overload priority; higher-priority overloads are tried
    /// first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Appends a parameter declaration.
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Attaches a pre-condition.
    pub fn precondition(mut self, condition: impl ExecuteCondition + 'static) -> Self {
        self.conditions.push(ConditionEntry {
            phase: ConditionPhase::Pre,
            condition: Arc::new(condition),
        });
        self
    }

    /// Attaches a post-condition.
    pub fn postcondition(mut self, condition: impl ExecuteCondition + 'static) -> Self {
        self.conditions.push(ConditionEntry {
            phase: ConditionPhase::Post,
            condition: Arc::new(condition),
        });
        self
    }

    /// Sets the command body.
    ///
    /// The body receives the [`Invocation`] and reports failure as
    /// `Err(reason)`:
    ///
    /// ```rust,ignore
    /// .invoke(|inv| async move {
    ///     let a = *inv.arguments.get::<f64>(0)?;
    ///     Ok(InvokeOutput::with_display(a * 2.0))
    /// })
    /// ```
    pub fn invoke<F, Fut>(mut self, body: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<InvokeOutput, String>> + Send + 'static,
    {
        self.invoker = Some(Arc::new(move |invocation| body(invocation).boxed()));
        self
    }

    /// Sets an instance-shaped body: `factory` produces a module value from
    /// the service scope for every invocation, and `body` runs on it.
    pub fn invoke_instance<M, F, B, Fut>(self, factory: F, body: B) -> Self
    where
        M: Send + 'static,
        F: Fn(&ServiceScope) -> Result<M, String> + Send + Sync + 'static,
        B: Fn(M, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<InvokeOutput, String>> + Send + 'static,
    {
        let body = Arc::new(body);
        self.invoke(move |invocation| {
            let module = factory(&invocation.services);
            let body = Arc::clone(&body);
            async move { body(module?, invocation).await }
        })
    }

    fn freeze(
        self,
        inherited: &Inherited,
        registry: &mut ParserRegistry,
        sequence: &mut usize,
    ) -> Result<Arc<Command>, BuildError> {
        let full_name = match self.aliases.first() {
            Some(alias) => inherited.join(alias),
            None if inherited.path.is_empty() => "<default>".to_string(),
            None => inherited.path.clone(),
        };

        let invoker = self.invoker.ok_or_else(|| BuildError::InvalidShape {
            name: full_name.clone(),
            reason: "command has no body".to_string(),
        })?;

        let mut parameters = Vec::with_capacity(self.params.len());
        for param in self.params {
            parameters.push(param.freeze(registry)?);
        }

        let mut conditions = inherited.conditions.clone();
        conditions.extend(self.conditions);
        let mut attributes = inherited.attributes.clone();
        attributes.extend(self.attributes);

        let command = Command::new(CommandSpec {
            aliases: self.aliases,
            full_name,
            attributes,
            parameters,
            priority: self.priority,
            conditions,
            invoker,
            is_default: self.is_default,
            sequence: *sequence,
        })?;
        *sequence += 1;
        Ok(Arc::new(command))
    }
}
