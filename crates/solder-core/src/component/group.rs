//! Named groups of components.

use std::sync::Arc;

use crate::component::{Attribute, Command, Component};

/// A named group holding child groups and commands.
///
/// A group may carry one *default command* — a child command with no aliases
/// that runs when the input's name path ends at the group itself.
pub struct CommandGroup {
    aliases: Vec<String>,
    attributes: Vec<Attribute>,
    children: Vec<Component>,
    default: Option<Arc<Command>>,
    score: f64,
}

impl CommandGroup {
    /// Assembles a group from its frozen children.
    pub fn new(aliases: Vec<String>, attributes: Vec<Attribute>, children: Vec<Component>) -> Self {
        let default = children.iter().find_map(|child| match child {
            Component::Command(command) if command.is_default() => Some(Arc::clone(command)),
            _ => None,
        });
        let score = children
            .iter()
            .map(Component::score)
            .fold(0.0f64, f64::max);
        Self {
            aliases,
            attributes,
            children,
            default,
            score,
        }
    }

    /// The group's lookup names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The primary alias, for diagnostics.
    pub fn name(&self) -> &str {
        self.aliases.first().map_or("<group>", String::as_str)
    }

    /// Metadata tags.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Child components in registration order.
    pub fn children(&self) -> &[Component] {
        &self.children
    }

    /// The default command, when one is registered.
    pub fn default_command(&self) -> Option<&Arc<Command>> {
        self.default.as_ref()
    }

    /// The best child score; groups rank by their most specific member.
    pub fn score(&self) -> f64 {
        self.score
    }
}

impl std::fmt::Debug for CommandGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGroup")
            .field("name", &self.name())
            .field("children", &self.children.len())
            .finish()
    }
}
