//! The frozen catalog and its search.
//!
//! Search descends the component tree over the leading positional tokens.
//! At every group level the group's default command is yielded first (the
//! name path may end there), then children matching the current token are
//! followed: groups recurse one token deeper, commands are yielded with the
//! token index *after* their name as the search height.
//!
//! Candidates are ordered by priority (descending), then score (descending),
//! then registration order — a deterministic, stable ranking. Ties never run
//! more than one command; the pipeline stops at the first success.

use std::sync::Arc;

use tracing::trace;

use crate::arguments::ArgumentSource;
use crate::comparer::NameComparer;
use crate::component::{Command, CommandGroup, Component};
use crate::error::BuildError;

/// A search hit: a command plus the number of leading positional tokens its
/// name path consumed.
#[derive(Clone)]
pub struct SearchCandidate {
    /// The matched command.
    pub command: Arc<Command>,
    /// Count of leading tokens consumed as the name path.
    pub height: usize,
}

impl std::fmt::Debug for SearchCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCandidate")
            .field("command", &self.command.full_name())
            .field("height", &self.height)
            .finish()
    }
}

/// The frozen component hierarchy.
///
/// Built once at startup and read-only afterwards; safely shared across
/// concurrent executions without locking.
pub struct ComponentCatalog {
    roots: Vec<Component>,
    comparer: NameComparer,
}

impl ComponentCatalog {
    /// Validates the tree and freezes it.
    ///
    /// Sibling *commands* may share an alias — that is how overloads are
    /// declared, and the (priority, score, registration) ranking arbitrates
    /// between them. A group sharing an alias with any sibling is ambiguous
    /// in a way no ranking resolves, so it is rejected. Also enforced: at
    /// most one default command per group, and no default commands at the
    /// root (nothing would ever route to them).
    pub fn new(roots: Vec<Component>, comparer: NameComparer) -> Result<Self, BuildError> {
        if let Some(Component::Command(command)) = roots
            .iter()
            .find(|child| matches!(child, Component::Command(c) if c.is_default()))
        {
            return Err(BuildError::InvalidShape {
                name: command.full_name().to_string(),
                reason: "default commands require a parent group".to_string(),
            });
        }
        Self::check_siblings(&roots, "<root>", comparer)?;
        Ok(Self { roots, comparer })
    }

    fn check_siblings(
        children: &[Component],
        parent: &str,
        comparer: NameComparer,
    ) -> Result<(), BuildError> {
        let mut group_aliases: Vec<String> = Vec::new();
        let mut command_aliases: Vec<String> = Vec::new();
        let mut defaults = 0usize;
        for child in children {
            match child {
                Component::Command(command) => {
                    if command.is_default() {
                        defaults += 1;
                        if defaults > 1 {
                            return Err(BuildError::InvalidShape {
                                name: parent.to_string(),
                                reason: "a group may carry only one default command".to_string(),
                            });
                        }
                    }
                    for alias in command.aliases() {
                        let folded = comparer.fold(alias);
                        if group_aliases.contains(&folded) {
                            return Err(BuildError::DuplicateAlias {
                                alias: alias.clone(),
                                parent: parent.to_string(),
                            });
                        }
                        command_aliases.push(folded);
                    }
                }
                Component::Group(group) => {
                    for alias in group.aliases() {
                        let folded = comparer.fold(alias);
                        if group_aliases.contains(&folded) || command_aliases.contains(&folded) {
                            return Err(BuildError::DuplicateAlias {
                                alias: alias.clone(),
                                parent: parent.to_string(),
                            });
                        }
                        group_aliases.push(folded);
                    }
                    Self::check_siblings(group.children(), group.name(), comparer)?;
                }
            }
        }
        Ok(())
    }

    /// The configured alias comparer.
    pub fn comparer(&self) -> NameComparer {
        self.comparer
    }

    /// Top-level components, in registration order.
    pub fn roots(&self) -> &[Component] {
        &self.roots
    }

    /// Yields candidate commands for the source's leading tokens, ordered by
    /// priority, score, then registration order.
    pub fn search(&self, args: &ArgumentSource) -> Vec<SearchCandidate> {
        let mut candidates = Vec::new();
        self.descend(None, &self.roots, 0, args, &mut candidates);
        candidates.sort_by(|a, b| {
            b.command
                .priority()
                .cmp(&a.command.priority())
                .then_with(|| {
                    b.command
                        .score()
                        .partial_cmp(&a.command.score())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.command.sequence().cmp(&b.command.sequence()))
        });
        trace!(count = candidates.len(), "search produced candidates");
        candidates
    }

    fn descend(
        &self,
        group: Option<&CommandGroup>,
        children: &[Component],
        index: usize,
        args: &ArgumentSource,
        out: &mut Vec<SearchCandidate>,
    ) {
        if let Some(default) = group.and_then(CommandGroup::default_command) {
            out.push(SearchCandidate {
                command: Arc::clone(default),
                height: index,
            });
        }
        let Some(token) = args.try_peek_positional(index) else {
            return;
        };
        for child in children {
            if !child.matches_alias(token, self.comparer) {
                continue;
            }
            match child {
                Component::Command(command) => out.push(SearchCandidate {
                    command: Arc::clone(command),
                    height: index + 1,
                }),
                Component::Group(inner) => {
                    self.descend(Some(inner.as_ref()), inner.children(), index + 1, args, out);
                }
            }
        }
    }
}

impl std::fmt::Debug for ComponentCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCatalog")
            .field("roots", &self.roots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::test_support::noop_invoker;
    use crate::component::{Command, CommandSpec};

    fn command(aliases: &[&str], priority: i32, sequence: usize) -> Component {
        Component::Command(Arc::new(
            Command::new(CommandSpec {
                aliases: aliases.iter().map(|s| s.to_string()).collect(),
                full_name: aliases.first().unwrap_or(&"<default>").to_string(),
                attributes: Vec::new(),
                parameters: Vec::new(),
                priority,
                conditions: Vec::new(),
                invoker: noop_invoker(),
                is_default: aliases.is_empty(),
                sequence,
            })
            .unwrap(),
        ))
    }

    fn source(tokens: &[&str]) -> ArgumentSource {
        ArgumentSource::from_tokens(
            tokens.iter().map(|s| s.to_string()).collect(),
            NameComparer::OrdinalIgnoreCase,
        )
    }

    #[test]
    fn test_search_walks_groups() {
        let group = Component::Group(Arc::new(CommandGroup::new(
            vec!["math".to_string()],
            Vec::new(),
            vec![command(&["sum"], 0, 1)],
        )));
        let catalog = ComponentCatalog::new(vec![group], NameComparer::OrdinalIgnoreCase).unwrap();

        let hits = catalog.search(&source(&["math", "sum", "1"]));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].command.full_name(), "sum");
        assert_eq!(hits[0].height, 2);
    }

    #[test]
    fn test_group_default_yields_at_group_height() {
        let group = Component::Group(Arc::new(CommandGroup::new(
            vec!["math".to_string()],
            Vec::new(),
            vec![command(&[], 0, 1), command(&["sum"], 0, 2)],
        )));
        let catalog = ComponentCatalog::new(vec![group], NameComparer::OrdinalIgnoreCase).unwrap();

        let hits = catalog.search(&source(&["math"]));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].height, 1);
        assert!(hits[0].command.is_default());
    }

    #[test]
    fn test_overloads_ranked_by_priority_then_sequence() {
        let catalog = ComponentCatalog::new(
            vec![command(&["multi"], 0, 1), command(&["multi"], 5, 2)],
            NameComparer::Ordinal,
        )
        .unwrap();

        let hits = catalog.search(&source(&["multi", "1"]));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].command.priority(), 5);
        assert_eq!(hits[1].command.sequence(), 1);
    }

    #[test]
    fn test_group_alias_collision_is_a_build_error() {
        let group = |name: &str| {
            Component::Group(Arc::new(CommandGroup::new(
                vec![name.to_string()],
                Vec::new(),
                vec![command(&["leaf"], 0, 9)],
            )))
        };
        let result = ComponentCatalog::new(
            vec![group("sum"), group("SUM")],
            NameComparer::OrdinalIgnoreCase,
        );
        assert!(matches!(result, Err(BuildError::DuplicateAlias { .. })));

        let result = ComponentCatalog::new(
            vec![command(&["sum"], 0, 1), group("SUM")],
            NameComparer::OrdinalIgnoreCase,
        );
        assert!(matches!(result, Err(BuildError::DuplicateAlias { .. })));
    }

    #[test]
    fn test_ordinal_comparer_allows_case_variant_groups() {
        let group = |name: &str, seq: usize| {
            Component::Group(Arc::new(CommandGroup::new(
                vec![name.to_string()],
                Vec::new(),
                vec![command(&["leaf"], 0, seq)],
            )))
        };
        let catalog = ComponentCatalog::new(
            vec![group("sum", 1), group("SUM", 2)],
            NameComparer::Ordinal,
        );
        assert!(catalog.is_ok());
    }

    #[test]
    fn test_empty_args_yield_nothing() {
        let catalog =
            ComponentCatalog::new(vec![command(&["x"], 0, 1)], NameComparer::OrdinalIgnoreCase)
                .unwrap();
        assert!(catalog.search(&source(&[])).is_empty());
    }

    #[test]
    fn test_search_is_deterministic() {
        let build = || {
            ComponentCatalog::new(
                vec![
                    command(&["over"], 1, 1),
                    command(&["over2"], 0, 2),
                    Component::Group(Arc::new(CommandGroup::new(
                        vec!["over3".to_string()],
                        Vec::new(),
                        vec![command(&[], 0, 3)],
                    ))),
                ],
                NameComparer::OrdinalIgnoreCase,
            )
            .unwrap()
        };
        let first: Vec<String> = build()
            .search(&source(&["over", "1"]))
            .iter()
            .map(|c| c.command.full_name().to_string())
            .collect();
        let second: Vec<String> = build()
            .search(&source(&["over", "1"]))
            .iter()
            .map(|c| c.command.full_name().to_string())
            .collect();
        assert_eq!(first, second);
    }
}
