//! The executable command leaf.

use crate::component::Attribute;
use crate::condition::ConditionEntry;
use crate::error::BuildError;
use crate::invoke::BoxedInvoker;
use crate::parameter::Parameter;

/// The pieces a frozen [`Command`] is assembled from.
///
/// Produced by the registration builder; [`Command::new`] validates the
/// shape and derives arity, score, and remainder bookkeeping.
pub struct CommandSpec {
    /// Lookup names; empty only for a group's default command.
    pub aliases: Vec<String>,
    /// The path-joined display name.
    pub full_name: String,
    /// Metadata tags, ancestors' first.
    pub attributes: Vec<Attribute>,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Overload priority; higher runs first.
    pub priority: i32,
    /// Pre- and post-conditions, ancestors' first.
    pub conditions: Vec<ConditionEntry>,
    /// The command body.
    pub invoker: BoxedInvoker,
    /// Whether this is a group's default command.
    pub is_default: bool,
    /// Registration order, the final search tiebreak.
    pub sequence: usize,
}

/// A frozen, executable command.
pub struct Command {
    aliases: Vec<String>,
    full_name: String,
    attributes: Vec<Attribute>,
    parameters: Vec<Parameter>,
    min_length: usize,
    max_length: Option<usize>,
    has_remainder: bool,
    priority: i32,
    score: f64,
    conditions: Vec<ConditionEntry>,
    invoker: BoxedInvoker,
    is_default: bool,
    sequence: usize,
}

impl Command {
    /// Validates a spec and freezes it.
    ///
    /// Shape rules: at most one remainder parameter and it must be last;
    /// non-default commands need at least one alias; aliases are non-empty.
    pub fn new(spec: CommandSpec) -> Result<Self, BuildError> {
        if !spec.is_default && spec.aliases.is_empty() {
            return Err(BuildError::InvalidShape {
                name: spec.full_name,
                reason: "a non-default command needs at least one alias".to_string(),
            });
        }
        if spec.aliases.iter().any(|alias| alias.is_empty()) {
            return Err(BuildError::InvalidShape {
                name: spec.full_name,
                reason: "aliases must be non-empty".to_string(),
            });
        }
        let remainder_count = spec
            .parameters
            .iter()
            .filter(|param| param.is_remainder())
            .count();
        if remainder_count > 1 {
            return Err(BuildError::InvalidShape {
                name: spec.full_name,
                reason: "at most one remainder parameter is allowed".to_string(),
            });
        }
        if remainder_count == 1 && !spec.parameters.last().is_some_and(Parameter::is_remainder) {
            return Err(BuildError::InvalidShape {
                name: spec.full_name,
                reason: "the remainder parameter must be last".to_string(),
            });
        }

        let has_remainder = remainder_count == 1;
        let min_length = spec.parameters.iter().map(Parameter::min_slots).sum();
        let max_length = spec
            .parameters
            .iter()
            .map(Parameter::max_slots)
            .try_fold(0usize, |total, max| Some(total + max?));
        let score = 1.0 + spec.parameters.iter().map(Parameter::score).sum::<f64>();

        Ok(Self {
            aliases: spec.aliases,
            full_name: spec.full_name,
            attributes: spec.attributes,
            parameters: spec.parameters,
            min_length,
            max_length,
            has_remainder,
            priority: spec.priority,
            score,
            conditions: spec.conditions,
            invoker: spec.invoker,
            is_default: spec.is_default,
            sequence: spec.sequence,
        })
    }

    /// The command's lookup names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The path-joined display name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Metadata tags, ancestors' first.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Finds the first attribute with the given key.
    pub fn find_attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.key == key)
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Minimum accepted argument count.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Maximum accepted argument count; `None` with a remainder.
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Whether the last parameter is a remainder.
    pub fn has_remainder(&self) -> bool {
        self.has_remainder
    }

    /// Overload priority; higher-priority candidates run first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Structural specificity: base 1.0 plus parameter contributions.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Pre- and post-conditions, ancestors' first.
    pub fn conditions(&self) -> &[ConditionEntry] {
        &self.conditions
    }

    /// The command body.
    pub fn invoker(&self) -> &BoxedInvoker {
        &self.invoker
    }

    /// Whether this is a group's default command.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Registration order, the final search tiebreak.
    pub fn sequence(&self) -> usize {
        self.sequence
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("full_name", &self.full_name)
            .field("parameters", &self.parameters.len())
            .field("priority", &self.priority)
            .field("score", &self.score)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::test_support::noop_invoker;
    use crate::parameter::Param;
    use crate::parser::ParserRegistry;

    fn spec(parameters: Vec<Parameter>) -> CommandSpec {
        CommandSpec {
            aliases: vec!["probe".to_string()],
            full_name: "probe".to_string(),
            attributes: Vec::new(),
            parameters,
            priority: 0,
            conditions: Vec::new(),
            invoker: noop_invoker(),
            is_default: false,
            sequence: 0,
        }
    }

    #[test]
    fn test_arity_and_score_derivation() {
        let mut registry = ParserRegistry::with_defaults();
        let parameters = vec![
            Param::required::<f64>("a").freeze(&mut registry).unwrap(),
            Param::with_default::<i32>("b", 0)
                .freeze(&mut registry)
                .unwrap(),
        ];
        let command = Command::new(spec(parameters)).unwrap();
        assert_eq!(command.min_length(), 1);
        assert_eq!(command.max_length(), Some(2));
        assert_eq!(command.score(), 2.5);
        assert!(!command.has_remainder());
    }

    #[test]
    fn test_remainder_unbounds_max() {
        let mut registry = ParserRegistry::with_defaults();
        let parameters = vec![Param::remainder("text").freeze(&mut registry).unwrap()];
        let command = Command::new(spec(parameters)).unwrap();
        assert_eq!(command.max_length(), None);
        assert!(command.has_remainder());
    }

    #[test]
    fn test_remainder_must_be_last() {
        let mut registry = ParserRegistry::with_defaults();
        let parameters = vec![
            Param::remainder("text").freeze(&mut registry).unwrap(),
            Param::required::<i32>("n").freeze(&mut registry).unwrap(),
        ];
        assert!(matches!(
            Command::new(spec(parameters)),
            Err(BuildError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_non_default_requires_alias() {
        let mut bad = spec(Vec::new());
        bad.aliases.clear();
        assert!(matches!(
            Command::new(bad),
            Err(BuildError::InvalidShape { .. })
        ));
    }
}
