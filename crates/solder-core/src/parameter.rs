//! Parameter declarations and their frozen form.
//!
//! Commands declare parameters through the [`Param`] builder; freezing a
//! command resolves every declaration against the parser registry into a
//! [`Parameter`], which carries the resolved parser handle so the execution
//! path never consults the registry.
//!
//! A parameter is either a *leaf* (one raw value, one parser) or
//! *constructed* (an aggregate whose children are parsed in place from the
//! same argument source and assembled by an activator callback).

use std::sync::Arc;

use crate::error::BuildError;
use crate::invoke::ParsedArguments;
use crate::parser::{ParserRegistry, TypeParser, TypeSpec};
use crate::value::ParsedValue;

/// Constructed parameters may nest, but only this deep.
const MAX_CONSTRUCTED_DEPTH: usize = 4;

/// Assembles a constructed parameter's value from its parsed children.
pub type Activator = Arc<dyn Fn(&ParsedArguments) -> Result<ParsedValue, String> + Send + Sync>;

// ============================================================================
// Frozen parameters
// ============================================================================

/// A frozen command parameter.
pub enum Parameter {
    /// A single value bound through one parser.
    Leaf(LeafParameter),
    /// An aggregate built by parsing child parameters in place.
    Constructed(ConstructedParameter),
}

/// A frozen leaf parameter.
pub struct LeafParameter {
    pub(crate) name: String,
    pub(crate) type_name: &'static str,
    pub(crate) optional: bool,
    pub(crate) nullable: bool,
    pub(crate) default: Option<ParsedValue>,
    pub(crate) collection: bool,
    pub(crate) remainder: bool,
    pub(crate) parser: Arc<dyn TypeParser>,
}

/// A frozen constructed parameter.
pub struct ConstructedParameter {
    pub(crate) name: String,
    pub(crate) optional: bool,
    pub(crate) children: Vec<Parameter>,
    pub(crate) activator: Activator,
}

impl LeafParameter {
    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the parameter may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the exposed type admits null.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The default substituted when an optional parameter is absent.
    pub fn default(&self) -> Option<&ParsedValue> {
        self.default.as_ref()
    }

    /// Whether the parameter parses a raw sequence.
    pub fn is_collection(&self) -> bool {
        self.collection
    }

    /// Whether this is the trailing remainder.
    pub fn is_remainder(&self) -> bool {
        self.remainder
    }

    /// The resolved parser.
    pub fn parser(&self) -> &Arc<dyn TypeParser> {
        &self.parser
    }
}

impl ConstructedParameter {
    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the aggregate may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Child parameters, parsed in place from the same source.
    pub fn children(&self) -> &[Parameter] {
        &self.children
    }

    /// The callback assembling the aggregate from parsed children.
    pub fn activator(&self) -> &Activator {
        &self.activator
    }
}

impl Parameter {
    /// The declared parameter name.
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(leaf) => &leaf.name,
            Self::Constructed(ctor) => &ctor.name,
        }
    }

    /// The name of the exposed type, for diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Leaf(leaf) => leaf.type_name,
            Self::Constructed(ctor) => &ctor.name,
        }
    }

    /// Whether the parameter may be absent.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.optional,
            Self::Constructed(ctor) => ctor.optional,
        }
    }

    /// Whether this is the trailing remainder parameter.
    pub fn is_remainder(&self) -> bool {
        matches!(self, Self::Leaf(leaf) if leaf.remainder)
    }

    /// Structural specificity contribution: +1.0 per parameter, −0.5 if
    /// optional, −0.25 if nullable, children summed recursively.
    pub fn score(&self) -> f64 {
        match self {
            Self::Leaf(leaf) => {
                let mut score = 1.0;
                if leaf.optional {
                    score -= 0.5;
                }
                if leaf.nullable {
                    score -= 0.25;
                }
                score
            }
            Self::Constructed(ctor) => {
                let mut score = 1.0;
                if ctor.optional {
                    score -= 0.5;
                }
                score + ctor.children.iter().map(Parameter::score).sum::<f64>()
            }
        }
    }

    /// Minimum number of argument slots this parameter consumes.
    pub fn min_slots(&self) -> usize {
        match self {
            Self::Leaf(leaf) => {
                if leaf.optional || leaf.remainder {
                    0
                } else {
                    1
                }
            }
            Self::Constructed(ctor) => {
                if ctor.optional {
                    0
                } else {
                    ctor.children.iter().map(Parameter::min_slots).sum()
                }
            }
        }
    }

    /// Maximum number of argument slots, or `None` for a remainder.
    pub fn max_slots(&self) -> Option<usize> {
        match self {
            Self::Leaf(leaf) => {
                if leaf.remainder {
                    None
                } else {
                    Some(1)
                }
            }
            Self::Constructed(ctor) => ctor
                .children
                .iter()
                .map(Parameter::max_slots)
                .try_fold(0usize, |total, max| Some(total + max?)),
        }
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf(leaf) => f
                .debug_struct("Leaf")
                .field("name", &leaf.name)
                .field("type", &leaf.type_name)
                .field("optional", &leaf.optional)
                .field("remainder", &leaf.remainder)
                .finish(),
            Self::Constructed(ctor) => f
                .debug_struct("Constructed")
                .field("name", &ctor.name)
                .field("children", &ctor.children.len())
                .finish(),
        }
    }
}

// ============================================================================
// Parameter declarations
// ============================================================================

enum ParamKind {
    Leaf {
        spec: TypeSpec,
        collection: bool,
        remainder: bool,
    },
    Constructed {
        children: Vec<Param>,
        activator: Activator,
    },
}

/// A parameter declaration, frozen into a [`Parameter`] when its command is
/// built.
///
/// ```rust,ignore
/// CommandBuilder::new("sum")
///     .param(Param::required::<f64>("a"))
///     .param(Param::with_default::<i32>("b", 0))
/// ```
pub struct Param {
    name: String,
    kind: ParamKind,
    optional: bool,
    nullable: bool,
    default: Option<ParsedValue>,
}

impl Param {
    fn leaf(name: impl Into<String>, spec: TypeSpec, collection: bool, remainder: bool) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Leaf {
                spec,
                collection,
                remainder,
            },
            optional: false,
            nullable: false,
            default: None,
        }
    }

    /// A required parameter of type `T`.
    pub fn required<T: Send + Sync + 'static>(name: impl Into<String>) -> Self {
        Self::leaf(name, TypeSpec::value::<T>(), false, false)
    }

    /// An optional parameter of type `T` with no default; absent values
    /// surface as `None` through [`ParsedArguments::opt`].
    pub fn optional_value<T: Send + Sync + 'static>(name: impl Into<String>) -> Self {
        let mut param = Self::leaf(name, TypeSpec::value::<T>(), false, false);
        param.optional = true;
        param
    }

    /// An optional parameter of type `T`, substituting `default` when absent.
    pub fn with_default<T: Send + Sync + 'static>(name: impl Into<String>, default: T) -> Self {
        let mut param = Self::leaf(name, TypeSpec::value::<T>(), false, false);
        param.optional = true;
        param.default = Some(Arc::new(default));
        param
    }

    /// A required parameter whose exposed type admits null; ranks slightly
    /// below a plain required parameter when overloads are ordered.
    pub fn nullable<T: Send + Sync + 'static>(name: impl Into<String>) -> Self {
        let mut param = Self::leaf(name, TypeSpec::value::<T>(), false, false);
        param.nullable = true;
        param
    }

    /// A `Vec<T>` parameter parsed from a raw sequence.
    pub fn list<T: Clone + Send + Sync + 'static>(name: impl Into<String>) -> Self {
        Self::leaf(name, TypeSpec::list::<T>(), true, false)
    }

    /// A `HashSet<T>` parameter parsed from a raw sequence.
    pub fn set<T: Clone + Eq + std::hash::Hash + Send + Sync + 'static>(
        name: impl Into<String>,
    ) -> Self {
        Self::leaf(name, TypeSpec::set::<T>(), true, false)
    }

    /// A trailing remainder joined into a single `String`.
    pub fn remainder(name: impl Into<String>) -> Self {
        Self::leaf(name, TypeSpec::value::<String>(), false, true)
    }

    /// A trailing remainder parsed element-wise into `Vec<T>`.
    pub fn remainder_list<T: Clone + Send + Sync + 'static>(name: impl Into<String>) -> Self {
        Self::leaf(name, TypeSpec::list::<T>(), true, true)
    }

    /// A constructed parameter: `children` are parsed in place and `build`
    /// assembles the aggregate.
    pub fn constructed<T, F>(name: impl Into<String>, children: Vec<Param>, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ParsedArguments) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: ParamKind::Constructed {
                children,
                activator: Arc::new(move |args| {
                    build(args).map(|value| Arc::new(value) as ParsedValue)
                }),
            },
            optional: false,
            nullable: false,
            default: None,
        }
    }

    /// Marks this parameter optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_remainder_decl(&self) -> bool {
        matches!(self.kind, ParamKind::Leaf { remainder: true, .. })
    }

    /// Resolves this declaration into a frozen [`Parameter`].
    pub fn freeze(self, registry: &mut ParserRegistry) -> Result<Parameter, BuildError> {
        self.freeze_at(registry, 0)
    }

    fn freeze_at(
        self,
        registry: &mut ParserRegistry,
        depth: usize,
    ) -> Result<Parameter, BuildError> {
        match self.kind {
            ParamKind::Leaf {
                spec,
                collection,
                remainder,
            } => {
                let parser = registry.resolve(&spec)?;
                Ok(Parameter::Leaf(LeafParameter {
                    name: self.name,
                    type_name: spec.type_name(),
                    optional: self.optional,
                    nullable: self.nullable,
                    default: self.default,
                    collection,
                    remainder,
                    parser,
                }))
            }
            ParamKind::Constructed {
                children,
                activator,
            } => {
                if children.is_empty() {
                    return Err(BuildError::InvalidShape {
                        name: self.name,
                        reason: "constructed parameter has no children".to_string(),
                    });
                }
                if depth >= MAX_CONSTRUCTED_DEPTH {
                    return Err(BuildError::InvalidShape {
                        name: self.name,
                        reason: format!(
                            "constructed parameters nest deeper than {MAX_CONSTRUCTED_DEPTH}"
                        ),
                    });
                }
                let mut frozen = Vec::with_capacity(children.len());
                for child in children {
                    if child.is_remainder_decl() {
                        return Err(BuildError::InvalidShape {
                            name: self.name,
                            reason: format!(
                                "child '{}' is a remainder, which must be a top-level trailing parameter",
                                child.name
                            ),
                        });
                    }
                    frozen.push(child.freeze_at(registry, depth + 1)?);
                }
                Ok(Parameter::Constructed(ConstructedParameter {
                    name: self.name,
                    optional: self.optional,
                    children: frozen,
                    activator,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_contributions() {
        let mut registry = ParserRegistry::with_defaults();

        let required = Param::required::<i32>("a").freeze(&mut registry).unwrap();
        assert_eq!(required.score(), 1.0);

        let optional = Param::with_default::<i32>("b", 0)
            .freeze(&mut registry)
            .unwrap();
        assert_eq!(optional.score(), 0.5);

        let nullable = Param::nullable::<i32>("c").freeze(&mut registry).unwrap();
        assert_eq!(nullable.score(), 0.75);
    }

    #[test]
    fn test_constructed_score_is_recursive() {
        let mut registry = ParserRegistry::with_defaults();
        let param = Param::constructed::<(i32, i32), _>(
            "point",
            vec![Param::required::<i32>("x"), Param::required::<i32>("y")],
            |args| Ok((*args.get::<i32>(0)?, *args.get::<i32>(1)?)),
        )
        .freeze(&mut registry)
        .unwrap();

        assert_eq!(param.score(), 3.0);
        assert_eq!(param.min_slots(), 2);
        assert_eq!(param.max_slots(), Some(2));
    }

    #[test]
    fn test_remainder_slots_are_unbounded() {
        let mut registry = ParserRegistry::with_defaults();
        let param = Param::remainder("text").freeze(&mut registry).unwrap();
        assert_eq!(param.min_slots(), 0);
        assert_eq!(param.max_slots(), None);
        assert!(param.is_remainder());
    }

    #[test]
    fn test_constructed_rejects_empty_children() {
        let mut registry = ParserRegistry::with_defaults();
        let param = Param::constructed::<i32, _>("empty", Vec::new(), |_| Ok(0));
        assert!(matches!(
            param.freeze(&mut registry),
            Err(BuildError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_constructed_rejects_remainder_child() {
        let mut registry = ParserRegistry::with_defaults();
        let param = Param::constructed::<String, _>(
            "agg",
            vec![Param::remainder("rest")],
            |args| Ok(args.get::<String>(0)?.clone()),
        );
        assert!(matches!(
            param.freeze(&mut registry),
            Err(BuildError::InvalidShape { .. })
        ));
    }
}
