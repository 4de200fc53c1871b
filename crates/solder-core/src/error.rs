//! Registration-time error types.
//!
//! Build errors surface to the caller of the builder; execution-time failures
//! are carried inside [`ExecuteResult`](crate::ExecuteResult) instead.

use thiserror::Error;

/// Errors raised while registering components and freezing the catalog.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// Two sibling components share an alias under the configured comparer.
    #[error("duplicate alias '{alias}' among children of '{parent}'")]
    DuplicateAlias {
        /// The colliding alias.
        alias: String,
        /// The parent path, or "<root>" for top-level components.
        parent: String,
    },

    /// No parser is registered or synthesizable for a parameter type.
    #[error("no parser available for type '{type_name}'")]
    UnsupportedType {
        /// Name of the unresolvable type.
        type_name: String,
    },

    /// A command or parameter violates a structural invariant.
    #[error("invalid shape for '{name}': {reason}")]
    InvalidShape {
        /// The offending component or parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}
