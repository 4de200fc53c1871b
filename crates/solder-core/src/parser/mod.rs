//! The parser contract and type descriptors.
//!
//! A [`TypeParser`] converts one [`RawValue`] into a [`ParsedValue`],
//! reporting rejection as a structured reason rather than an error type the
//! pipeline would have to unwind through. Parsers must be pure over their
//! input and context: the same raw value parses to an equal result every
//! time.
//!
//! Because the registry cannot introspect Rust types at runtime, parameter
//! types are described by [`TypeSpec`] descriptors produced by the typed
//! registration API. A descriptor carries the `TypeId` of the exposed type
//! plus enough shape information for the registry to synthesize collection
//! parsers on demand (see [`registry`]).

pub mod composite;
pub mod primitives;
pub mod registry;

use std::any::TypeId;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::caller::{CallerContext, ServiceScope};
use crate::value::{ParsedValue, RawValue};

pub use composite::{EnumTable, ListParser, SequenceShape, SetParser};
pub use primitives::FromStrParser;
pub use registry::ParserRegistry;

/// Everything a parser may consult while converting one raw value.
pub struct ParseContext<'a> {
    /// The caller the command is executing for.
    pub caller: &'a dyn CallerContext,
    /// The name of the parameter being bound.
    pub parameter: &'a str,
    /// The raw value to convert.
    pub raw: &'a RawValue,
    /// Services available to this execution.
    pub services: &'a ServiceScope,
    /// Cancellation token for this execution.
    pub cancel: &'a CancellationToken,
}

/// Converts raw input values into native values.
///
/// Implementations must be side-effect-free: the pipeline may invoke a parser
/// for a candidate command that is later discarded.
#[async_trait]
pub trait TypeParser: Send + Sync {
    /// The name of the produced type, used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Parses one raw value, returning the parsed value or a rejection
    /// reason.
    async fn parse(&self, ctx: &ParseContext<'_>) -> Result<ParsedValue, String>;
}

/// Describes a parameter's exposed type to the registry.
///
/// Produced by the typed constructors; the monomorphized `wrap` hook inside
/// sequence shapes lets the registry assemble `Vec<T>` / `HashSet<T>`
/// parsers without knowing `T`.
#[derive(Clone)]
pub struct TypeSpec {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) kind: TypeKind,
}

#[derive(Clone)]
pub(crate) enum TypeKind {
    /// A scalar value type (or a declared enum).
    Value,
    /// A collection of a scalar element type.
    Sequence {
        shape: SequenceShape,
        element: Box<TypeSpec>,
        wrap: fn(Arc<dyn TypeParser>) -> Arc<dyn TypeParser>,
    },
}

impl TypeSpec {
    /// Describes a scalar type `T`.
    pub fn value<T: Send + Sync + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind: TypeKind::Value,
        }
    }

    /// Describes `Vec<T>`.
    pub fn list<T: Clone + Send + Sync + 'static>() -> Self {
        Self {
            id: TypeId::of::<Vec<T>>(),
            name: std::any::type_name::<Vec<T>>(),
            kind: TypeKind::Sequence {
                shape: SequenceShape::List,
                element: Box::new(Self::value::<T>()),
                wrap: |element| Arc::new(ListParser::<T>::new(element)),
            },
        }
    }

    /// Describes `HashSet<T>`.
    pub fn set<T: Clone + Eq + std::hash::Hash + Send + Sync + 'static>() -> Self {
        Self {
            id: TypeId::of::<std::collections::HashSet<T>>(),
            name: std::any::type_name::<std::collections::HashSet<T>>(),
            kind: TypeKind::Sequence {
                shape: SequenceShape::Set,
                element: Box::new(Self::value::<T>()),
                wrap: |element| Arc::new(SetParser::<T>::new(element)),
            },
        }
    }

    /// The name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn is_sequence(&self) -> bool {
        matches!(self.kind, TypeKind::Sequence { .. })
    }
}

impl std::fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeSpec").field("name", &self.name).finish()
    }
}
