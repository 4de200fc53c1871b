//! The parser registry: registered parsers plus on-demand synthesis.
//!
//! Resolution order for a [`TypeSpec`]:
//!
//! 1. An exactly registered parser for the type.
//! 2. A declared enum type, for which an enum parser is synthesized.
//! 3. A list or set shape, wrapping the resolved element parser; nested
//!    collections are rejected.
//! 4. Otherwise the type is unsupported.
//!
//! Synthesized parsers are memoized per element type. All resolution happens
//! while the catalog is being built; the frozen commands store the resolved
//! parser handles, so the registry is never consulted on the execution path.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use super::composite::{EnumParser, EnumTable, SequenceShape};
use super::primitives::{BoolParser, FromStrParser, StringParser};
use super::{TypeKind, TypeParser, TypeSpec};
use crate::error::BuildError;

/// Maps target types to parsers and synthesizes composite parsers on demand.
pub struct ParserRegistry {
    parsers: HashMap<TypeId, Arc<dyn TypeParser>>,
    enums: HashMap<TypeId, Arc<EnumTable>>,
    synthesized_enums: HashMap<TypeId, Arc<dyn TypeParser>>,
    synthesized_sequences: HashMap<(SequenceShape, TypeId), Arc<dyn TypeParser>>,
}

impl ParserRegistry {
    /// Creates a registry pre-populated with the primitive parsers.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            parsers: HashMap::new(),
            enums: HashMap::new(),
            synthesized_enums: HashMap::new(),
            synthesized_sequences: HashMap::new(),
        };

        registry.register::<bool>(Arc::new(BoolParser));
        registry.register::<String>(Arc::new(StringParser));
        registry.register::<char>(Arc::new(FromStrParser::<char>::new()));
        registry.register::<i8>(Arc::new(FromStrParser::<i8>::new()));
        registry.register::<i16>(Arc::new(FromStrParser::<i16>::new()));
        registry.register::<i32>(Arc::new(FromStrParser::<i32>::new()));
        registry.register::<i64>(Arc::new(FromStrParser::<i64>::new()));
        registry.register::<isize>(Arc::new(FromStrParser::<isize>::new()));
        registry.register::<u8>(Arc::new(FromStrParser::<u8>::new()));
        registry.register::<u16>(Arc::new(FromStrParser::<u16>::new()));
        registry.register::<u32>(Arc::new(FromStrParser::<u32>::new()));
        registry.register::<u64>(Arc::new(FromStrParser::<u64>::new()));
        registry.register::<usize>(Arc::new(FromStrParser::<usize>::new()));
        registry.register::<f32>(Arc::new(FromStrParser::<f32>::new()));
        registry.register::<f64>(Arc::new(FromStrParser::<f64>::new()));

        registry
    }

    /// Registers (or replaces) the parser for type `T`.
    pub fn register<T: Send + Sync + 'static>(&mut self, parser: Arc<dyn TypeParser>) {
        self.parsers.insert(TypeId::of::<T>(), parser);
    }

    /// Declares an enum type by its variant table.
    pub fn declare_enum<T: Clone + Send + Sync + 'static>(&mut self, variants: &[(&str, T)]) {
        self.enums
            .insert(TypeId::of::<T>(), Arc::new(EnumTable::new(variants)));
    }

    /// Resolves the parser for a described type.
    pub fn resolve(&mut self, spec: &TypeSpec) -> Result<Arc<dyn TypeParser>, BuildError> {
        if let Some(parser) = self.parsers.get(&spec.id) {
            return Ok(Arc::clone(parser));
        }

        if let Some(table) = self.enums.get(&spec.id) {
            let parser = self
                .synthesized_enums
                .entry(spec.id)
                .or_insert_with(|| {
                    trace!(type_name = table.type_name(), "synthesizing enum parser");
                    Arc::new(EnumParser::new(Arc::clone(table)))
                });
            return Ok(Arc::clone(parser));
        }

        if let TypeKind::Sequence {
            shape,
            element,
            wrap,
        } = &spec.kind
        {
            if element.is_sequence() {
                return Err(BuildError::UnsupportedType {
                    type_name: spec.name.to_string(),
                });
            }
            if let Some(parser) = self.synthesized_sequences.get(&(*shape, element.id)) {
                return Ok(Arc::clone(parser));
            }
            let element_parser = self.resolve(element)?;
            trace!(type_name = spec.name, "synthesizing sequence parser");
            let parser = wrap(element_parser);
            self.synthesized_sequences
                .insert((*shape, element.id), Arc::clone(&parser));
            return Ok(parser);
        }

        Err(BuildError::UnsupportedType {
            type_name: spec.name.to_string(),
        })
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parsers", &self.parsers.len())
            .field("enums", &self.enums.len())
            .finish()
    }
}
