//! Synthesized parsers: enums, lists, and sets.
//!
//! These are never registered directly; the registry synthesizes them on
//! demand from a declared enum table or a registered element parser and
//! memoizes the result per element type.

use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use super::{ParseContext, TypeParser};
use crate::value::{ParsedValue, RawValue};

/// The collection shape of a synthesized sequence parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceShape {
    /// `Vec<T>`; order-preserving, duplicates allowed.
    List,
    /// `HashSet<T>`; duplicates rejected.
    Set,
}

// ============================================================================
// Enum parser
// ============================================================================

/// The declared variants of an enum parameter type.
///
/// Rust offers no runtime enum reflection, so variant tables are declared to
/// the registry up front; the registry synthesizes an [`EnumParser`] from the
/// table on first resolution.
pub struct EnumTable {
    type_name: &'static str,
    variants: Vec<(String, ParsedValue)>,
}

impl EnumTable {
    /// Builds a table from `(name, value)` pairs.
    pub fn new<T: Clone + Send + Sync + 'static>(variants: &[(&str, T)]) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            variants: variants
                .iter()
                .map(|(name, value)| {
                    (name.to_string(), Arc::new(value.clone()) as ParsedValue)
                })
                .collect(),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Accepts a case-insensitive variant name or the variant's ordinal as text.
pub(crate) struct EnumParser {
    table: Arc<EnumTable>,
}

impl EnumParser {
    pub(crate) fn new(table: Arc<EnumTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl TypeParser for EnumParser {
    fn type_name(&self) -> &'static str {
        self.table.type_name
    }

    async fn parse(&self, ctx: &ParseContext<'_>) -> Result<ParsedValue, String> {
        let Some(text) = ctx.raw.as_text() else {
            return Err(format!(
                "expected text for '{}', got a non-text value",
                ctx.parameter
            ));
        };
        let text = text.trim();

        for (name, value) in &self.table.variants {
            if name.eq_ignore_ascii_case(text) {
                return Ok(Arc::clone(value));
            }
        }
        if let Ok(ordinal) = text.parse::<usize>() {
            if let Some((_, value)) = self.table.variants.get(ordinal) {
                return Ok(Arc::clone(value));
            }
        }
        Err(format!(
            "'{text}' is not a variant of {}",
            self.table.type_name
        ))
    }
}

// ============================================================================
// Sequence parsers
// ============================================================================

async fn parse_elements<T: Clone + 'static>(
    element: &Arc<dyn TypeParser>,
    ctx: &ParseContext<'_>,
) -> Result<Vec<T>, String> {
    // A lone raw value is treated as a one-element sequence so named
    // collection arguments still bind.
    let lone = [ctx.raw.clone()];
    let items: &[RawValue] = match ctx.raw {
        RawValue::Seq(items) => items.as_slice(),
        _ => &lone,
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let sub = ParseContext {
            caller: ctx.caller,
            parameter: ctx.parameter,
            raw: item,
            services: ctx.services,
            cancel: ctx.cancel,
        };
        let value = element
            .parse(&sub)
            .await
            .map_err(|reason| format!("element {index}: {reason}"))?;
        let Some(value) = value.downcast_ref::<T>() else {
            return Err(format!(
                "element {index}: parser produced an unexpected type"
            ));
        };
        out.push(value.clone());
    }
    Ok(out)
}

/// Parses a raw sequence into `Vec<T>`, element by element.
///
/// The first failing element short-circuits with an index-tagged reason.
pub struct ListParser<T> {
    element: Arc<dyn TypeParser>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ListParser<T> {
    pub(crate) fn new(element: Arc<dyn TypeParser>) -> Self {
        Self {
            element,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> TypeParser for ListParser<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Vec<T>>()
    }

    async fn parse(&self, ctx: &ParseContext<'_>) -> Result<ParsedValue, String> {
        let values = parse_elements::<T>(&self.element, ctx).await?;
        Ok(Arc::new(values) as ParsedValue)
    }
}

/// Parses a raw sequence into `HashSet<T>`; duplicate elements are rejected.
pub struct SetParser<T> {
    element: Arc<dyn TypeParser>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SetParser<T> {
    pub(crate) fn new(element: Arc<dyn TypeParser>) -> Self {
        Self {
            element,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Clone + Eq + Hash + Send + Sync + 'static> TypeParser for SetParser<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<HashSet<T>>()
    }

    async fn parse(&self, ctx: &ParseContext<'_>) -> Result<ParsedValue, String> {
        let values = parse_elements::<T>(&self.element, ctx).await?;
        let mut out = HashSet::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            if !out.insert(value) {
                return Err(format!("element {index}: duplicate value in set"));
            }
        }
        Ok(Arc::new(out) as ParsedValue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::{CallerContext, Response, ServiceScope};
    use crate::parser::primitives::FromStrParser;
    use tokio_util::sync::CancellationToken;

    struct TestCaller;

    #[async_trait]
    impl CallerContext for TestCaller {
        fn identity(&self) -> &str {
            "test"
        }

        async fn respond(&self, _response: Response) -> Result<(), String> {
            Ok(())
        }
    }

    fn ctx<'a>(
        raw: &'a RawValue,
        caller: &'a TestCaller,
        services: &'a ServiceScope,
        cancel: &'a CancellationToken,
    ) -> ParseContext<'a> {
        ParseContext {
            caller,
            parameter: "arg",
            raw,
            services,
            cancel,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Color {
        Red,
        Green,
    }

    #[tokio::test]
    async fn test_enum_accepts_name_and_ordinal() {
        let caller = TestCaller;
        let services = ServiceScope::new();
        let cancel = CancellationToken::new();
        let table = Arc::new(EnumTable::new(&[("red", Color::Red), ("green", Color::Green)]));
        let parser = EnumParser::new(table);

        let raw = RawValue::text("RED");
        let value = parser
            .parse(&ctx(&raw, &caller, &services, &cancel))
            .await
            .unwrap();
        assert_eq!(value.downcast_ref::<Color>(), Some(&Color::Red));

        let raw = RawValue::text("1");
        let value = parser
            .parse(&ctx(&raw, &caller, &services, &cancel))
            .await
            .unwrap();
        assert_eq!(value.downcast_ref::<Color>(), Some(&Color::Green));

        let raw = RawValue::text("blue");
        assert!(
            parser
                .parse(&ctx(&raw, &caller, &services, &cancel))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_list_parses_each_element() {
        let caller = TestCaller;
        let services = ServiceScope::new();
        let cancel = CancellationToken::new();
        let parser = ListParser::<i32>::new(Arc::new(FromStrParser::<i32>::new()));

        let raw = RawValue::Seq(vec![RawValue::text("1"), RawValue::text("2")]);
        let value = parser
            .parse(&ctx(&raw, &caller, &services, &cancel))
            .await
            .unwrap();
        assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2]));
    }

    #[tokio::test]
    async fn test_list_failure_is_index_tagged() {
        let caller = TestCaller;
        let services = ServiceScope::new();
        let cancel = CancellationToken::new();
        let parser = ListParser::<i32>::new(Arc::new(FromStrParser::<i32>::new()));

        let raw = RawValue::Seq(vec![RawValue::text("1"), RawValue::text("x")]);
        let err = parser
            .parse(&ctx(&raw, &caller, &services, &cancel))
            .await
            .unwrap_err();
        assert!(err.starts_with("element 1:"));
    }

    #[tokio::test]
    async fn test_set_rejects_duplicates() {
        let caller = TestCaller;
        let services = ServiceScope::new();
        let cancel = CancellationToken::new();
        let parser = SetParser::<i32>::new(Arc::new(FromStrParser::<i32>::new()));

        let raw = RawValue::Seq(vec![RawValue::text("3"), RawValue::text("3")]);
        let err = parser
            .parse(&ctx(&raw, &caller, &services, &cancel))
            .await
            .unwrap_err();
        assert!(err.contains("duplicate"));
    }
}
