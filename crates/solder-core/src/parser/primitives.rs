//! Built-in parsers for primitive types.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use super::{ParseContext, TypeParser};
use crate::value::ParsedValue;

/// A parser for any `FromStr` type.
///
/// Covers the built-in primitive set (integers, floats, `char`, `bool`,
/// `String`) and is reusable for user types:
///
/// ```rust,ignore
/// registry.register::<Ipv4Addr>(Arc::new(FromStrParser::<Ipv4Addr>::new()));
/// ```
pub struct FromStrParser<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> FromStrParser<T> {
    /// Creates the parser.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for FromStrParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> TypeParser for FromStrParser<T>
where
    T: FromStr + Send + Sync + 'static,
    T::Err: Display,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    async fn parse(&self, ctx: &ParseContext<'_>) -> Result<ParsedValue, String> {
        let Some(text) = ctx.raw.as_text() else {
            return Err(format!(
                "expected text for '{}', got a non-text value",
                ctx.parameter
            ));
        };
        text.trim()
            .parse::<T>()
            .map(|value| Arc::new(value) as ParsedValue)
            .map_err(|err| format!("'{text}' is not a valid {}: {err}", self.type_name()))
    }
}

/// A strict boolean parser accepting only `true` / `false`, case-insensitive.
///
/// Numeric forms are deliberately rejected so that overloads taking integers
/// can win the candidates they should (`"1"` is an `i32`, not a `bool`).
pub struct BoolParser;

#[async_trait]
impl TypeParser for BoolParser {
    fn type_name(&self) -> &'static str {
        "bool"
    }

    async fn parse(&self, ctx: &ParseContext<'_>) -> Result<ParsedValue, String> {
        let Some(text) = ctx.raw.as_text() else {
            return Err(format!(
                "expected text for '{}', got a non-text value",
                ctx.parameter
            ));
        };
        match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(Arc::new(true) as ParsedValue),
            t if t.eq_ignore_ascii_case("false") => Ok(Arc::new(false) as ParsedValue),
            other => Err(format!("'{other}' is not a valid bool")),
        }
    }
}

/// The identity parser for `String` parameters.
///
/// Text passes through unchanged; objects are rejected.
pub struct StringParser;

#[async_trait]
impl TypeParser for StringParser {
    fn type_name(&self) -> &'static str {
        "String"
    }

    async fn parse(&self, ctx: &ParseContext<'_>) -> Result<ParsedValue, String> {
        match ctx.raw.as_text() {
            Some(text) => Ok(Arc::new(text.to_string()) as ParsedValue),
            None => Err(format!(
                "expected text for '{}', got a non-text value",
                ctx.parameter
            )),
        }
    }
}
