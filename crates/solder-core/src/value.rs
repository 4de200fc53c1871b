//! Raw and parsed value representations.
//!
//! Input values arriving from the host are modeled as [`RawValue`], a tagged
//! union over plain text, opaque host objects, and sequences of either.
//! Parsers turn raw values into [`ParsedValue`]s: cheaply clonable,
//! type-erased handles that the invocation layer downcasts back to concrete
//! types.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A parsed, type-erased value produced by a [`TypeParser`](crate::TypeParser).
///
/// Stored behind `Arc` so registration-time defaults can be substituted into
/// invocations without re-parsing.
pub type ParsedValue = Arc<dyn Any + Send + Sync>;

/// Wraps a concrete value into a [`ParsedValue`].
pub fn parsed<T: Send + Sync + 'static>(value: T) -> ParsedValue {
    Arc::new(value)
}

/// A single raw input value.
///
/// Most inputs are [`Text`](RawValue::Text) tokens. Hosts that pass through
/// structured payloads (an image handle, a user reference) use
/// [`Object`](RawValue::Object); typed parsers that understand the payload
/// downcast it, all others reject it. [`Seq`](RawValue::Seq) is the sequence
/// shape consumed by collection parsers and collection remainders.
#[derive(Clone)]
pub enum RawValue {
    /// A textual token.
    Text(String),
    /// An opaque host object, passed through to parsers untouched.
    Object(Arc<dyn Any + Send + Sync>),
    /// A sequence of raw values.
    Seq(Vec<RawValue>),
}

impl RawValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates an opaque object value.
    pub fn object<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Object(Arc::new(value))
    }

    /// Returns the text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to view an object value as a concrete type.
    pub fn downcast_object<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Object(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Renders this value for remainder joining and diagnostics.
    ///
    /// Objects render as a placeholder since their display is host-defined.
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Object(_) => "<object>".to_string(),
            Self::Seq(items) => items
                .iter()
                .map(RawValue::display)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
            Self::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
        }
    }
}
