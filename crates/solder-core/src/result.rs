//! The result model carried through the pipeline.
//!
//! Every execution terminates in exactly one [`ExecuteResult`], delivered to
//! the result handler chain. Failures observed while trying one candidate are
//! *local*: the pipeline records them, moves to the next candidate, and only
//! surfaces the most informative local failure once every candidate is
//! exhausted.

use std::fmt;

use thiserror::Error;

use crate::condition::ConditionPhase;
use crate::value::ParsedValue;

/// No command matched the leading tokens.
#[derive(Debug, Clone, Error)]
#[error("no command matched the given input")]
pub struct SearchFailure {
    /// The first positional token, when there was one.
    pub token: Option<String>,
}

/// Which side of the argument count range was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthDirection {
    /// Fewer arguments than the command's minimum.
    TooFew,
    /// More arguments than the command's maximum.
    TooMany,
}

/// The argument count fell outside a candidate's `[min, max]` range.
#[derive(Debug, Clone, Error)]
#[error("'{command}' takes {min}..={} arguments, got {actual}", .max.map_or_else(|| "∞".to_string(), |m| m.to_string()))]
pub struct LengthMismatch {
    /// The candidate's full name.
    pub command: String,
    /// Which bound was violated.
    pub direction: LengthDirection,
    /// The candidate's minimum arity.
    pub min: usize,
    /// The candidate's maximum arity, `None` with a remainder.
    pub max: Option<usize>,
    /// The observed argument count.
    pub actual: usize,
}

/// How a parameter failed to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailureKind {
    /// The parser rejected the raw value.
    Rejected,
    /// A required argument was not provided.
    MissingArgument,
}

/// A parameter could not be bound for a candidate.
#[derive(Debug, Clone, Error)]
#[error("'{command}': parameter '{parameter}': {reason}")]
pub struct ParseFailure {
    /// The candidate's full name.
    pub command: String,
    /// The parameter that failed.
    pub parameter: String,
    /// Rejection or missing argument.
    pub kind: ParseFailureKind,
    /// The parser's reason, or a missing-argument message.
    pub reason: String,
}

/// A pre- or post-condition rejected the execution.
#[derive(Debug, Clone, Error)]
#[error("'{command}': {phase:?}-condition group '{group}' failed: {reason}")]
pub struct ConditionFailure {
    /// The command's full name.
    pub command: String,
    /// Which phase rejected.
    pub phase: ConditionPhase,
    /// The failing condition group key.
    pub group: String,
    /// The evaluator's reason.
    pub reason: String,
}

/// The command body failed or panicked.
#[derive(Debug, Clone, Error)]
#[error("'{command}' failed: {reason}")]
pub struct InvokeFailure {
    /// The command's full name.
    pub command: String,
    /// The body's error, or a panic message.
    pub reason: String,
}

/// What a successful command body produced.
///
/// Carries the type-erased return value plus an optional display rendering
/// for handlers that reply with text.
#[derive(Clone, Default)]
pub struct InvokeOutput {
    value: Option<ParsedValue>,
    display: Option<String>,
}

impl InvokeOutput {
    /// The void result: the body returned nothing.
    pub fn void() -> Self {
        Self::default()
    }

    /// Wraps a return value without a display rendering.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Some(std::sync::Arc::new(value)),
            display: None,
        }
    }

    /// Wraps a return value, rendering it for text replies.
    pub fn with_display<T: fmt::Display + Send + Sync + 'static>(value: T) -> Self {
        let display = value.to_string();
        Self {
            value: Some(std::sync::Arc::new(value)),
            display: Some(display),
        }
    }

    /// Returns `true` for the void result.
    pub fn is_void(&self) -> bool {
        self.value.is_none()
    }

    /// Typed view of the return value.
    pub fn value<T: 'static>(&self) -> Option<&T> {
        self.value.as_ref().and_then(|value| value.downcast_ref())
    }

    /// The display rendering, when one was provided.
    pub fn display_text(&self) -> Option<&str> {
        self.display.as_deref()
    }
}

impl fmt::Debug for InvokeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, &self.display) {
            (None, _) => f.write_str("InvokeOutput::Void"),
            (Some(_), Some(display)) => f.debug_tuple("InvokeOutput").field(display).finish(),
            (Some(_), None) => f.write_str("InvokeOutput(..)"),
        }
    }
}

/// A successful execution: the command that ran and what it returned.
#[derive(Debug, Clone)]
pub struct Success {
    /// The executed command's full name.
    pub command: String,
    /// The body's output.
    pub output: InvokeOutput,
}

/// The terminal result of one execution.
#[derive(Debug, Clone)]
pub enum ExecuteResult {
    /// No candidate matched the name path.
    Search(SearchFailure),
    /// Argument count outside every matching candidate's range.
    Length(LengthMismatch),
    /// A parser rejected input, or a required argument was missing.
    Parse(ParseFailure),
    /// A pre- or post-condition rejected execution.
    Condition(ConditionFailure),
    /// The command body failed.
    Invoke(InvokeFailure),
    /// Cancellation was observed.
    Canceled,
    /// The command ran to completion.
    Success(Success),
}

impl ExecuteResult {
    /// Returns `true` for a successful execution.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The output of a successful execution.
    pub fn success(&self) -> Option<&Success> {
        match self {
            Self::Success(success) => Some(success),
            _ => None,
        }
    }

    /// How informative a recorded local failure is; the pipeline surfaces
    /// the highest-ranked one when all candidates are exhausted.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Search(_) => 0,
            Self::Length(_) => 1,
            Self::Parse(_) => 2,
            Self::Condition(_) => 3,
            Self::Invoke(_) | Self::Canceled | Self::Success(_) => 4,
        }
    }
}

impl fmt::Display for ExecuteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search(err) => err.fmt(f),
            Self::Length(err) => err.fmt(f),
            Self::Parse(err) => err.fmt(f),
            Self::Condition(err) => err.fmt(f),
            Self::Invoke(err) => err.fmt(f),
            Self::Canceled => f.write_str("execution canceled"),
            Self::Success(success) => write!(f, "'{}' succeeded", success.command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_downcast() {
        let output = InvokeOutput::with_display(5.5f64);
        assert_eq!(output.value::<f64>(), Some(&5.5));
        assert_eq!(output.display_text(), Some("5.5"));
        assert!(!output.is_void());
    }

    #[test]
    fn test_void_output() {
        let output = InvokeOutput::void();
        assert!(output.is_void());
        assert!(output.value::<f64>().is_none());
    }

    #[test]
    fn test_failure_ranking() {
        let search = ExecuteResult::Search(SearchFailure { token: None });
        let parse = ExecuteResult::Parse(ParseFailure {
            command: "c".to_string(),
            parameter: "p".to_string(),
            kind: ParseFailureKind::Rejected,
            reason: "r".to_string(),
        });
        assert!(parse.rank() > search.rank());
    }
}
