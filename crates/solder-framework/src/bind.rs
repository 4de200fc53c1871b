//! Argument binding: raw source → parsed argument vector.
//!
//! Binding runs once per candidate, after the argument source was sized to
//! the candidate's search height. The length gate rejects before any parser
//! runs; after it, parameters bind in declared order:
//!
//! 1. a *remainder* consumes everything left (joined string or raw slice)
//!    and ends the walk;
//! 2. a *constructed* parameter binds its children recursively from the same
//!    source, then runs its activator; an optional constructed whose
//!    children fail binds as absent instead of failing the candidate;
//! 3. a *leaf* takes its value from the source, falling back to its default
//!    (or absent) when optional, and failing the candidate when required.

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use solder_core::{
    ArgumentSource, BoundArgument, CallerContext, Command, LeafParameter, LengthDirection,
    LengthMismatch, ParseContext, ParseFailure, ParseFailureKind, Parameter, ParsedArguments,
    RawValue, ServiceScope,
};

/// How one candidate's binding attempt ended.
pub(crate) enum BindOutcome {
    /// Every parameter bound; the candidate can be invoked.
    Bound(ParsedArguments),
    /// The argument count fell outside the candidate's range.
    Length(LengthMismatch),
    /// A parameter failed to bind.
    Parse(ParseFailure),
    /// Cancellation was observed before a parser ran.
    Canceled,
}

/// Shared context for one candidate's binding attempt.
pub(crate) struct BindSettings<'a> {
    pub caller: &'a dyn CallerContext,
    pub services: &'a ServiceScope,
    pub cancel: &'a CancellationToken,
    pub separator: char,
}

enum BindError {
    Parse {
        parameter: String,
        kind: ParseFailureKind,
        reason: String,
    },
    Canceled,
}

/// Length-gates and binds all parameters of `command` from `source`.
pub(crate) async fn bind_command(
    command: &Command,
    source: &mut ArgumentSource,
    settings: &BindSettings<'_>,
) -> BindOutcome {
    let length = source.len();
    if length < command.min_length() {
        return BindOutcome::Length(LengthMismatch {
            command: command.full_name().to_string(),
            direction: LengthDirection::TooFew,
            min: command.min_length(),
            max: command.max_length(),
            actual: length,
        });
    }
    if command.max_length().is_some_and(|max| length > max) {
        return BindOutcome::Length(LengthMismatch {
            command: command.full_name().to_string(),
            direction: LengthDirection::TooMany,
            min: command.min_length(),
            max: command.max_length(),
            actual: length,
        });
    }

    match bind_parameters(command.parameters(), source, settings).await {
        Ok(values) => {
            trace!(command = command.full_name(), count = values.len(), "arguments bound");
            BindOutcome::Bound(ParsedArguments::new(values))
        }
        Err(BindError::Canceled) => BindOutcome::Canceled,
        Err(BindError::Parse {
            parameter,
            kind,
            reason,
        }) => BindOutcome::Parse(ParseFailure {
            command: command.full_name().to_string(),
            parameter,
            kind,
            reason,
        }),
    }
}

fn bind_parameters<'a>(
    parameters: &'a [Parameter],
    source: &'a mut ArgumentSource,
    settings: &'a BindSettings<'a>,
) -> BoxFuture<'a, Result<Vec<BoundArgument>, BindError>> {
    async move {
        let mut values = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            match parameter {
                Parameter::Leaf(leaf) if leaf.is_remainder() => {
                    let raw = if leaf.is_collection() {
                        RawValue::Seq(source.take_remaining())
                    } else {
                        RawValue::Text(source.join_remaining(settings.separator))
                    };
                    let value = parse_leaf(leaf, &raw, settings).await?;
                    values.push(BoundArgument::present(leaf.name(), value));
                    break;
                }
                Parameter::Leaf(leaf) => match source.try_next(leaf.name()) {
                    Some(raw) => {
                        let value = parse_leaf(leaf, &raw, settings).await?;
                        values.push(BoundArgument::present(leaf.name(), value));
                    }
                    None if leaf.is_optional() => {
                        values.push(BoundArgument::new(leaf.name(), leaf.default().cloned()));
                    }
                    None => {
                        return Err(BindError::Parse {
                            parameter: leaf.name().to_string(),
                            kind: ParseFailureKind::MissingArgument,
                            reason: "required argument was not provided".to_string(),
                        });
                    }
                },
                Parameter::Constructed(ctor) => {
                    match bind_parameters(ctor.children(), source, settings).await {
                        Ok(children) => {
                            let children = ParsedArguments::new(children);
                            match (ctor.activator())(&children) {
                                Ok(value) => values.push(BoundArgument::present(ctor.name(), value)),
                                Err(reason) => {
                                    return Err(BindError::Parse {
                                        parameter: ctor.name().to_string(),
                                        kind: ParseFailureKind::Rejected,
                                        reason,
                                    });
                                }
                            }
                        }
                        Err(BindError::Canceled) => return Err(BindError::Canceled),
                        Err(child_error) => {
                            if ctor.is_optional() {
                                values.push(BoundArgument::new(ctor.name(), None));
                            } else {
                                return Err(child_error);
                            }
                        }
                    }
                }
            }
        }
        Ok(values)
    }
    .boxed()
}

async fn parse_leaf(
    leaf: &LeafParameter,
    raw: &RawValue,
    settings: &BindSettings<'_>,
) -> Result<solder_core::ParsedValue, BindError> {
    if settings.cancel.is_cancelled() {
        return Err(BindError::Canceled);
    }
    let ctx = ParseContext {
        caller: settings.caller,
        parameter: leaf.name(),
        raw,
        services: settings.services,
        cancel: settings.cancel,
    };
    leaf.parser()
        .parse(&ctx)
        .await
        .map_err(|reason| BindError::Parse {
            parameter: leaf.name().to_string(),
            kind: ParseFailureKind::Rejected,
            reason,
        })
}
