//! Pre- and post-conditions with OR/AND grouping.
//!
//! Conditions attached to a command are the union of its own and every
//! ancestor group's, evaluated in registration order (ancestors first).
//! Conditions sharing a *group key* are OR-combined — any success satisfies
//! the group; distinct keys are AND-combined. Evaluation short-circuits on
//! the first group that exhausts its members without a success.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::caller::{CallerContext, ServiceScope};
use crate::component::Command;
use crate::result::InvokeOutput;

/// When a condition runs relative to the command body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionPhase {
    /// After successful parsing, before invocation.
    Pre,
    /// After a successful invocation, against its result.
    Post,
}

/// Everything a condition may consult.
pub struct ConditionContext<'a> {
    /// The caller the command would run (or ran) for.
    pub caller: &'a dyn CallerContext,
    /// The resolved command.
    pub command: &'a Command,
    /// The invocation output; present only in the post phase.
    pub value: Option<&'a InvokeOutput>,
    /// Services scoped to this execution.
    pub services: &'a ServiceScope,
    /// Cancellation token for this execution.
    pub cancel: &'a CancellationToken,
}

/// An authorization or validation rule evaluated around invocation.
#[async_trait]
pub trait ExecuteCondition: Send + Sync {
    /// Conditions sharing a key are OR-combined; distinct keys AND-combine.
    fn group_key(&self) -> &str;

    /// Evaluates the condition, returning a rejection reason on failure.
    async fn evaluate(&self, ctx: &ConditionContext<'_>) -> Result<(), String>;
}

/// A condition bound to its phase, as stored on a frozen command.
#[derive(Clone)]
pub struct ConditionEntry {
    /// When the condition runs.
    pub phase: ConditionPhase,
    /// The evaluator.
    pub condition: Arc<dyn ExecuteCondition>,
}

/// Wraps a plain closure into an [`ExecuteCondition`].
///
/// ```rust,ignore
/// ConditionFn::new("role", |ctx| {
///     if ctx.caller.identity() == "admin" {
///         Ok(())
///     } else {
///         Err("admin role required".to_string())
///     }
/// })
/// ```
pub struct ConditionFn<F> {
    group: String,
    eval: F,
}

impl<F> ConditionFn<F>
where
    F: Fn(&ConditionContext<'_>) -> Result<(), String> + Send + Sync,
{
    /// Creates a condition from a group key and a check closure.
    pub fn new(group: impl Into<String>, eval: F) -> Self {
        Self {
            group: group.into(),
            eval,
        }
    }
}

#[async_trait]
impl<F> ExecuteCondition for ConditionFn<F>
where
    F: Fn(&ConditionContext<'_>) -> Result<(), String> + Send + Sync,
{
    fn group_key(&self) -> &str {
        &self.group
    }

    async fn evaluate(&self, ctx: &ConditionContext<'_>) -> Result<(), String> {
        (self.eval)(ctx)
    }
}

/// The outcome of evaluating one phase's conditions.
#[derive(Debug, Clone)]
pub enum ConditionVerdict {
    /// Every group was satisfied.
    Passed,
    /// A group exhausted its members without a success.
    Failed {
        /// The failing group key.
        group: String,
        /// The last member's rejection reason.
        reason: String,
    },
    /// Cancellation was observed before an evaluator ran.
    Canceled,
}

/// Evaluates all conditions of `phase` over the entries, in order.
///
/// Entries are walked in registration order and partitioned into groups by
/// first occurrence of their key. Within a group the first success settles
/// the group; a group with no success fails the whole set immediately.
pub async fn evaluate_conditions(
    entries: &[ConditionEntry],
    phase: ConditionPhase,
    ctx: &ConditionContext<'_>,
) -> ConditionVerdict {
    let mut groups: Vec<(&str, Vec<&ConditionEntry>)> = Vec::new();
    for entry in entries.iter().filter(|entry| entry.phase == phase) {
        let key = entry.condition.group_key();
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(entry),
            None => groups.push((key, vec![entry])),
        }
    }

    for (key, members) in groups {
        let mut last_reason = String::new();
        let mut satisfied = false;
        for entry in members {
            if ctx.cancel.is_cancelled() {
                return ConditionVerdict::Canceled;
            }
            match entry.condition.evaluate(ctx).await {
                Ok(()) => {
                    satisfied = true;
                    break;
                }
                Err(reason) => {
                    trace!(group = key, %reason, "condition member rejected");
                    last_reason = reason;
                }
            }
        }
        if !satisfied {
            return ConditionVerdict::Failed {
                group: key.to_string(),
                reason: last_reason,
            };
        }
    }
    ConditionVerdict::Passed
}
