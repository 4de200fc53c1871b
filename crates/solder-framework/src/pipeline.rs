//! The execution pipeline.
//!
//! One pipeline run handles one `execute` call: it searches the catalog,
//! walks the ranked candidates through *length gate → bind → pre-conditions
//! → invoke → post-conditions*, and delivers exactly one result to the
//! handler chain.
//!
//! Failures before invocation are local to their candidate — the pipeline
//! records them and moves on. Once every candidate is exhausted, the most
//! informative recorded failure surfaces (condition > parse > length >
//! search; most recent within a class). Post-condition failures are
//! terminal: the command already ran, so no further candidate is tried.
//! Invoke failures are terminal too unless the options opt in to fallback.

use std::sync::Arc;

use futures::FutureExt;
use tracing::{Level, debug, span, trace};

use solder_core::{
    ArgumentSource, CallerContext, ComponentCatalog, ConditionContext, ConditionFailure,
    ConditionPhase, ConditionVerdict, ExecuteResult, Invocation, InvokeFailure, SearchFailure,
    Success, evaluate_conditions,
};

use crate::bind::{BindOutcome, BindSettings, bind_command};
use crate::handler::ResultHandler;
use crate::options::ExecuteOptions;

/// Everything one pipeline run owns.
pub(crate) struct PipelineRun {
    pub catalog: Arc<ComponentCatalog>,
    pub handlers: Arc<[Arc<dyn ResultHandler>]>,
    pub caller: Arc<dyn CallerContext>,
    pub source: ArgumentSource,
    pub options: ExecuteOptions,
}

/// Runs the pipeline to completion and delivers the result.
pub(crate) async fn run(mut run: PipelineRun) {
    let span = span!(Level::DEBUG, "execute", caller = run.caller.identity());
    let _enter = span.enter();

    let result = select_and_invoke(
        &run.catalog,
        &run.caller,
        &mut run.source,
        &run.options,
    )
    .await;

    debug!(%result, "pipeline finished");
    for handler in run.handlers.iter() {
        if handler
            .handle(run.caller.as_ref(), &result, &run.options.services)
            .await
        {
            return;
        }
    }
    trace!("no result handler accepted the result");
}

/// Keeps the more informative of two local failures; ties go to the newer.
fn record(best: &mut Option<ExecuteResult>, failure: ExecuteResult) {
    if best.as_ref().is_none_or(|held| failure.rank() >= held.rank()) {
        *best = Some(failure);
    }
}

async fn select_and_invoke(
    catalog: &ComponentCatalog,
    caller: &Arc<dyn CallerContext>,
    source: &mut ArgumentSource,
    options: &ExecuteOptions,
) -> ExecuteResult {
    if options.cancel.is_cancelled() {
        return ExecuteResult::Canceled;
    }

    let candidates = catalog.search(source);
    let mut recorded: Option<ExecuteResult> = None;

    for candidate in &candidates {
        let command = &candidate.command;
        source.set_size(candidate.height);

        let settings = BindSettings {
            caller: caller.as_ref(),
            services: &options.services,
            cancel: &options.cancel,
            separator: options.remainder_separator,
        };
        let arguments = match bind_command(command, source, &settings).await {
            BindOutcome::Bound(arguments) => arguments,
            BindOutcome::Canceled => return ExecuteResult::Canceled,
            BindOutcome::Length(mismatch) => {
                trace!(command = command.full_name(), %mismatch, "candidate rejected");
                record(&mut recorded, ExecuteResult::Length(mismatch));
                continue;
            }
            BindOutcome::Parse(failure) => {
                trace!(command = command.full_name(), %failure, "candidate rejected");
                record(&mut recorded, ExecuteResult::Parse(failure));
                continue;
            }
        };

        if !options.skip_preconditions {
            let ctx = ConditionContext {
                caller: caller.as_ref(),
                command,
                value: None,
                services: &options.services,
                cancel: &options.cancel,
            };
            match evaluate_conditions(command.conditions(), ConditionPhase::Pre, &ctx).await {
                ConditionVerdict::Passed => {}
                ConditionVerdict::Canceled => return ExecuteResult::Canceled,
                ConditionVerdict::Failed { group, reason } => {
                    debug!(command = command.full_name(), group, "pre-condition failed");
                    record(
                        &mut recorded,
                        ExecuteResult::Condition(ConditionFailure {
                            command: command.full_name().to_string(),
                            phase: ConditionPhase::Pre,
                            group,
                            reason,
                        }),
                    );
                    continue;
                }
            }
        }

        if options.cancel.is_cancelled() {
            return ExecuteResult::Canceled;
        }

        let invocation = Invocation {
            caller: Arc::clone(caller),
            command: Arc::clone(command),
            arguments,
            services: Arc::clone(&options.services),
            cancel: options.cancel.clone(),
        };
        let body = (command.invoker())(invocation);
        let output = match std::panic::AssertUnwindSafe(body).catch_unwind().await {
            Ok(Ok(output)) => output,
            Ok(Err(reason)) => {
                let failure = ExecuteResult::Invoke(InvokeFailure {
                    command: command.full_name().to_string(),
                    reason,
                });
                if options.continue_on_invoke_failure {
                    record(&mut recorded, failure);
                    continue;
                }
                return failure;
            }
            Err(payload) => {
                let failure = ExecuteResult::Invoke(InvokeFailure {
                    command: command.full_name().to_string(),
                    reason: panic_reason(payload),
                });
                if options.continue_on_invoke_failure {
                    record(&mut recorded, failure);
                    continue;
                }
                return failure;
            }
        };

        if !options.skip_postconditions {
            let ctx = ConditionContext {
                caller: caller.as_ref(),
                command,
                value: Some(&output),
                services: &options.services,
                cancel: &options.cancel,
            };
            match evaluate_conditions(command.conditions(), ConditionPhase::Post, &ctx).await {
                ConditionVerdict::Passed => {}
                ConditionVerdict::Canceled => return ExecuteResult::Canceled,
                // The command already ran, so this is terminal.
                ConditionVerdict::Failed { group, reason } => {
                    return ExecuteResult::Condition(ConditionFailure {
                        command: command.full_name().to_string(),
                        phase: ConditionPhase::Post,
                        group,
                        reason,
                    });
                }
            }
        }

        return ExecuteResult::Success(Success {
            command: command.full_name().to_string(),
            output,
        });
    }

    recorded.unwrap_or_else(|| {
        ExecuteResult::Search(SearchFailure {
            token: source.try_peek_positional(0).map(str::to_string),
        })
    })
}

fn panic_reason(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("command panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("command panicked: {message}")
    } else {
        "command panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use solder_core::{
        ConditionFn, InvokeOutput, Param, RawValue, Response, ServiceScope,
    };

    use super::*;
    use crate::builder::CommandBuilder;
    use crate::handler::ResultHandlerFn;
    use crate::manager::CommandManager;
    use crate::options::ExecuteOptions;

    struct TestCaller;

    #[async_trait]
    impl CallerContext for TestCaller {
        fn identity(&self) -> &str {
            "tester"
        }

        async fn respond(&self, _response: Response) -> Result<(), String> {
            Ok(())
        }
    }

    fn caller() -> Arc<dyn CallerContext> {
        Arc::new(TestCaller)
    }

    fn recording() -> (
        Arc<Mutex<Vec<ExecuteResult>>>,
        ResultHandlerFn<
            impl Fn(&dyn CallerContext, &ExecuteResult, &ServiceScope) -> bool + Send + Sync,
        >,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = ResultHandlerFn::new(move |_caller, result, _services| {
            sink.lock().unwrap().push(result.clone());
            true
        });
        (seen, handler)
    }

    #[tokio::test]
    async fn test_higher_priority_overload_falls_back_on_length() {
        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(
                CommandBuilder::new("over")
                    .priority(10)
                    .param(Param::required::<i32>("a"))
                    .param(Param::required::<i32>("b"))
                    .invoke(|_inv| async move { Ok(InvokeOutput::with_display("two")) }),
            )
            .command(
                CommandBuilder::new("over")
                    .param(Param::required::<i32>("a"))
                    .invoke(|_inv| async move { Ok(InvokeOutput::with_display("one")) }),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute_string(caller(), "over 7", ExecuteOptions::default())
            .await;

        let seen = seen.lock().unwrap();
        let success = seen[0].success().expect("one-argument overload runs");
        assert_eq!(success.output.display_text(), Some("one"));
    }

    #[tokio::test]
    async fn test_optional_before_required_stays_required() {
        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(
                CommandBuilder::new("pair")
                    .param(Param::with_default::<String>("label", "x".to_string()))
                    .param(Param::required::<i32>("count"))
                    .invoke(|_inv| async move { Ok(InvokeOutput::void()) }),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute_string(caller(), "pair seven", ExecuteOptions::default())
            .await;

        let seen = seen.lock().unwrap();
        match &seen[0] {
            ExecuteResult::Parse(failure) => assert_eq!(failure.parameter, "count"),
            other => panic!("expected a parse failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_too_many_arguments_surface_as_length() {
        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(
                CommandBuilder::new("one")
                    .param(Param::required::<i32>("a"))
                    .invoke(|_inv| async move { Ok(InvokeOutput::void()) }),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute_string(caller(), "one 1 2 3", ExecuteOptions::default())
            .await;

        let seen = seen.lock().unwrap();
        match &seen[0] {
            ExecuteResult::Length(mismatch) => {
                assert_eq!(mismatch.direction, solder_core::LengthDirection::TooMany);
                assert_eq!(mismatch.actual, 3);
            }
            other => panic!("expected a length mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invoke_failure_is_terminal_by_default() {
        let (seen, handler) = recording();
        let build = |handler| {
            CommandManager::builder()
                .command(
                    CommandBuilder::new("flaky")
                        .priority(1)
                        .invoke(|_inv| async move { Err("boom".to_string()) }),
                )
                .command(
                    CommandBuilder::new("flaky")
                        .invoke(|_inv| async move { Ok(InvokeOutput::with_display("spare")) }),
                )
                .result_handler(handler)
                .build()
                .unwrap()
        };

        build(handler)
            .execute_string(caller(), "flaky", ExecuteOptions::default())
            .await;
        {
            let seen = seen.lock().unwrap();
            match &seen[0] {
                ExecuteResult::Invoke(failure) => assert_eq!(failure.reason, "boom"),
                other => panic!("expected an invoke failure, got {other:?}"),
            }
        }

        let (seen, handler) = recording();
        build(handler)
            .execute_string(
                caller(),
                "flaky",
                ExecuteOptions::default().continue_on_invoke_failure(true),
            )
            .await;
        let seen = seen.lock().unwrap();
        let success = seen[0].success().expect("fallback overload runs");
        assert_eq!(success.output.display_text(), Some("spare"));
    }

    #[tokio::test]
    async fn test_postcondition_failure_is_terminal() {
        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(
                CommandBuilder::new("audit")
                    .priority(1)
                    .postcondition(ConditionFn::new("audit", |_ctx| {
                        Err("rejected after the fact".to_string())
                    }))
                    .invoke(|_inv| async move { Ok(InvokeOutput::with_display("ran")) }),
            )
            .command(
                CommandBuilder::new("audit")
                    .invoke(|_inv| async move { Ok(InvokeOutput::with_display("spare")) }),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute_string(caller(), "audit", ExecuteOptions::default())
            .await;

        let seen = seen.lock().unwrap();
        match &seen[0] {
            ExecuteResult::Condition(failure) => {
                assert_eq!(failure.phase, solder_core::ConditionPhase::Post);
            }
            other => panic!("expected a post-condition failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_skip_preconditions_option() {
        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(
                CommandBuilder::new("gated")
                    .precondition(ConditionFn::new("never", |_ctx| Err("no".to_string())))
                    .invoke(|_inv| async move { Ok(InvokeOutput::with_display("in")) }),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute_string(
                caller(),
                "gated",
                ExecuteOptions::default().skip_preconditions(true),
            )
            .await;

        let seen = seen.lock().unwrap();
        assert!(seen[0].is_success());
    }

    #[tokio::test]
    async fn test_constructed_parameter_binds_in_place() {
        #[derive(Debug, Clone, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(
                CommandBuilder::new("plot")
                    .param(Param::constructed::<Point, _>(
                        "point",
                        vec![Param::required::<i32>("x"), Param::required::<i32>("y")],
                        |args| {
                            Ok(Point {
                                x: *args.get::<i32>(0)?,
                                y: *args.get::<i32>(1)?,
                            })
                        },
                    ))
                    .param(Param::required::<String>("label"))
                    .invoke(|inv| async move {
                        let point = inv.arguments.get::<Point>(0)?.clone();
                        let label = inv.arguments.get::<String>(1)?.clone();
                        Ok(InvokeOutput::with_display(format!(
                            "{label}@{},{}",
                            point.x, point.y
                        )))
                    }),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute_string(caller(), "plot 3 4 origin", ExecuteOptions::default())
            .await;

        let seen = seen.lock().unwrap();
        let success = seen[0].success().expect("constructed binds");
        assert_eq!(success.output.display_text(), Some("origin@3,4"));
    }

    #[tokio::test]
    async fn test_enum_parameter_through_declaration() {
        #[derive(Debug, Clone, PartialEq)]
        enum Color {
            Red,
            Green,
        }

        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .enum_type::<Color>(&[("red", Color::Red), ("green", Color::Green)])
            .command(
                CommandBuilder::new("paint")
                    .param(Param::required::<Color>("color"))
                    .invoke(|inv| async move {
                        let color = inv.arguments.get::<Color>(0)?.clone();
                        Ok(InvokeOutput::with_display(format!("{color:?}")))
                    }),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute_string(caller(), "paint GREEN", ExecuteOptions::default())
            .await;

        let seen = seen.lock().unwrap();
        let success = seen[0].success().expect("enum parses by name");
        assert_eq!(success.output.display_text(), Some("Green"));
    }

    #[tokio::test]
    async fn test_list_parameter_from_sequence_value() {
        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(
                CommandBuilder::new("tally")
                    .param(Param::list::<i32>("values"))
                    .invoke(|inv| async move {
                        let values = inv.arguments.get::<Vec<i32>>(0)?;
                        Ok(InvokeOutput::with_display(values.iter().sum::<i32>()))
                    }),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute(
                caller(),
                vec![
                    RawValue::text("tally"),
                    RawValue::Seq(vec![RawValue::text("1"), RawValue::text("2"), RawValue::text("4")]),
                ],
                ExecuteOptions::default(),
            )
            .await;

        let seen = seen.lock().unwrap();
        let success = seen[0].success().expect("list parses elementwise");
        assert_eq!(success.output.display_text(), Some("7"));
    }

    #[tokio::test]
    async fn test_remainder_list_collects_tail() {
        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(
                CommandBuilder::new("sumall")
                    .param(Param::remainder_list::<i32>("values"))
                    .invoke(|inv| async move {
                        let values = inv.arguments.get::<Vec<i32>>(0)?;
                        Ok(InvokeOutput::with_display(values.iter().sum::<i32>()))
                    }),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute_string(caller(), "sumall 1 2 3 4", ExecuteOptions::default())
            .await;

        let seen = seen.lock().unwrap();
        let success = seen[0].success().expect("remainder list parses");
        assert_eq!(success.output.display_text(), Some("10"));
    }

    #[tokio::test]
    async fn test_panicking_body_becomes_invoke_failure() {
        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(CommandBuilder::new("explode").invoke(|_inv| async move {
                panic!("kaboom");
                #[allow(unreachable_code)]
                Ok(InvokeOutput::void())
            }))
            .result_handler(handler)
            .build()
            .unwrap();

        manager
            .execute_string(caller(), "explode", ExecuteOptions::default())
            .await;

        let seen = seen.lock().unwrap();
        match &seen[0] {
            ExecuteResult::Invoke(failure) => assert!(failure.reason.contains("kaboom")),
            other => panic!("expected an invoke failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_instance_shaped_invoker_uses_scope() {
        struct Greeter {
            salutation: String,
        }

        let (seen, handler) = recording();
        let manager = CommandManager::builder()
            .command(
                CommandBuilder::new("hi")
                    .param(Param::required::<String>("name"))
                    .invoke_instance(
                        |scope: &ServiceScope| {
                            let salutation = scope
                                .get::<String>()
                                .ok_or_else(|| "no salutation configured".to_string())?;
                            Ok(Greeter {
                                salutation: (*salutation).clone(),
                            })
                        },
                        |module: Greeter, inv| async move {
                            let name = inv.arguments.get::<String>(0)?;
                            Ok(InvokeOutput::with_display(format!(
                                "{} {name}",
                                module.salutation
                            )))
                        },
                    ),
            )
            .result_handler(handler)
            .build()
            .unwrap();

        let mut scope = ServiceScope::new();
        scope.insert("Ahoy".to_string());
        manager
            .execute_string(
                caller(),
                "hi sailor",
                ExecuteOptions::default().services(Arc::new(scope)),
            )
            .await;

        let seen = seen.lock().unwrap();
        let success = seen[0].success().expect("instance invoker runs");
        assert_eq!(success.output.display_text(), Some("Ahoy sailor"));
    }
}
