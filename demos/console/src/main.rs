//! A minimal console host for a solder command manager.
//!
//! Reads lines from stdin and dispatches them:
//!
//! ```text
//! > math sum 2.5 3
//! 5.5
//! > echo hello world
//! hello world
//! > greet
//! Hello, world!
//! ```

use std::io::{BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use solder::prelude::*;

struct ConsoleCaller;

#[async_trait]
impl CallerContext for ConsoleCaller {
    fn identity(&self) -> &str {
        "console"
    }

    async fn respond(&self, response: Response) -> Result<(), String> {
        match response {
            Response::Text(text) => println!("{text}"),
            Response::Value(value) => println!("{value}"),
        }
        Ok(())
    }
}

fn build_manager() -> Result<CommandManager, BuildError> {
    CommandManager::builder()
        .group(
            GroupBuilder::new("math")
                .command(
                    CommandBuilder::new("sum")
                        .param(Param::required::<f64>("a"))
                        .param(Param::required::<f64>("b"))
                        .invoke(|inv| async move {
                            let a = *inv.arguments.get::<f64>(0)?;
                            let b = *inv.arguments.get::<f64>(1)?;
                            Ok(InvokeOutput::with_display(a + b))
                        }),
                )
                .command(
                    CommandBuilder::new("product")
                        .param(Param::remainder_list::<f64>("factors"))
                        .invoke(|inv| async move {
                            let factors = inv.arguments.get::<Vec<f64>>(0)?;
                            Ok(InvokeOutput::with_display(
                                factors.iter().product::<f64>(),
                            ))
                        }),
                ),
        )
        .command(
            CommandBuilder::new("echo")
                .param(Param::remainder("text"))
                .invoke(|inv| async move {
                    Ok(InvokeOutput::with_display(
                        inv.arguments.get::<String>(0)?.clone(),
                    ))
                }),
        )
        .command(
            CommandBuilder::new("greet")
                .param(Param::with_default::<String>("name", "world".to_string()))
                .invoke(|inv| async move {
                    let name = inv.arguments.get::<String>(0)?;
                    Ok(InvokeOutput::with_display(format!("Hello, {name}!")))
                }),
        )
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let manager = build_manager()?;
    let caller: Arc<dyn CallerContext> = Arc::new(ConsoleCaller);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }

        manager
            .execute_string(Arc::clone(&caller), line, ExecuteOptions::default())
            .await;
    }

    Ok(())
}
