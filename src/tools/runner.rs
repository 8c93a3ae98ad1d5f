use crate::tools::{ExecutionResult, FailureKind, ToolInvocationPlan};
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Runs one invocation plan to completion or timeout.
///
/// Implementations never return an error: spawn failures, timeouts and
/// non-zero exits are all encoded in the returned [`ExecutionResult`].
#[async_trait]
pub trait ProcessRunner: Send + Sync + 'static {
    async fn run(&self, plan: &ToolInvocationPlan, timeout: Duration) -> ExecutionResult;
}

/// Runner backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, plan: &ToolInvocationPlan, timeout: Duration) -> ExecutionResult {
        let started = Instant::now();
        let mut command = Command::new(&plan.program);
        command
            .args(&plan.args)
            .envs(&plan.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &plan.cwd {
            command.current_dir(cwd);
        }

        tracing::debug!(
            method = %plan.method,
            command = %plan.display_command(),
            timeout_secs = timeout.as_secs(),
            "spawning tool process"
        );

        let child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                return ExecutionResult::failed(
                    plan.method,
                    FailureKind::Spawn,
                    spawn_message(plan, &err),
                    started.elapsed(),
                );
            }
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let result = ExecutionResult::completed(
                    plan.method,
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                    started.elapsed(),
                );
                tracing::debug!(
                    exit_code = result.exit_code,
                    elapsed_ms = result.elapsed.as_millis() as u64,
                    stdout_bytes = result.stdout.len(),
                    "tool process exited"
                );
                result
            }
            Ok(Err(err)) => ExecutionResult::failed(
                plan.method,
                FailureKind::Spawn,
                format!("failed to collect output of {}: {}", plan.program.display(), err),
                started.elapsed(),
            ),
            Err(_) => {
                tracing::warn!(
                    command = %plan.display_command(),
                    "tool process timed out and was killed"
                );
                ExecutionResult::failed(
                    plan.method,
                    FailureKind::Timeout,
                    format!(
                        "execution timed out after {}",
                        humantime::format_duration(timeout)
                    ),
                    started.elapsed(),
                )
            }
        }
    }
}

fn spawn_message(plan: &ToolInvocationPlan, err: &io::Error) -> String {
    let program = plan.program.display();
    match err.kind() {
        io::ErrorKind::NotFound => format!("executable file not found: {}", program),
        io::ErrorKind::PermissionDenied => format!("permission denied: {}", program),
        _ => format!("failed to spawn {}: {}", program, err),
    }
}
