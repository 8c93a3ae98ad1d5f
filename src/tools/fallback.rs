use crate::tools::{ExecutionResult, FailureKind, ProcessRunner, ToolId, ToolInvocationPlan};
use std::sync::Arc;
use std::time::Duration;

/// Runs a primary plan and, once, a secondary plan when the primary looks
/// like a broken install rather than a real result.
#[derive(Clone)]
pub struct FallbackController {
    runner: Arc<dyn ProcessRunner>,
    signatures: Vec<String>,
}

impl FallbackController {
    pub fn new(runner: Arc<dyn ProcessRunner>, signatures: &[String]) -> Self {
        Self {
            runner,
            signatures: signatures
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    /// Run the first resolved plan with the second as fallback. No plans,
    /// or an interpreter reporting the package missing, means the tool is
    /// unavailable.
    pub async fn execute(
        &self,
        tool: ToolId,
        plans: &[ToolInvocationPlan],
        timeout: Duration,
    ) -> ExecutionResult {
        match plans.first() {
            Some(primary) => {
                let mut result = self
                    .run_with_fallback(tool, primary, plans.get(1), timeout)
                    .await;
                if result.tool_missing() {
                    tracing::warn!(
                        tool = %tool,
                        method = %result.method_used,
                        "interpreter reports tool not installed"
                    );
                    result.failure = Some(FailureKind::Unavailable);
                }
                result
            }
            None => {
                tracing::warn!(tool = %tool, "no invocation candidate resolved");
                ExecutionResult::unavailable(tool)
            }
        }
    }

    pub async fn run_with_fallback(
        &self,
        tool: ToolId,
        primary: &ToolInvocationPlan,
        secondary: Option<&ToolInvocationPlan>,
        timeout: Duration,
    ) -> ExecutionResult {
        let first = self.runner.run(primary, timeout).await;
        if first.success && first.has_output() {
            return first;
        }
        if !self.should_fall_back(&first) {
            return first;
        }
        let Some(secondary) = secondary else {
            return first;
        };

        tracing::warn!(
            tool = %tool,
            primary = %primary.method,
            secondary = %secondary.method,
            exit_code = first.exit_code,
            "primary invocation unusable, trying fallback"
        );
        let second = self.runner.run(secondary, timeout).await;

        // A clean run that found nothing beats a fallback that failed outright.
        if first.success && !second.success {
            return first;
        }
        second
    }

    /// Whether `result` qualifies for the single fallback step. Timeouts never do.
    pub fn should_fall_back(&self, result: &ExecutionResult) -> bool {
        if result.timed_out() {
            return false;
        }
        if !result.has_output() {
            return true;
        }
        let stderr = result.stderr.to_lowercase();
        self.signatures.iter().any(|sig| stderr.contains(sig.as_str()))
    }
}

impl std::fmt::Debug for FallbackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackController")
            .field("signatures", &self.signatures)
            .finish_non_exhaustive()
    }
}
