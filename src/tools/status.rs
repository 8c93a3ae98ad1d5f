use crate::tools::{
    FailureKind, InvocationMethod, ProcessRunner, StrategyResolver, ToolCatalog, ToolId, ToolSpec,
};
use futures::future::join_all;
use serde::Serialize;
use std::time::Duration;

/// Availability of one tool as seen by the resolver and a version probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub tool: ToolId,
    pub available: bool,
    pub method: InvocationMethod,
    pub program: Option<String>,
    pub version: Option<String>,
    pub candidates: usize,
    pub requires_credentials: bool,
    pub credentials_present: bool,
}

/// Resolve the tool with its version arguments and run the first plan.
pub async fn probe(
    spec: &ToolSpec,
    resolver: &dyn StrategyResolver,
    runner: &dyn ProcessRunner,
    timeout: Duration,
    credentials_present: bool,
) -> ToolStatus {
    let plans = resolver.resolve(spec, &spec.version_args);
    let mut status = ToolStatus {
        tool: spec.id,
        available: false,
        method: InvocationMethod::None,
        program: None,
        version: None,
        candidates: plans.len(),
        requires_credentials: spec.requires_credentials,
        credentials_present,
    };
    let Some(plan) = plans.first() else {
        return status;
    };

    let result = runner.run(plan, timeout).await;
    status.method = plan.method;
    status.program = Some(plan.display_command());
    // Some tools print usage on stderr or exit non-zero for `--version`;
    // only a spawn failure, a timeout or a missing package means the tool
    // cannot run.
    status.available = !matches!(
        result.failure,
        Some(FailureKind::Spawn | FailureKind::Timeout)
    ) && !result.tool_missing();
    if status.available {
        status.version = first_line(&result.stdout).or_else(|| first_line(&result.stderr));
    }
    status
}

/// Probe every catalog entry concurrently, in dispatch order.
pub async fn probe_all(
    catalog: &ToolCatalog,
    resolver: &dyn StrategyResolver,
    runner: &dyn ProcessRunner,
    timeout: Duration,
    credentials_present: bool,
) -> Vec<ToolStatus> {
    join_all(
        catalog
            .iter()
            .map(|spec| probe(spec, resolver, runner, timeout, credentials_present)),
    )
    .await
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(200).collect())
}
