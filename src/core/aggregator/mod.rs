//! Aggregation of the four tool runs into one record.
//!
//! Each tool is resolved, executed (with at most one fallback) and normalized
//! independently. Tool-level problems end up in that tool's [`ToolReport`];
//! only an invalid identifier aborts a scan, and it does so before any
//! process is spawned.
#![allow(clippy::result_large_err)]

use crate::core::config::OsintConfig;
use crate::core::error::AppError;
use crate::core::target::Target;
use crate::core::types::{ErrorCategory, ExecutionMode, TargetKind};
use crate::parsers::{self, ToolFindings};
use crate::tools::{
    ExecutionResult, FailureKind, FallbackController, InvocationMethod, PathResolver,
    ProcessRunner, StrategyResolver, ToolCatalog, ToolId, ToolSpec, TokioProcessRunner,
};
use crate::utils::EnvManager;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Longest error text kept in a report; tool stderr can be huge.
const ERROR_TEXT_LIMIT: usize = 2_000;

pub const CANCELLED_MESSAGE: &str = "scan cancelled before dispatch";

/// Per-tool outcome. Always present for every tool in the final record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolReport {
    pub tool: ToolId,
    pub success: bool,
    pub findings: ToolFindings,
    pub error: Option<String>,
    pub error_kind: Option<ErrorCategory>,
    pub method: InvocationMethod,
    pub exit_code: Option<i32>,
    pub elapsed_ms: u64,
}

impl ToolReport {
    fn succeeded(spec: &ToolSpec, exec: &ExecutionResult, findings: ToolFindings) -> Self {
        Self {
            tool: spec.id,
            success: true,
            findings,
            error: None,
            error_kind: None,
            method: exec.method_used,
            exit_code: Some(exec.exit_code),
            elapsed_ms: exec.elapsed.as_millis() as u64,
        }
    }

    fn failed(spec: &ToolSpec, kind: ErrorCategory, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = format!("{} failed without diagnostic output", spec.id);
        }
        Self {
            tool: spec.id,
            success: false,
            findings: ToolFindings::empty_for(spec.output),
            error: Some(error),
            error_kind: Some(kind),
            method: InvocationMethod::None,
            exit_code: None,
            elapsed_ms: 0,
        }
    }

    fn from_execution_failure(spec: &ToolSpec, exec: &ExecutionResult) -> Self {
        let kind = match exec.failure {
            Some(FailureKind::Unavailable) => ErrorCategory::ToolUnavailable,
            Some(FailureKind::Timeout) => ErrorCategory::ExecutionTimeout,
            _ => ErrorCategory::ExecutionFailure,
        };
        let error = match truncate(exec.stderr.trim()) {
            text if !text.is_empty() => text,
            _ => format!("{} exited with code {}", spec.id, exec.exit_code),
        };
        Self {
            method: exec.method_used,
            exit_code: Some(exec.exit_code),
            elapsed_ms: exec.elapsed.as_millis() as u64,
            ..Self::failed(spec, kind, error)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub tools_attempted: usize,
    pub tools_succeeded: usize,
    pub tools_failed: usize,
    /// Site records plus mapping entries across all tools.
    pub total_findings: usize,
    /// Site records flagged as existing.
    pub positive_findings: usize,
}

impl Summary {
    fn fold<'a>(reports: impl Iterator<Item = &'a ToolReport>) -> Self {
        reports.fold(Summary::default(), |mut acc, report| {
            acc.tools_attempted += 1;
            if report.success {
                acc.tools_succeeded += 1;
            } else {
                acc.tools_failed += 1;
            }
            acc.total_findings += report.findings.len();
            acc.positive_findings += report.findings.positive_count();
            acc
        })
    }
}

/// The record handed to the HTTP serializer or the report writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub scan_id: Uuid,
    pub identifier: String,
    pub companion: String,
    pub target_kind: TargetKind,
    pub timestamp: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub tools: IndexMap<String, ToolReport>,
    pub summary: Summary,
}

impl AggregateResult {
    pub fn any_succeeded(&self) -> bool {
        self.summary.tools_succeeded > 0
    }

    pub fn report(&self, tool: ToolId) -> Option<&ToolReport> {
        self.tools.get(tool.as_str())
    }
}

/// Per-scan flag that stops undispatched tools from starting.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Aggregator {
    catalog: ToolCatalog,
    resolver: Arc<dyn StrategyResolver>,
    fallback: FallbackController,
    scan_timeout: Duration,
    mode: ExecutionMode,
    credentials_present: bool,
}

impl Aggregator {
    pub fn new(
        catalog: ToolCatalog,
        resolver: Arc<dyn StrategyResolver>,
        fallback: FallbackController,
        scan_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            resolver,
            fallback,
            scan_timeout,
            mode: ExecutionMode::default(),
            credentials_present: false,
        }
    }

    /// Production wiring: filesystem resolver and tokio runner. `passthrough`
    /// is the credential environment, forwarded to tools uninspected.
    pub fn from_config(
        config: &OsintConfig,
        passthrough: &BTreeMap<String, String>,
        credentials_present: bool,
    ) -> Self {
        let resolver = PathResolver::from_config(
            &config.resolver,
            EnvManager::tool_env_vars(passthrough),
        );
        let fallback =
            FallbackController::new(Arc::new(TokioProcessRunner), &config.fallback.signatures);
        Aggregator::new(
            ToolCatalog::from_config(config),
            Arc::new(resolver),
            fallback,
            config.execution.scan_timeout(),
        )
        .with_mode(config.execution.mode)
        .with_credentials(credentials_present)
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_credentials(mut self, present: bool) -> Self {
        self.credentials_present = present;
        self
    }

    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &dyn StrategyResolver {
        self.resolver.as_ref()
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        self.fallback.runner()
    }

    pub fn credentials_present(&self) -> bool {
        self.credentials_present
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Validate `input` (email or username) and scan it.
    pub async fn aggregate(&self, input: &str) -> Result<AggregateResult, AppError> {
        let target = Target::parse(input)?;
        Ok(self.aggregate_target(&target).await)
    }

    pub async fn aggregate_target(&self, target: &Target) -> AggregateResult {
        self.aggregate_cancellable(target, &CancellationFlag::default())
            .await
    }

    /// Scan `target`; tools not yet started when `cancel` fires are reported
    /// as cancelled. The flag only affects this scan.
    pub async fn aggregate_cancellable(
        &self,
        target: &Target,
        cancel: &CancellationFlag,
    ) -> AggregateResult {
        let started = Instant::now();
        let timestamp = Utc::now();
        let scan_id = Uuid::new_v4();
        tracing::info!(
            %scan_id,
            identifier = %target.identifier,
            companion = %target.companion,
            mode = %self.mode,
            "starting scan"
        );

        let reports: Vec<ToolReport> = match self.mode {
            ExecutionMode::Sequential => {
                let mut reports = Vec::with_capacity(4);
                for spec in self.catalog.iter() {
                    reports.push(self.run_tool(spec, target, cancel).await);
                }
                reports
            }
            ExecutionMode::Concurrent => {
                join_all(
                    self.catalog
                        .iter()
                        .map(|spec| self.run_tool(spec, target, cancel)),
                )
                .await
            }
        };

        let summary = Summary::fold(reports.iter());
        let tools: IndexMap<String, ToolReport> = reports
            .into_iter()
            .map(|report| (report.tool.as_str().to_string(), report))
            .collect();

        let result = AggregateResult {
            scan_id,
            identifier: target.identifier.clone(),
            companion: target.companion.clone(),
            target_kind: target.kind,
            timestamp,
            elapsed_ms: started.elapsed().as_millis() as u64,
            tools,
            summary,
        };
        tracing::info!(
            %scan_id,
            succeeded = result.summary.tools_succeeded,
            failed = result.summary.tools_failed,
            findings = result.summary.total_findings,
            elapsed_ms = result.elapsed_ms,
            "scan finished"
        );
        result
    }

    async fn run_tool(
        &self,
        spec: &ToolSpec,
        target: &Target,
        cancel: &CancellationFlag,
    ) -> ToolReport {
        if cancel.is_cancelled() {
            return ToolReport::failed(spec, ErrorCategory::ExecutionFailure, CANCELLED_MESSAGE);
        }
        if spec.requires_credentials && !self.credentials_present {
            tracing::warn!(tool = %spec.id, "skipping tool: credentials not configured");
            return ToolReport::failed(
                spec,
                ErrorCategory::ToolUnavailable,
                format!(
                    "{} requires credentials; set GHUNT_TOKEN or GHUNT_COOKIES_B64 and run `osint-aggregator credentials`",
                    spec.id
                ),
            );
        }

        let args = spec.scan_args(target.argument_for(spec.id));
        let plans = self.resolver.resolve(spec, &args);
        let exec = self.fallback.execute(spec.id, &plans, self.scan_timeout).await;

        let report = if !exec.success {
            ToolReport::from_execution_failure(spec, &exec)
        } else {
            match parsers::normalize(spec, &exec.stdout) {
                Ok(findings) => ToolReport::succeeded(spec, &exec, findings),
                Err(err) => ToolReport {
                    method: exec.method_used,
                    exit_code: Some(exec.exit_code),
                    elapsed_ms: exec.elapsed.as_millis() as u64,
                    ..ToolReport::failed(spec, ErrorCategory::ParseFailure, err.to_string())
                },
            }
        };

        if report.success {
            tracing::info!(
                tool = %spec.id,
                method = %report.method,
                findings = report.findings.len(),
                "tool succeeded"
            );
        } else {
            tracing::info!(
                tool = %spec.id,
                kind = ?report.error_kind,
                error = report.error.as_deref().unwrap_or_default(),
                "tool failed"
            );
        }
        report
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= ERROR_TEXT_LIMIT {
        return text.to_string();
    }
    let mut out: String = text.chars().take(ERROR_TEXT_LIMIT).collect();
    out.push('…');
    out
}
