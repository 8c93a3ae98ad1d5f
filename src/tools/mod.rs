//! Locating, running and falling back between external OSINT tools.
pub mod catalog;
pub mod fallback;
pub mod resolver;
pub mod runner;
pub mod status;

pub use catalog::{OutputFormat, ToolCatalog, ToolSpec};
pub use fallback::FallbackController;
pub use resolver::{PathResolver, StrategyResolver};
pub use runner::{ProcessRunner, TokioProcessRunner};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// The four logical tools, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolId {
    Holehe,
    Ghunt,
    Sherlock,
    Maigret,
}

impl ToolId {
    /// Email-keyed tools first, then username-keyed tools.
    pub const DISPATCH_ORDER: [ToolId; 4] =
        [ToolId::Holehe, ToolId::Ghunt, ToolId::Sherlock, ToolId::Maigret];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolId::Holehe => "holehe",
            ToolId::Ghunt => "ghunt",
            ToolId::Sherlock => "sherlock",
            ToolId::Maigret => "maigret",
        }
    }

    pub fn index(self) -> usize {
        match self {
            ToolId::Holehe => 0,
            ToolId::Ghunt => 1,
            ToolId::Sherlock => 2,
            ToolId::Maigret => 3,
        }
    }

    /// Whether the tool is run against the email rather than the companion username.
    pub fn keyed_by_email(self) -> bool {
        matches!(self, ToolId::Holehe | ToolId::Ghunt)
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "holehe" => Ok(ToolId::Holehe),
            "ghunt" => Ok(ToolId::Ghunt),
            "sherlock" => Ok(ToolId::Sherlock),
            "maigret" => Ok(ToolId::Maigret),
            other => Err(format!("unknown tool '{}'", other)),
        }
    }
}

/// Strategy that produced an invocation plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMethod {
    DirectBinary,
    Module,
    LocalScript,
    Shell,
    /// No plan ran at all.
    None,
}

impl fmt::Display for InvocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvocationMethod::DirectBinary => "direct_binary",
            InvocationMethod::Module => "module",
            InvocationMethod::LocalScript => "local_script",
            InvocationMethod::Shell => "shell",
            InvocationMethod::None => "none",
        };
        f.pad(label)
    }
}

/// A fully specified way to run a logical tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInvocationPlan {
    pub method: InvocationMethod,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl ToolInvocationPlan {
    pub fn new(method: InvocationMethod, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            method,
            program: program.into(),
            args,
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// Human-readable command line used in logs and tool status output.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Why an execution did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Unavailable,
    Timeout,
    Spawn,
    NonZeroExit,
}

/// Outcome of one process execution. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub method_used: InvocationMethod,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub failure: Option<FailureKind>,
}

impl ExecutionResult {
    pub fn completed(
        method: InvocationMethod,
        exit_code: i32,
        stdout: String,
        stderr: String,
        elapsed: Duration,
    ) -> Self {
        let success = exit_code == 0;
        Self {
            success,
            stdout,
            stderr,
            exit_code,
            method_used: method,
            elapsed,
            failure: (!success).then_some(FailureKind::NonZeroExit),
        }
    }

    pub fn failed(
        method: InvocationMethod,
        kind: FailureKind,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: message.into(),
            exit_code: -1,
            method_used: method,
            elapsed,
            failure: Some(kind),
        }
    }

    pub fn unavailable(tool: ToolId) -> Self {
        Self::failed(
            InvocationMethod::None,
            FailureKind::Unavailable,
            format!("tool unavailable: no invocation candidate found for {}", tool),
            Duration::ZERO,
        )
    }

    pub fn has_output(&self) -> bool {
        !self.stdout.trim().is_empty()
    }

    pub fn timed_out(&self) -> bool {
        self.failure == Some(FailureKind::Timeout)
    }

    /// Whether an interpreter ran but reported the tool package or script
    /// as missing.
    pub fn tool_missing(&self) -> bool {
        if self.failure != Some(FailureKind::NonZeroExit) {
            return false;
        }
        if !matches!(
            self.method_used,
            InvocationMethod::Module | InvocationMethod::LocalScript
        ) {
            return false;
        }
        let stderr = self.stderr.to_lowercase();
        NOT_INSTALLED_SIGNATURES
            .iter()
            .any(|sig| stderr.contains(sig))
    }
}

/// Interpreter diagnostics for a package or script that is not installed.
const NOT_INSTALLED_SIGNATURES: &[&str] = &[
    "no module named",
    "modulenotfounderror",
    "can't open file",
    "no such file or directory",
];

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}
