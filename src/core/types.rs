use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No invocation candidate resolved to something runnable.
    ToolUnavailable,
    /// The process exceeded its bounded timeout and was killed.
    ExecutionTimeout,
    /// The process ran and exited non-zero, or could not be spawned.
    ExecutionFailure,
    /// Output could not be normalized into the tool's expected shape.
    ParseFailure,
    /// Caller-supplied identifier failed the shape check.
    InputValidation,
    ConfigError,
    IoError,
    SerializationError,
    InternalError,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error severity enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
}

/// Whether the scanned identifier was an email or a bare username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Email,
    Username,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Email => write!(f, "email"),
            TargetKind::Username => write!(f, "username"),
        }
    }
}

/// How the aggregator schedules the four tool invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Concurrent,
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "sequential" => Ok(ExecutionMode::Sequential),
            "concurrent" | "parallel" => Ok(ExecutionMode::Concurrent),
            _ => Err(format!(
                "invalid execution mode '{}'; supported values are sequential, concurrent",
                value
            )),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Concurrent => write!(f, "concurrent"),
        }
    }
}
