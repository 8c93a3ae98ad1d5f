#![allow(clippy::result_large_err)] // AppError keeps its context map; boxing would lose it at the call sites.

use crate::core::aggregator::{AggregateResult, ToolReport};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::parsers::ToolFindings;
use std::fs;
use std::path::PathBuf;

/// How many site findings the text summary lists per tool.
const LISTED_FINDINGS: usize = 10;

/// Output format of the CLI report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// `osint_<sanitized-target>_<YYYYmmdd_HHMMSS>.json`, stamped with the scan's own timestamp.
    pub fn file_name(result: &AggregateResult) -> String {
        format!(
            "osint_{}_{}.json",
            sanitize(&result.identifier),
            result.timestamp.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write the record as pretty JSON and return the file path.
    pub fn write(&self, result: &AggregateResult) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!(
                    "Failed to create output directory {}: {}",
                    self.output_dir.display(),
                    e
                ),
            )
            .with_code("REPORT-IO-001")
        })?;

        let path = self.output_dir.join(Self::file_name(result));
        let body = render_json(result)?;
        fs::write(&path, body).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to write report {}: {}", path.display(), e),
            )
            .with_code("REPORT-IO-002")
        })?;
        tracing::info!(path = %path.display(), "report written");
        Ok(path)
    }
}

pub fn render_json(result: &AggregateResult) -> Result<String, AppError> {
    serde_json::to_string_pretty(result).map_err(|e| {
        AppError::new(
            ErrorCategory::SerializationError,
            format!("Failed to generate JSON report: {}", e),
        )
        .with_code("REPORT-JSON-001")
    })
}

/// Human-readable summary printed by the CLI.
pub fn render_text(result: &AggregateResult) -> String {
    let mut out = String::new();
    out.push_str("=== OSINT Scan Summary ===\n\n");
    out.push_str(&format!("Target: {} ({})\n", result.identifier, result.target_kind));
    if result.companion != result.identifier {
        out.push_str(&format!("Username: {}\n", result.companion));
    }
    out.push_str(&format!("Scan ID: {}\n", result.scan_id));
    out.push_str(&format!(
        "Started: {}\n",
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Elapsed: {}\n\n",
        humantime::format_duration(std::time::Duration::from_millis(result.elapsed_ms))
    ));

    for report in result.tools.values() {
        out.push_str(&tool_section(report));
    }

    let s = &result.summary;
    out.push_str(&format!(
        "\nTools: {}/{} succeeded, {} failed\n",
        s.tools_succeeded, s.tools_attempted, s.tools_failed
    ));
    out.push_str(&format!(
        "Findings: {} total, {} positive\n",
        s.total_findings, s.positive_findings
    ));
    out
}

fn tool_section(report: &ToolReport) -> String {
    let mut out = String::new();
    if !report.success {
        out.push_str(&format!(
            "[FAIL] {}: {}\n",
            report.tool,
            first_line(report.error.as_deref().unwrap_or_default())
        ));
        return out;
    }

    out.push_str(&format!(
        "[ OK ] {}: {} finding(s) via {}\n",
        report.tool,
        report.findings.len(),
        report.method
    ));
    match &report.findings {
        ToolFindings::Sites(sites) => {
            let positive: Vec<_> = sites.iter().filter(|s| s.exists).collect();
            for site in positive.iter().take(LISTED_FINDINGS) {
                match &site.url {
                    Some(url) => out.push_str(&format!("       - {}: {}\n", site.site, url)),
                    None => out.push_str(&format!("       - {}\n", site.site)),
                }
            }
            if positive.len() > LISTED_FINDINGS {
                out.push_str(&format!(
                    "       ... and {} more\n",
                    positive.len() - LISTED_FINDINGS
                ));
            }
        }
        ToolFindings::Profile(profile) => {
            for (key, value) in profile.iter().take(LISTED_FINDINGS) {
                let text = value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                out.push_str(&format!("       {}: {}\n", key, text));
            }
        }
    }
    out
}

fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or(text)
}

/// Keep `[A-Za-z0-9._-]`, map everything else (including `@`) to `_`.
pub fn sanitize(identifier: &str) -> String {
    let cleaned: String = identifier
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "target".to_string()
    } else {
        trimmed.to_string()
    }
}
