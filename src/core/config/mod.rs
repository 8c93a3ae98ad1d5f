pub mod loader;

pub use loader::ConfigLoader;

use crate::core::types::ExecutionMode;
use crate::tools::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration loaded from osint.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OsintConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Timeouts, scheduling and report output
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Where and how tools are located
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Stderr phrases that trigger the secondary plan
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Per-tool overrides keyed by tool name (`[tools.sherlock]`)
    #[serde(default)]
    pub tools: BTreeMap<String, ToolOverride>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Timeout for a full tool scan in seconds
    #[serde(default = "default_scan_timeout_secs")]
    pub scan_timeout_secs: u64,

    /// Timeout for lightweight probes such as version checks
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    #[serde(default)]
    pub mode: ExecutionMode,

    /// Directory that receives timestamped JSON reports
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Execution strategy resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Directories searched before PATH for tool executables
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Append the inherited PATH entries to `search_paths`
    #[serde(default = "default_true")]
    pub include_env_path: bool,

    /// Runtime interpreters tried for module and script invocation
    #[serde(default = "default_interpreters")]
    pub interpreters: Vec<String>,

    /// Directory holding locally checked-out tool sources
    #[serde(default = "default_tools_dir")]
    pub tools_dir: PathBuf,

    /// Directories prepended to PATH for the shell strategy
    #[serde(default = "default_extra_path")]
    pub extra_path: Vec<PathBuf>,

    #[serde(default = "default_shell")]
    pub shell: PathBuf,

    #[serde(default = "default_true")]
    pub enable_module: bool,

    #[serde(default = "default_true")]
    pub enable_scripts: bool,

    #[serde(default = "default_true")]
    pub enable_shell: bool,
}

/// Fallback controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Case-insensitive stderr fragments that make the primary plan fallback-eligible
    #[serde(default = "default_signatures")]
    pub signatures: Vec<String>,
}

/// Partial override of a built-in tool spec
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ToolOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binaries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affirmative_keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affirmative_markers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_credentials: Option<bool>,
}

impl ExecutionConfig {
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

// Default functions
fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_scan_timeout_secs() -> u64 {
    300
}

fn default_probe_timeout_secs() -> u64 {
    15
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_true() -> bool {
    true
}

fn default_interpreters() -> Vec<String> {
    vec!["python3".to_string(), "python".to_string()]
}

fn default_tools_dir() -> PathBuf {
    PathBuf::from("tools")
}

fn default_extra_path() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = dirs_next::home_dir() {
        dirs.push(home.join(".local").join("bin"));
    }
    dirs.extend(
        ["/opt/render/.local/bin", "/usr/local/bin", "/usr/bin", "/bin"]
            .iter()
            .map(PathBuf::from),
    );
    dirs
}

fn default_shell() -> PathBuf {
    PathBuf::from("/bin/sh")
}

fn default_signatures() -> Vec<String> {
    [
        "no module named",
        "modulenotfounderror",
        "module not found",
        "entry point",
        "file not found",
        "no such file or directory",
        "command not found",
        "permission denied",
        "importerror",
        "cannot be directly executed",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            scan_timeout_secs: default_scan_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            mode: ExecutionMode::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            search_paths: Vec::new(),
            include_env_path: true,
            interpreters: default_interpreters(),
            tools_dir: default_tools_dir(),
            extra_path: default_extra_path(),
            shell: default_shell(),
            enable_module: true,
            enable_scripts: true,
            enable_shell: true,
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        FallbackConfig {
            signatures: default_signatures(),
        }
    }
}
