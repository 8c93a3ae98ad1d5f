use crate::core::config::{OsintConfig, ToolOverride};
use crate::tools::ToolId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder replaced with the scanned identifier in argument templates.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Output normalizer applied to a tool's stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `[Site] status` lines with an existence flag.
    Presence,
    /// Every `http(s)://` token is a finding.
    ProfileList,
    /// `key: value` lines folded into a mapping.
    KeyValue,
    /// Whole stdout parsed as JSON.
    Json,
}

impl OutputFormat {
    /// Whether the tool's findings are a mapping rather than a sequence.
    pub fn is_mapping(self) -> bool {
        matches!(self, OutputFormat::KeyValue | OutputFormat::Json)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutputFormat::Presence => "presence",
            OutputFormat::ProfileList => "profile_list",
            OutputFormat::KeyValue => "key_value",
            OutputFormat::Json => "json",
        };
        f.write_str(label)
    }
}

/// Declarative description of how to reach and read one logical tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub id: ToolId,
    pub description: String,
    /// Executable names looked up on the search paths.
    pub binaries: Vec<String>,
    /// Runtime package names for `<interpreter> -m <module>`.
    pub modules: Vec<String>,
    /// Script candidates relative to the local tools directory.
    pub scripts: Vec<String>,
    /// Argument template; `{target}` is substituted per scan.
    pub args: Vec<String>,
    pub version_args: Vec<String>,
    pub output: OutputFormat,
    /// Normalized status texts that mean "account exists".
    pub affirmative_keywords: Vec<String>,
    /// Bracket markers (`[+]`) that mean "account exists".
    pub affirmative_markers: Vec<String>,
    pub requires_credentials: bool,
}

impl ToolSpec {
    pub fn scan_args(&self, target: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(TARGET_PLACEHOLDER, target))
            .collect()
    }

    pub fn default_for(id: ToolId) -> Self {
        match id {
            ToolId::Holehe => ToolSpec {
                id,
                description: "Email registration checker".to_string(),
                binaries: strings(&["holehe"]),
                modules: strings(&["holehe"]),
                scripts: strings(&["holehe/cli.py", "holehe/holehe/core.py", "holehe/holehe.py"]),
                args: strings(&[TARGET_PLACEHOLDER, "--no-color"]),
                version_args: strings(&["--help"]),
                output: OutputFormat::Presence,
                affirmative_keywords: strings(&["exists", "found", "used", "email used"]),
                affirmative_markers: strings(&["+"]),
                requires_credentials: false,
            },
            ToolId::Ghunt => ToolSpec {
                id,
                description: "Google account information lookup".to_string(),
                binaries: strings(&["ghunt"]),
                modules: strings(&["ghunt"]),
                scripts: strings(&["ghunt/main.py", "ghunt/ghunt.py"]),
                args: strings(&["email", TARGET_PLACEHOLDER]),
                version_args: strings(&["--version"]),
                output: OutputFormat::KeyValue,
                affirmative_keywords: Vec::new(),
                affirmative_markers: Vec::new(),
                requires_credentials: true,
            },
            ToolId::Sherlock => ToolSpec {
                id,
                description: "Username search across social networks".to_string(),
                binaries: strings(&["sherlock"]),
                modules: strings(&["sherlock_project", "sherlock"]),
                scripts: strings(&[
                    "sherlock/sherlock_project/sherlock.py",
                    "sherlock/sherlock/sherlock.py",
                    "sherlock/sherlock.py",
                ]),
                args: strings(&[TARGET_PLACEHOLDER, "--print-found", "--no-color"]),
                version_args: strings(&["--version"]),
                output: OutputFormat::Presence,
                affirmative_keywords: strings(&["exists", "found", "claimed"]),
                affirmative_markers: strings(&["+"]),
                requires_credentials: false,
            },
            ToolId::Maigret => ToolSpec {
                id,
                description: "Username dossier across thousands of sites".to_string(),
                binaries: strings(&["maigret"]),
                modules: strings(&["maigret"]),
                scripts: strings(&["maigret/maigret.py", "maigret/maigret/maigret.py"]),
                args: strings(&[TARGET_PLACEHOLDER, "--no-color", "--no-progressbar"]),
                version_args: strings(&["--version"]),
                output: OutputFormat::ProfileList,
                affirmative_keywords: Vec::new(),
                affirmative_markers: Vec::new(),
                requires_credentials: false,
            },
        }
    }

    fn apply(&mut self, overrides: &ToolOverride) {
        if let Some(binaries) = &overrides.binaries {
            self.binaries = binaries.clone();
        }
        if let Some(modules) = &overrides.modules {
            self.modules = modules.clone();
        }
        if let Some(scripts) = &overrides.scripts {
            self.scripts = scripts.clone();
        }
        if let Some(args) = &overrides.args {
            self.args = args.clone();
        }
        if let Some(version_args) = &overrides.version_args {
            self.version_args = version_args.clone();
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(keywords) = &overrides.affirmative_keywords {
            self.affirmative_keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        }
        if let Some(markers) = &overrides.affirmative_markers {
            self.affirmative_markers = markers.clone();
        }
        if let Some(requires) = overrides.requires_credentials {
            self.requires_credentials = requires;
        }
    }
}

/// The four tool specs in dispatch order.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    specs: Vec<ToolSpec>,
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self {
            specs: ToolId::DISPATCH_ORDER
                .iter()
                .map(|id| ToolSpec::default_for(*id))
                .collect(),
        }
    }
}

impl ToolCatalog {
    /// Built-in specs with `[tools.<name>]` overrides from the configuration applied.
    pub fn from_config(config: &OsintConfig) -> Self {
        let mut catalog = ToolCatalog::default();
        for spec in &mut catalog.specs {
            if let Some(overrides) = config.tools.get(spec.id.as_str()) {
                spec.apply(overrides);
            }
        }
        catalog
    }

    // Specs are stored in DISPATCH_ORDER, so the tool index is the position.
    pub fn get(&self, id: ToolId) -> &ToolSpec {
        &self.specs[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolSpec> {
        self.specs.iter()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
