//! Output normalizers turning raw tool stdout into findings.
//!
//! Every parser is a pure function of its input: the same stdout always
//! yields the same findings, and unstructured input yields an empty result
//! rather than an error. Only the JSON variant can fail.
pub mod json;
pub mod key_value;
pub mod presence;
pub mod profile_list;
pub mod text;

use crate::tools::{OutputFormat, ToolSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One provider record from a presence or profile-list tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFinding {
    pub site: String,
    pub exists: bool,
    pub url: Option<String>,
    pub status: String,
}

/// Findings of one tool: a sequence of site records or a key/value mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolFindings {
    Sites(Vec<SiteFinding>),
    Profile(IndexMap<String, Value>),
}

impl ToolFindings {
    /// Designated empty value for a tool with the given output format.
    pub fn empty_for(format: OutputFormat) -> Self {
        if format.is_mapping() {
            ToolFindings::Profile(IndexMap::new())
        } else {
            ToolFindings::Sites(Vec::new())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ToolFindings::Sites(sites) => sites.len(),
            ToolFindings::Profile(profile) => profile.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Site records flagged as existing. Mappings have no existence flag.
    pub fn positive_count(&self) -> usize {
        match self {
            ToolFindings::Sites(sites) => sites.iter().filter(|s| s.exists).count(),
            ToolFindings::Profile(_) => 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Run the parser selected by the tool's output format over raw stdout.
pub fn normalize(spec: &ToolSpec, stdout: &str) -> Result<ToolFindings, ParseError> {
    let findings = match spec.output {
        OutputFormat::Presence => ToolFindings::Sites(presence::parse(
            stdout,
            &spec.affirmative_keywords,
            &spec.affirmative_markers,
        )),
        OutputFormat::ProfileList => ToolFindings::Sites(profile_list::parse(stdout)),
        OutputFormat::KeyValue => ToolFindings::Profile(key_value::parse(stdout)),
        OutputFormat::Json => ToolFindings::Profile(json::parse(stdout)?),
    };
    Ok(findings)
}
