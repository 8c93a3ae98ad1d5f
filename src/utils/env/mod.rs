use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Variables forced on every tool process so Python tools flush output
/// immediately, write UTF-8 and skip terminal colors.
pub const TOOL_PROCESS_VARS: &[(&str, &str)] = &[
    ("PYTHONUNBUFFERED", "1"),
    ("PYTHONIOENCODING", "utf-8"),
    ("PYTHONUTF8", "1"),
    ("NO_COLOR", "1"),
];

pub struct EnvManager;

impl EnvManager {
    /// Environment overrides attached to every invocation plan. `passthrough`
    /// is copied verbatim; its values are never inspected.
    pub fn tool_env_vars(passthrough: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut env_vars: BTreeMap<String, String> = TOOL_PROCESS_VARS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (key, value) in passthrough {
            env_vars.insert(key.clone(), value.clone());
        }
        env_vars
    }

    /// Entries of the inherited `PATH`, in order.
    pub fn inherited_path() -> Vec<PathBuf> {
        env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect())
            .unwrap_or_default()
    }

    /// `extra` prepended to the inherited `PATH`, without duplicates.
    pub fn widened_path_entries(extra: &[PathBuf]) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> = Vec::new();
        for dir in extra.iter().cloned().chain(Self::inherited_path()) {
            if !dir.as_os_str().is_empty() && !entries.contains(&dir) {
                entries.push(dir);
            }
        }
        entries
    }

    /// The widened `PATH` as a single string.
    pub fn widened_path(extra: &[PathBuf]) -> String {
        join_entries(&Self::widened_path_entries(extra))
    }
}

fn join_entries(entries: &[PathBuf]) -> String {
    // Entries containing the separator cannot be joined; drop them rather than fail.
    let usable: Vec<&Path> = entries
        .iter()
        .map(PathBuf::as_path)
        .filter(|p| env::join_paths([*p]).is_ok())
        .collect();
    env::join_paths(usable)
        .map(|joined| joined.to_string_lossy().into_owned())
        .unwrap_or_default()
}
