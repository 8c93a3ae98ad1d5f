//! Credential bundle for the account-lookup tool.
//!
//! The aggregator only ever learns whether credentials are present. Raw
//! values are passed through to the tool environment untouched, and the
//! explicit [`CredentialBundle::bootstrap`] step materializes them as the
//! token and cookie files the tool reads.
#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const TOKEN_ENV: &str = "GHUNT_TOKEN";
pub const COOKIES_ENV: &str = "GHUNT_COOKIES_B64";
pub const TOKENS_FILE: &str = "tokens.json";
pub const COOKIES_FILE: &str = "cookies.json";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialBundle {
    token: Option<String>,
    cookies_b64: Option<String>,
}

impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("cookies_b64", &self.cookies_b64.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Files written by a bootstrap run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootstrapReport {
    pub config_dir: PathBuf,
    pub written: Vec<PathBuf>,
}

impl CredentialBundle {
    pub fn new(token: Option<String>, cookies_b64: Option<String>) -> Self {
        Self {
            token: token.filter(|v| !v.trim().is_empty()),
            cookies_b64: cookies_b64.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(env::var(TOKEN_ENV).ok(), env::var(COOKIES_ENV).ok())
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.cookies_b64.is_none()
    }

    /// Credentials exist either in the bundle or as files already bootstrapped.
    pub fn is_present(&self, config_dir: Option<&Path>) -> bool {
        if !self.is_empty() {
            return true;
        }
        config_dir
            .map(|dir| dir.join(TOKENS_FILE).is_file() || dir.join(COOKIES_FILE).is_file())
            .unwrap_or(false)
    }

    /// Raw variables for the tool process environment.
    pub fn passthrough_env(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        if let Some(token) = &self.token {
            vars.insert(TOKEN_ENV.to_string(), token.clone());
        }
        if let Some(cookies) = &self.cookies_b64 {
            vars.insert(COOKIES_ENV.to_string(), cookies.clone());
        }
        vars
    }

    /// Write `tokens.json` and `cookies.json` into `config_dir`.
    pub fn bootstrap(&self, config_dir: &Path) -> Result<BootstrapReport, AppError> {
        let mut report = BootstrapReport {
            config_dir: config_dir.to_path_buf(),
            written: Vec::new(),
        };
        if self.is_empty() {
            return Ok(report);
        }

        fs::create_dir_all(config_dir).map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!(
                    "failed to create credential directory {}: {}",
                    config_dir.display(),
                    err
                ),
            )
        })?;

        if let Some(token) = &self.token {
            let body = serde_json::to_vec_pretty(&serde_json::json!({ "oauth_token": token }))?;
            let path = config_dir.join(TOKENS_FILE);
            write_private(&path, &body)?;
            report.written.push(path);
        }

        if let Some(cookies) = &self.cookies_b64 {
            let decoded = STANDARD.decode(cookies.trim()).map_err(|err| {
                AppError::new(
                    ErrorCategory::ConfigError,
                    format!("{} is not valid base64: {}", COOKIES_ENV, err),
                )
                .with_code("CRED-001")
            })?;
            let path = config_dir.join(COOKIES_FILE);
            write_private(&path, &decoded)?;
            report.written.push(path);
        }

        tracing::info!(
            dir = %config_dir.display(),
            files = report.written.len(),
            "credential files written"
        );
        Ok(report)
    }
}

/// Default directory the account-lookup tool reads credentials from.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("ghunt"))
}

fn write_private(path: &Path, body: &[u8]) -> Result<(), AppError> {
    fs::write(path, body).map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to write {}: {}", path.display(), err),
        )
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
