#![allow(clippy::result_large_err)]

use super::OsintConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "osint.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with precedence: defaults, config file, environment.
    ///
    /// An explicit path must exist; the implicit `osint.toml` is optional.
    pub fn load(explicit: Option<&Path>) -> Result<OsintConfig, AppError> {
        let config_file = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::new(
                        ErrorCategory::ConfigError,
                        format!("config file {} does not exist", path.display()),
                    )
                    .with_code("CONFIG-001"));
                }
                Self::load_from_file(path)?
            }
            None => Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?,
        };

        let mut config = config_file.unwrap_or_default();
        Self::apply_env_overrides(&mut config)?;
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<OsintConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: OsintConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-002")
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut OsintConfig) -> Result<(), AppError> {
        if let Ok(bind) = env::var("OSINT_BIND") {
            config.server.bind = bind;
        }

        // PORT is what most PaaS hosts inject; OSINT_PORT wins when both are set.
        for key in ["PORT", "OSINT_PORT"] {
            if let Ok(port) = env::var(key) {
                config.server.port = parse_env(key, &port)?;
            }
        }

        if let Ok(timeout) = env::var("OSINT_SCAN_TIMEOUT_SECS") {
            config.execution.scan_timeout_secs = parse_env("OSINT_SCAN_TIMEOUT_SECS", &timeout)?;
        }

        if let Ok(timeout) = env::var("OSINT_PROBE_TIMEOUT_SECS") {
            config.execution.probe_timeout_secs =
                parse_env("OSINT_PROBE_TIMEOUT_SECS", &timeout)?;
        }

        if let Ok(mode) = env::var("OSINT_EXECUTION_MODE") {
            config.execution.mode = mode.parse().map_err(|e: String| {
                AppError::new(ErrorCategory::ConfigError, e).with_code("CONFIG-003")
            })?;
        }

        if let Ok(output_dir) = env::var("OSINT_OUTPUT_DIR") {
            config.execution.output_dir = PathBuf::from(output_dir);
        }

        if let Ok(tools_dir) = env::var("OSINT_TOOLS_DIR") {
            config.resolver.tools_dir = PathBuf::from(tools_dir);
        }

        if let Ok(extra) = env::var("OSINT_EXTRA_PATH") {
            let mut dirs: Vec<PathBuf> = env::split_paths(&extra).collect();
            dirs.append(&mut config.resolver.extra_path);
            config.resolver.extra_path = dirs;
        }

        Ok(())
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "OSINT_BIND - Override the HTTP bind address (default: 0.0.0.0)",
            "PORT / OSINT_PORT - Override the HTTP port (default: 8000)",
            "OSINT_SCAN_TIMEOUT_SECS - Per-tool scan timeout (default: 300)",
            "OSINT_PROBE_TIMEOUT_SECS - Version probe timeout (default: 15)",
            "OSINT_EXECUTION_MODE - sequential or concurrent (default: sequential)",
            "OSINT_OUTPUT_DIR - Directory for JSON reports (default: results)",
            "OSINT_TOOLS_DIR - Directory of local tool checkouts (default: tools)",
            "OSINT_EXTRA_PATH - Extra PATH entries for the shell strategy",
            "GHUNT_TOKEN / GHUNT_COOKIES_B64 - Credential bundle passed through to ghunt",
        ]
    }

    /// Validate configuration values
    pub fn validate_config(config: &OsintConfig) -> Result<(), AppError> {
        if config.server.port == 0 {
            return Err(invalid("server.port must be greater than 0"));
        }

        if config.execution.scan_timeout_secs == 0 {
            return Err(invalid("execution.scan_timeout_secs must be greater than 0"));
        }

        if config.execution.probe_timeout_secs == 0 {
            return Err(invalid(
                "execution.probe_timeout_secs must be greater than 0",
            ));
        }

        if config
            .fallback
            .signatures
            .iter()
            .all(|s| s.trim().is_empty())
        {
            return Err(invalid("fallback.signatures cannot be empty"));
        }

        for name in config.tools.keys() {
            name.parse::<crate::tools::ToolId>()
                .map_err(|e| invalid(&format!("[tools.{}]: {}", name, e)))?;
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value.trim().parse::<T>().map_err(|_| {
        AppError::new(
            ErrorCategory::ConfigError,
            format!("{} has invalid value '{}'", key, value),
        )
        .with_code("CONFIG-003")
    })
}

fn invalid(message: &str) -> AppError {
    AppError::new(ErrorCategory::ConfigError, message.to_string()).with_code("CONFIG-004")
}
