use osint_aggregator::core::config::ConfigLoader;
use osint_aggregator::core::types::ExecutionMode;
use osint_aggregator::tools::{OutputFormat, ToolCatalog, ToolId};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_osint_env() {
    for v in &[
        "OSINT_BIND",
        "PORT",
        "OSINT_PORT",
        "OSINT_SCAN_TIMEOUT_SECS",
        "OSINT_PROBE_TIMEOUT_SECS",
        "OSINT_EXECUTION_MODE",
        "OSINT_OUTPUT_DIR",
        "OSINT_TOOLS_DIR",
        "OSINT_EXTRA_PATH",
    ] {
        env::remove_var(v);
    }
}

#[test]
#[serial]
fn test_full_config_file() {
    clear_osint_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("osint.toml");
    fs::write(
        &path,
        r#"
[server]
bind = "127.0.0.1"
port = 9000

[execution]
scan_timeout_secs = 120
probe_timeout_secs = 5
mode = "concurrent"
output_dir = "/tmp/osint-reports"

[resolver]
search_paths = ["/opt/osint/bin"]
include_env_path = false
interpreters = ["python3.11"]
tools_dir = "/srv/tools"
enable_shell = false

[fallback]
signatures = ["no module named"]

[tools.ghunt]
args = ["email", "{target}", "--json"]
output = "json"

[tools.holehe]
affirmative_keywords = ["Registered"]

[logging]
default_level = "debug"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(Some(&path)).unwrap();
    assert_eq!(config.server.address(), "127.0.0.1:9000");
    assert_eq!(config.execution.scan_timeout().as_secs(), 120);
    assert_eq!(config.execution.probe_timeout().as_secs(), 5);
    assert_eq!(config.execution.mode, ExecutionMode::Concurrent);
    assert_eq!(config.execution.output_dir, PathBuf::from("/tmp/osint-reports"));
    assert_eq!(config.resolver.search_paths, vec![PathBuf::from("/opt/osint/bin")]);
    assert!(!config.resolver.include_env_path);
    assert!(!config.resolver.enable_shell);
    assert!(config.resolver.enable_module);
    assert_eq!(config.fallback.signatures, vec!["no module named"]);

    let catalog = ToolCatalog::from_config(&config);
    assert_eq!(catalog.get(ToolId::Ghunt).output, OutputFormat::Json);
    assert_eq!(
        catalog.get(ToolId::Holehe).affirmative_keywords,
        vec!["registered"]
    );
    assert_eq!(catalog.get(ToolId::Sherlock).output, OutputFormat::Presence);
}

#[test]
#[serial]
fn test_defaults_without_file() {
    clear_osint_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.toml");
    fs::write(&path, "").unwrap();

    let config = ConfigLoader::load(Some(&path)).unwrap();
    assert_eq!(config.server.address(), "0.0.0.0:8000");
    assert_eq!(config.execution.scan_timeout_secs, 300);
    assert_eq!(config.execution.mode, ExecutionMode::Sequential);
    assert!(config
        .fallback
        .signatures
        .iter()
        .any(|s| s == "no module named"));
    assert!(config.tools.is_empty());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_osint_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("osint.toml");
    fs::write(&path, "[execution]\noutput_dir = \"from-file\"\n").unwrap();

    env::set_var("OSINT_OUTPUT_DIR", "from-env");
    env::set_var("OSINT_EXECUTION_MODE", "parallel");
    env::set_var("OSINT_EXTRA_PATH", "/first:/second");
    let config = ConfigLoader::load(Some(&path));
    clear_osint_env();
    let config = config.unwrap();

    assert_eq!(config.execution.output_dir, PathBuf::from("from-env"));
    assert_eq!(config.execution.mode, ExecutionMode::Concurrent);
    assert_eq!(config.resolver.extra_path[0], PathBuf::from("/first"));
    assert_eq!(config.resolver.extra_path[1], PathBuf::from("/second"));
}

#[test]
#[serial]
fn test_malformed_file_reports_parse_error() {
    clear_osint_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("osint.toml");
    fs::write(&path, "[server\nport = ").unwrap();
    let err = ConfigLoader::load(Some(&path)).unwrap_err();
    assert_eq!(err.code, "CONFIG-002");
}

#[test]
#[serial]
fn test_invalid_port_from_env() {
    clear_osint_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("osint.toml");
    fs::write(&path, "").unwrap();
    env::set_var("PORT", "eighty");
    let err = ConfigLoader::load(Some(&path)).unwrap_err();
    clear_osint_env();
    assert_eq!(err.code, "CONFIG-003");
    assert!(err.message.contains("PORT"));
}

#[test]
#[serial]
fn test_empty_signature_list_is_rejected() {
    clear_osint_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("osint.toml");
    fs::write(&path, "[fallback]\nsignatures = []\n").unwrap();
    let err = ConfigLoader::load(Some(&path)).unwrap_err();
    assert_eq!(err.code, "CONFIG-004");
}

#[test]
fn test_env_documentation_lists_credentials() {
    let docs = ConfigLoader::env_var_documentation();
    assert!(docs.iter().any(|line| line.contains("GHUNT_TOKEN")));
    assert!(docs.iter().any(|line| line.starts_with("OSINT_SCAN_TIMEOUT_SECS")));
}
