use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BIN: &str = "osint-aggregator";

fn install(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

/// Sandbox with its own HOME, log dir, bin dir and an `osint.toml` that only
/// resolves tools from that bin dir.
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("bin")).unwrap();
        fs::create_dir_all(root.path().join("home")).unwrap();
        let config = format!(
            r#"
[execution]
output_dir = "{reports}"

[resolver]
search_paths = ["{bin}"]
include_env_path = false
enable_shell = false
tools_dir = "{tools}"

[logging]
enable_file = false
"#,
            reports = root.path().join("reports").display(),
            bin = root.path().join("bin").display(),
            tools = root.path().join("no-local-tools").display(),
        );
        fs::write(root.path().join("osint.toml"), config).unwrap();
        Self { root }
    }

    fn bin(&self) -> PathBuf {
        self.root.path().join("bin")
    }

    fn install_username_tools(&self) {
        install(
            &self.bin(),
            "sherlock",
            "echo \"[GitHub] Exists: https://github.com/$1\"",
        );
        install(&self.bin(), "maigret", "echo \"[+] Reddit: https://reddit.com/u/$1\"");
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin(BIN).unwrap();
        cmd.current_dir(self.root.path())
            .env("HOME", self.root.path().join("home"))
            .env("OSINT_LOG_DIR", self.root.path().join("logs"))
            .env_remove("GHUNT_TOKEN")
            .env_remove("GHUNT_COOKIES_B64")
            .env_remove("OSINT_OUTPUT_DIR")
            .env_remove("OSINT_EXECUTION_MODE")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin(BIN)
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("tools"))
        .stdout(predicate::str::contains("credentials"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin(BIN)
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(osint_aggregator::VERSION));
}

#[test]
fn test_invalid_email_exits_with_input_error() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["scan", "not-an-email", "--no-file"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not an email address"));
}

#[test]
fn test_scan_prints_json_result() {
    let sandbox = Sandbox::new();
    sandbox.install_username_tools();

    let output = sandbox
        .command()
        .args(["scan", "alice@example.com", "--format", "json", "--no-file"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["identifier"], "alice@example.com");
    assert_eq!(body["companion"], "alice");
    assert_eq!(body["summary"]["tools_succeeded"], 2);
    assert_eq!(body["tools"]["ghunt"]["error_kind"], "tool_unavailable");
    assert!(!sandbox.root.path().join("reports").exists());
}

#[test]
fn test_scan_writes_report_file() {
    let sandbox = Sandbox::new();
    sandbox.install_username_tools();

    sandbox
        .command()
        .args(["scan", "alice@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[ OK ] sherlock: 1 finding(s)"))
        .stdout(predicate::str::contains("Report saved to"));

    let reports: Vec<_> = fs::read_dir(sandbox.root.path().join("reports"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("osint_alice_example.com_"));
    assert!(reports[0].ends_with(".json"));
}

#[test]
fn test_unwritable_report_dir_keeps_scan_exit_code() {
    let sandbox = Sandbox::new();
    sandbox.install_username_tools();
    // A regular file cannot be used as the output directory.
    let blocked = sandbox.root.path().join("osint.toml").join("reports");

    sandbox
        .command()
        .args(["scan", "alice@example.com", "--output-dir"])
        .arg(&blocked)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tools: 2/4 succeeded"))
        .stdout(predicate::str::contains("Report saved to").not())
        .stderr(predicate::str::contains("warning: report not saved"));
}

#[test]
fn test_scan_without_tools_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["scan", "alice@example.com", "--no-file"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Tools: 0/4 succeeded, 4 failed"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["scan", "alice@example.com", "--timeout", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_explicit_config_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["--config", "does-not-exist.toml", "tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_tools_json_status() {
    let sandbox = Sandbox::new();
    sandbox.install_username_tools();

    let output = sandbox
        .command()
        .args(["tools", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let statuses: Value = serde_json::from_slice(&output.stdout).unwrap();
    let statuses = statuses.as_array().unwrap();
    assert_eq!(statuses.len(), 4);
    assert_eq!(statuses[0]["available"], false);
    assert_eq!(statuses[2]["available"], true);
}

#[test]
fn test_credentials_without_environment() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .arg("credentials")
        .assert()
        .success()
        .stdout(predicate::str::contains("GHUNT_TOKEN"));
}

#[test]
fn test_credentials_bootstrap_writes_files() {
    let sandbox = Sandbox::new();
    let dir = sandbox.root.path().join("ghunt-config");
    sandbox
        .command()
        .env("GHUNT_TOKEN", "token-123")
        .env("GHUNT_COOKIES_B64", "eyJTSUQiOiAiYWJjIn0=")
        .args(["credentials", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("tokens.json"));

    let tokens: Value =
        serde_json::from_str(&fs::read_to_string(dir.join("tokens.json")).unwrap()).unwrap();
    assert_eq!(tokens["oauth_token"], "token-123");
    assert_eq!(
        fs::read_to_string(dir.join("cookies.json")).unwrap(),
        "{\"SID\": \"abc\"}"
    );
}
