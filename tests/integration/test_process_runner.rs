use osint_aggregator::tools::{
    FailureKind, FallbackController, InvocationMethod, ProcessRunner, TokioProcessRunner, ToolId,
    ToolInvocationPlan,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn sh(method: InvocationMethod, script: &str) -> ToolInvocationPlan {
    ToolInvocationPlan::new(
        method,
        "/bin/sh",
        vec!["-c".to_string(), script.to_string()],
    )
}

fn signatures() -> Vec<String> {
    vec!["no module named".to_string(), "permission denied".to_string()]
}

#[tokio::test]
async fn test_captures_stdout_and_stderr() {
    let plan = sh(InvocationMethod::DirectBinary, "echo found; echo warn >&2");
    let result = TokioProcessRunner.run(&plan, Duration::from_secs(10)).await;
    assert!(result.success);
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout.trim(), "found");
    assert_eq!(result.stderr.trim(), "warn");
    assert_eq!(result.method_used, InvocationMethod::DirectBinary);
    assert!(result.failure.is_none());
}

#[tokio::test]
async fn test_non_zero_exit_is_a_value() {
    let plan = sh(InvocationMethod::Module, "echo partial; exit 3");
    let result = TokioProcessRunner.run(&plan, Duration::from_secs(10)).await;
    assert!(!result.success);
    assert_eq!(result.exit_code, 3);
    assert_eq!(result.failure, Some(FailureKind::NonZeroExit));
    assert_eq!(result.stdout.trim(), "partial");
}

#[tokio::test]
async fn test_timeout_kills_process() {
    let plan = sh(InvocationMethod::DirectBinary, "exec sleep 30");
    let started = Instant::now();
    let result = TokioProcessRunner
        .run(&plan, Duration::from_millis(300))
        .await;
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!result.success);
    assert_eq!(result.exit_code, -1);
    assert!(result.timed_out());
    assert!(result.stderr.contains("timed out"));
}

#[tokio::test]
async fn test_missing_executable() {
    let plan = ToolInvocationPlan::new(
        InvocationMethod::DirectBinary,
        "/nonexistent/osint/holehe",
        vec!["alice@example.com".to_string()],
    );
    let result = TokioProcessRunner.run(&plan, Duration::from_secs(5)).await;
    assert!(!result.success);
    assert_eq!(result.exit_code, -1);
    assert_eq!(result.failure, Some(FailureKind::Spawn));
    assert!(result.stderr.starts_with("executable file not found"));
}

#[tokio::test]
async fn test_cwd_and_env_are_applied() {
    let dir = TempDir::new().unwrap();
    let cwd = dir.path().canonicalize().unwrap();
    let env = BTreeMap::from([("OSINT_PROBE".to_string(), "probe-value".to_string())]);
    let plan = sh(InvocationMethod::LocalScript, "pwd; echo \"$OSINT_PROBE\"")
        .with_cwd(&cwd)
        .with_env(env);
    let result = TokioProcessRunner.run(&plan, Duration::from_secs(10)).await;
    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(lines, vec![cwd.display().to_string().as_str(), "probe-value"]);
}

#[tokio::test]
async fn test_fallback_replaces_broken_primary() {
    let controller = FallbackController::new(Arc::new(TokioProcessRunner), &signatures());
    let primary = sh(
        InvocationMethod::Module,
        "echo \"ModuleNotFoundError: No module named 'sherlock_project'\" >&2; exit 1",
    );
    let secondary = sh(InvocationMethod::LocalScript, "echo '[GitHub] Exists'");

    let result = controller
        .run_with_fallback(
            ToolId::Sherlock,
            &primary,
            Some(&secondary),
            Duration::from_secs(10),
        )
        .await;
    assert!(result.success);
    assert_eq!(result.method_used, InvocationMethod::LocalScript);
    assert_eq!(result.stdout.trim(), "[GitHub] Exists");
}

#[tokio::test]
async fn test_unrelated_failure_does_not_fall_back() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("secondary-ran");
    let controller = FallbackController::new(Arc::new(TokioProcessRunner), &signatures());
    let primary = sh(
        InvocationMethod::DirectBinary,
        "echo 'partial results'; echo 'network unreachable' >&2; exit 1",
    );
    let secondary = sh(
        InvocationMethod::Shell,
        &format!("touch '{}'", marker.display()),
    );

    let result = controller
        .run_with_fallback(
            ToolId::Maigret,
            &primary,
            Some(&secondary),
            Duration::from_secs(10),
        )
        .await;
    assert!(!result.success);
    assert_eq!(result.method_used, InvocationMethod::DirectBinary);
    assert!(result.stderr.contains("network unreachable"));
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_timeout_does_not_fall_back() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("secondary-ran");
    let controller = FallbackController::new(Arc::new(TokioProcessRunner), &signatures());
    let primary = sh(InvocationMethod::DirectBinary, "exec sleep 30");
    let secondary = sh(
        InvocationMethod::Shell,
        &format!("touch '{}'", marker.display()),
    );

    let result = controller
        .run_with_fallback(
            ToolId::Holehe,
            &primary,
            Some(&secondary),
            Duration::from_millis(300),
        )
        .await;
    assert!(result.timed_out());
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_no_plans_means_unavailable() {
    let controller = FallbackController::new(Arc::new(TokioProcessRunner), &signatures());
    let result = controller
        .execute(ToolId::Ghunt, &[], Duration::from_secs(1))
        .await;
    assert!(!result.success);
    assert_eq!(result.failure, Some(FailureKind::Unavailable));
    assert_eq!(result.method_used, InvocationMethod::None);
}
