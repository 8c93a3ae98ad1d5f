use crate::{
    cli::args::{CredentialsArgs, ScanArgs, ServeArgs, ToolsArgs},
    core::{
        aggregator::{Aggregator, CancellationFlag},
        config::{ConfigLoader, OsintConfig},
        credentials::{self, CredentialBundle},
        report::{self, ReportFormat, ReportWriter},
        target::Target,
        types::ExecutionMode,
    },
    server,
    tools::status::{self, ToolStatus},
    Result,
};
use anyhow::Context;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

/// Exit code for an identifier that failed validation.
pub const EXIT_INVALID_INPUT: u8 = 2;

fn load_config(path: Option<&Path>) -> Result<OsintConfig> {
    Ok(ConfigLoader::load(path)?)
}

/// Build the aggregator with the credential presence signal from the environment.
fn build_aggregator(config: &OsintConfig) -> Aggregator {
    let bundle = CredentialBundle::from_env();
    let present = bundle.is_present(credentials::default_config_dir().as_deref());
    Aggregator::from_config(config, &bundle.passthrough_env(), present)
}

pub async fn scan(args: ScanArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let target = match Target::email(&args.email) {
        Ok(target) => target,
        Err(err) => {
            eprintln!("error: {}", err.message);
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        }
    };

    let mut config = load_config(config_path)?;
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            eprintln!("error: --timeout must be greater than 0");
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        }
        config.execution.scan_timeout_secs = timeout;
    }
    if args.concurrent {
        config.execution.mode = ExecutionMode::Concurrent;
    }
    if let Some(dir) = &args.output_dir {
        config.execution.output_dir = dir.clone();
    }

    let aggregator = build_aggregator(&config);
    let cancel = CancellationFlag::default();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; remaining tools will not be started");
                cancel.cancel();
            }
        }
    });

    let result = aggregator.aggregate_cancellable(&target, &cancel).await;
    interrupt.abort();
    let exit = if result.any_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };

    match args.format {
        ReportFormat::Text => print!("{}", report::render_text(&result)),
        ReportFormat::Json => println!("{}", report::render_json(&result)?),
    }

    // The scan outcome decides the exit code; a report that cannot be saved
    // is only a warning.
    if !args.no_file {
        match ReportWriter::new(&config.execution.output_dir).write(&result) {
            Ok(path) if args.format == ReportFormat::Text => {
                println!("Report saved to {}", path.display());
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "report not saved");
                eprintln!("warning: report not saved: {}", err.message);
            }
        }
    }

    Ok(exit)
}

pub async fn serve(args: ServeArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let aggregator = Arc::new(build_aggregator(&config));
    server::serve(
        &config.server.address(),
        aggregator,
        config.execution.probe_timeout(),
    )
    .await?;
    Ok(ExitCode::SUCCESS)
}

pub async fn tools(args: ToolsArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let aggregator = build_aggregator(&config);
    let runner = aggregator.runner();
    let statuses = status::probe_all(
        aggregator.catalog(),
        aggregator.resolver(),
        runner.as_ref(),
        config.execution.probe_timeout(),
        aggregator.credentials_present(),
    )
    .await;

    match args.format {
        ReportFormat::Json => {
            let body = serde_json::to_string_pretty(&statuses)
                .context("failed to serialize tool status")?;
            println!("{}", body);
        }
        ReportFormat::Text => print!("{}", render_status_table(&statuses)),
    }
    Ok(ExitCode::SUCCESS)
}

fn render_status_table(statuses: &[ToolStatus]) -> String {
    let mut out = String::new();
    for status in statuses {
        let state = if status.available { "available" } else { "missing" };
        out.push_str(&format!("{:<10} {:<10} {}", status.tool, state, status.method));
        if let Some(version) = &status.version {
            out.push_str(&format!("  {}", version));
        }
        if status.requires_credentials && !status.credentials_present {
            out.push_str("  (credentials not configured)");
        }
        out.push('\n');
    }
    out
}

pub fn credentials(args: CredentialsArgs) -> Result<ExitCode> {
    let bundle = CredentialBundle::from_env();
    if bundle.is_empty() {
        println!(
            "No credentials in the environment; set {} or {} to bootstrap ghunt.",
            credentials::TOKEN_ENV,
            credentials::COOKIES_ENV
        );
        return Ok(ExitCode::SUCCESS);
    }

    let dir = match args.dir {
        Some(dir) => dir,
        None => credentials::default_config_dir().context("$HOME directory unavailable")?,
    };
    let written = bundle.bootstrap(&dir)?;
    for path in &written.written {
        println!("wrote {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
