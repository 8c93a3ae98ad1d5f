pub mod args;
pub mod commands;

pub use args::{CredentialsArgs, ScanArgs, ServeArgs, ToolsArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "osint-aggregator")]
#[command(version = crate::VERSION)]
#[command(about = "Run holehe, ghunt, sherlock and maigret against one target and merge the results")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: `tools` to check what is installed, `credentials` to bootstrap ghunt, then `scan` or `serve`."
)]
pub struct Args {
    /// Path to the config file (default: ./osint.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Scan one email address",
        long_about = "Scan runs every tool against the email (holehe, ghunt) and its username (sherlock, maigret), prints a summary and writes a timestamped JSON report. Exits 0 when at least one tool succeeded, 1 when none did and 2 when the email is invalid.",
        after_help = "Example:\n    osint-aggregator scan alice@example.com --format json --no-file"
    )]
    Scan(ScanArgs),
    #[command(
        about = "Serve the HTTP API",
        long_about = "Serve exposes GET /osint/email, GET /osint/username, GET /tools/status and GET /health.",
        after_help = "Example:\n    osint-aggregator serve --port 8000"
    )]
    Serve(ServeArgs),
    #[command(
        about = "Show which tools are installed",
        long_about = "Tools resolves each tool, runs a short version probe and reports the invocation method that would be used.",
        after_help = "Example:\n    osint-aggregator tools --format json"
    )]
    Tools(ToolsArgs),
    #[command(
        about = "Write ghunt credential files from the environment",
        long_about = "Credentials decodes GHUNT_TOKEN and GHUNT_COOKIES_B64 into tokens.json and cookies.json so ghunt can authenticate.",
        after_help = "Example:\n    GHUNT_TOKEN=... osint-aggregator credentials"
    )]
    Credentials(CredentialsArgs),
}

pub async fn run(args: Args) -> crate::Result<ExitCode> {
    let config = args.config.as_deref();
    match args.command {
        Command::Scan(scan_args) => commands::scan(scan_args, config).await,
        Command::Serve(serve_args) => commands::serve(serve_args, config).await,
        Command::Tools(tools_args) => commands::tools(tools_args, config).await,
        Command::Credentials(cred_args) => commands::credentials(cred_args),
    }
}
