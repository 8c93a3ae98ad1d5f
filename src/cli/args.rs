use crate::core::report::ReportFormat;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Email address to investigate; the part before '@' is used as the username
    #[arg(value_name = "EMAIL")]
    pub email: String,

    /// How to print the result on stdout
    #[arg(long, value_enum, default_value_t = ReportFormat::Text, help_heading = "Output Options")]
    pub format: ReportFormat,

    /// Do not write the timestamped JSON report file
    #[arg(long, help_heading = "Output Options")]
    pub no_file: bool,

    /// Directory receiving the JSON report (default: execution.output_dir)
    #[arg(long, value_name = "DIR", help_heading = "Output Options")]
    pub output_dir: Option<PathBuf>,

    /// Run the four tools concurrently instead of one after another
    #[arg(long, help_heading = "Execution")]
    pub concurrent: bool,

    /// Per-tool timeout in seconds (default: execution.scan_timeout_secs)
    #[arg(long, value_name = "SECONDS", help_heading = "Execution")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind (default: server.bind)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Port to listen on (default: server.port)
    #[arg(long, short = 'p', value_name = "PORT")]
    pub port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
pub struct ToolsArgs {
    /// How to print tool availability
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Args, Debug, Clone)]
pub struct CredentialsArgs {
    /// Directory receiving tokens.json and cookies.json (default: ~/.config/ghunt)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}
