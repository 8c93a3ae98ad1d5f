use crate::cli::Command;
use crate::core::report::ReportFormat;

/// Execution contexts that influence where console logs go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// One-shot commands whose stdout is a human-readable report.
    Cli,
    /// Commands whose stdout is a machine-readable document.
    Quiet,
    /// The long-running HTTP service.
    Server,
}

/// Derive the execution context from the parsed command.
pub fn detect_context(command: &Command) -> ExecutionContext {
    match command {
        Command::Scan(args) if args.format == ReportFormat::Json => ExecutionContext::Quiet,
        Command::Tools(args) if args.format == ReportFormat::Json => ExecutionContext::Quiet,
        Command::Serve(_) => ExecutionContext::Server,
        Command::Scan(_) | Command::Tools(_) | Command::Credentials(_) => ExecutionContext::Cli,
    }
}
