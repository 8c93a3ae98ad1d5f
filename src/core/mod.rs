pub mod aggregator;
pub mod config;
pub mod credentials;
pub mod error;
pub mod report;
pub mod target;
pub mod types;

pub use aggregator::{AggregateResult, Aggregator, CancellationFlag, Summary, ToolReport};
pub use config::{ConfigLoader, OsintConfig};
pub use credentials::CredentialBundle;
pub use error::AppError;
pub use report::{ReportFormat, ReportWriter};
pub use target::Target;
pub use types::*;
