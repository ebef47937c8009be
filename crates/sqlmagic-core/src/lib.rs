//! sqlmagic core
//!
//! Shared domain types for the statement preprocessor and its dispatcher.
//! Never rename diagnostic codes - they are part of the public API.

pub mod diagnostic;
pub mod value;
pub mod scanner;
pub mod status;
pub mod config;
pub mod report;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use value::Value;
pub use status::SqlStatus;
pub use config::{Settings, DisplayMode, ConfigError, OptionsOutcome};
pub use report::{RunReport, ReportVersion, ReportSummary};
