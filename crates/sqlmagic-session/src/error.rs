//! Errors detected while dispatching a statement

use sqlmagic_core::{Diagnostic, DiagnosticCode, Severity, SqlStatus};
use sqlmagic_engine::EngineError;

/// A statement that could not be run
///
/// Every variant is resolved at the statement boundary: it becomes a
/// diagnostic and a status update, and the session carries on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Prepared statement not found or invalid.")]
    StatementNotFound { id: String },

    #[error("No statement identifier supplied on EXECUTE statement.")]
    ExecuteMissingId,

    #[error("Missing or invalid USING clause on EXECUTE statement.")]
    ExecuteMissingUsing,

    #[error("Missing parameters after the USING clause.")]
    ExecuteMissingParameters,

    #[error("Variable {name} is not defined.")]
    UnknownVariable { name: String },

    #[error("SQL Bind on variable {name} failed.")]
    BindFailed { name: String },

    #[error("No SQL statement supplied on PREPARE.")]
    PrepareMissingTarget,

    #[error("Parameter marker ?*{count} exceeds the limit of {max} markers.")]
    TooManyMarkers { count: String, max: usize },

    #[error("The {flag} option is not supported.")]
    Unsupported { flag: String },

    #[error("{0}")]
    Engine(#[from] EngineError),
}

impl SessionError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::StatementNotFound { .. } => DiagnosticCode::StatementNotFound,
            Self::ExecuteMissingId => DiagnosticCode::ExecuteMissingId,
            Self::ExecuteMissingUsing => DiagnosticCode::ExecuteMissingUsing,
            Self::ExecuteMissingParameters => DiagnosticCode::ExecuteMissingParameters,
            Self::UnknownVariable { .. } => DiagnosticCode::UnknownVariable,
            Self::BindFailed { .. } | Self::Engine(EngineError::Bind { .. }) => {
                DiagnosticCode::BindFailed
            }
            Self::PrepareMissingTarget => DiagnosticCode::PrepareMissingTarget,
            Self::TooManyMarkers { .. } => DiagnosticCode::PrepareTooManyMarkers,
            Self::Unsupported { .. } => DiagnosticCode::Unsupported,
            Self::Engine(_) => DiagnosticCode::EngineError,
        }
    }

    /// Status fields recorded for this failure
    pub fn status(&self) -> SqlStatus {
        match self {
            Self::Engine(e) => e.status(),
            other => SqlStatus::syntax_error(other.to_string()),
        }
    }

    /// Convert to a user-visible diagnostic
    ///
    /// Engine failures are reported with the cleaned-up driver message.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = match self {
            Self::Engine(_) => self.status().sqlerror,
            other => other.to_string(),
        };
        Diagnostic::new(self.code(), Severity::Error, message)
    }
}
