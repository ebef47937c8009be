//! Diagnostic codes and user-visible messages
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Macro interpreter (1xxx)
    /// Message produced by an `echo` line
    MacroEcho,

    /// Message produced by an `exit` line
    MacroExit,

    /// Malformed control line (`if` with too few operands, `var` without a name)
    MacroSyntax,

    /// Comparison operator in an `if` line is not recognised
    MacroUnknownOperator,

    /// An `endif` without a matching `if`
    MacroUnmatchedEndif,

    /// Script ended while `if` blocks were still open
    MacroUnclosedIf,

    /// DEFINE without a macro name
    MacroMissingName,

    // Statement dispatch (2xxx)
    /// EXECUTE referenced an identifier that is not registered
    StatementNotFound,

    /// EXECUTE without a statement identifier
    ExecuteMissingId,

    /// EXECUTE followed by extra tokens but no USING keyword
    ExecuteMissingUsing,

    /// USING clause present but empty
    ExecuteMissingParameters,

    /// A parameter or argument references a binding that does not exist
    UnknownVariable,

    /// Binding a parameter value failed
    BindFailed,

    /// PREPARE without a statement to prepare
    PrepareMissingTarget,

    /// A `?*N` marker asks for more parameters than an engine accepts
    PrepareTooManyMarkers,

    /// OPTION value missing or invalid
    OptionInvalid,

    /// Flag or command recognised but not supported by this dispatcher
    Unsupported,

    // Engine (3xxx)
    /// The query engine reported a failure
    EngineError,

    /// Query produced no rows
    NoRowsFound,

    // General (9xxx)
    /// General informational message
    Info,

    /// General warning message
    Warning,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MacroEcho => "MACRO_ECHO",
            Self::MacroExit => "MACRO_EXIT",
            Self::MacroSyntax => "MACRO_SYNTAX",
            Self::MacroUnknownOperator => "MACRO_UNKNOWN_OPERATOR",
            Self::MacroUnmatchedEndif => "MACRO_UNMATCHED_ENDIF",
            Self::MacroUnclosedIf => "MACRO_UNCLOSED_IF",
            Self::MacroMissingName => "MACRO_MISSING_NAME",
            Self::StatementNotFound => "STATEMENT_NOT_FOUND",
            Self::ExecuteMissingId => "EXECUTE_MISSING_ID",
            Self::ExecuteMissingUsing => "EXECUTE_MISSING_USING",
            Self::ExecuteMissingParameters => "EXECUTE_MISSING_PARAMETERS",
            Self::UnknownVariable => "UNKNOWN_VARIABLE",
            Self::BindFailed => "BIND_FAILED",
            Self::PrepareMissingTarget => "PREPARE_MISSING_TARGET",
            Self::PrepareTooManyMarkers => "PREPARE_TOO_MANY_MARKERS",
            Self::OptionInvalid => "OPTION_INVALID",
            Self::Unsupported => "UNSUPPORTED",
            Self::EngineError => "ENGINE_ERROR",
            Self::NoRowsFound => "NO_ROWS_FOUND",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - processing continued
    Warn,

    /// Error - the statement or macro was aborted
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A user-visible message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Statement text the message refers to (best-effort)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            statement: None,
        }
    }

    /// Shorthand for an error-level diagnostic
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    /// Shorthand for an info-level diagnostic
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    /// Attach the statement the message refers to
    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_code_stability() {
        // Ensure codes are stable strings
        assert_eq!(DiagnosticCode::MacroUnmatchedEndif.as_str(), "MACRO_UNMATCHED_ENDIF");
        assert_eq!(DiagnosticCode::StatementNotFound.as_str(), "STATEMENT_NOT_FOUND");
    }

    #[test]
    fn diagnostic_serialization() {
        let diag = Diagnostic::error(
            DiagnosticCode::StatementNotFound,
            "Prepared statement not found or invalid.",
        )
        .with_statement("EXECUTE abc");

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("STATEMENT_NOT_FOUND"));
        assert!(json.contains("error"));
        assert!(json.contains("EXECUTE abc"));
    }

    #[test]
    fn display_includes_code() {
        let diag = Diagnostic::info(DiagnosticCode::MacroEcho, "hello");
        assert_eq!(diag.to_string(), "[MACRO_ECHO] hello");
        assert!(!diag.is_error());
    }
}
