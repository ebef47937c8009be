//! Query engine trait and the values that cross it

use crate::result::ResultSet;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlmagic_core::scanner::{CharClass, QuoteScanner};
use sqlmagic_core::status::UNKNOWN_SQLCODE;
use sqlmagic_core::{SqlStatus, Value};
use std::fmt;

/// Length of a prepared-statement identifier in hex characters
pub const STATEMENT_ID_LEN: usize = 15;

/// Errors reported by a query engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Driver failure; the message carries the vendor text,
    /// e.g. `[IBM][CLI Driver] ... SQLSTATE=42704 SQLCODE=-204`
    #[error("{0}")]
    Sql(String),

    #[error("Statement handle {0} is not valid")]
    InvalidHandle(String),

    #[error("Bind of parameter {position} failed: {message}")]
    Bind { position: usize, message: String },

    #[error("Procedure {0} not found")]
    ProcedureNotFound(String),

    #[error("No connection to the database")]
    NotConnected,
}

impl EngineError {
    /// Status fields extracted from the error message
    ///
    /// A failure never reports a non-negative sqlcode: driver text without a
    /// `SQLCODE=` token and engine-side errors use [`UNKNOWN_SQLCODE`].
    pub fn status(&self) -> SqlStatus {
        match self {
            Self::Sql(message) => {
                let mut status = SqlStatus::from_engine_message(message);
                if status.sqlcode >= 0 {
                    status.sqlcode = UNKNOWN_SQLCODE;
                }
                status
            }
            other => SqlStatus::syntax_error(other.to_string()),
        }
    }
}

/// Handle to a statement prepared by an engine
///
/// The identifier is derived from the engine name and statement text, so
/// preparing the same text twice yields the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementHandle {
    id: String,
    sql: String,
}

impl StatementHandle {
    pub fn new(engine: &str, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let digest = hex::encode(Sha256::digest(format!("{}\n{}", engine, sql).as_bytes()));
        Self {
            id: digest[..STATEMENT_ID_LEN].to_string(),
            sql,
        }
    }

    /// Identifier users pass to `EXECUTE`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Statement text as prepared, markers already expanded
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of `?` parameter markers outside string literals
    pub fn marker_count(&self) -> usize {
        let mut scanner = QuoteScanner::new();
        self.sql
            .chars()
            .filter(|&ch| scanner.classify(ch) == CharClass::Plain && ch == '?')
            .count()
    }
}

impl fmt::Display for StatementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// SQL type a parameter is bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    Char,
    Integer,
    Double,
    Binary,
}

/// One positional parameter for a prepared statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundParam {
    /// 1-based marker position
    pub position: usize,
    pub value: Value,
    pub param_type: ParamType,
}

/// Output of a statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Statement produced a result set (possibly empty)
    Rows(ResultSet),

    /// Statement produced no result set
    Completed { affected: Option<u64> },
}

/// Output of a procedure call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOutput {
    /// First result set, if the procedure returned one
    pub result: Option<ResultSet>,

    /// Values of the arguments after the call (OUT and INOUT parameters)
    pub returned: Vec<Value>,
}

/// A database connection as seen by the session
///
/// Every call blocks until the engine answers. Implementations report all
/// failures as [`EngineError`]; the session converts them to status fields.
pub trait QueryEngine {
    /// Engine name for messages and statement identifiers
    fn name(&self) -> &str;

    /// Run a statement directly
    fn execute_immediate(&mut self, sql: &str) -> Result<QueryOutput, EngineError>;

    /// Prepare a statement with `?` markers
    fn prepare(&mut self, sql: &str) -> Result<StatementHandle, EngineError>;

    /// Run a prepared statement with positional parameters
    fn execute(
        &mut self,
        handle: &StatementHandle,
        params: &[BoundParam],
    ) -> Result<QueryOutput, EngineError>;

    /// Call a stored procedure; `None` arguments are SQL NULL
    fn call_procedure(
        &mut self,
        name: &str,
        args: &[Option<Value>],
    ) -> Result<CallOutput, EngineError>;

    fn commit(&mut self) -> Result<(), EngineError>;

    fn rollback(&mut self) -> Result<(), EngineError>;

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), EngineError>;
}
