//! In-memory engine with canned answers
//!
//! `ScriptedEngine` returns predefined result sets without a database.
//! It is used for:
//! - Unit and integration tests of the session dispatcher
//! - Dry runs of notebook scripts from the command line
//! - Simulating driver failures for specific statements
//!
//! Statements are matched after collapsing whitespace and lower-casing, so
//! `SELECT *  FROM emp` and `select * from emp` share one canned answer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut engine = ScriptedEngine::new()
//!     .with_result("select * from emp", employees)
//!     .with_failure("select * from nope", "SQL0204N \"NOPE\" is an undefined name. SQLSTATE=42704 SQLCODE=-204");
//! ```

use crate::engine::{BoundParam, CallOutput, EngineError, QueryEngine, QueryOutput, StatementHandle};
use crate::result::ResultSet;
use sqlmagic_core::Value;
use std::collections::HashMap;

/// Something the engine was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A direct statement; consecutive identical runs are counted once
    Execute { sql: String, times: usize },
    Prepare(String),
    ExecutePrepared { sql: String, params: Vec<BoundParam> },
    Call { name: String, args: Vec<Option<Value>> },
    Commit,
    Rollback,
    Autocommit(bool),
}

/// Engine that answers from tables of canned results
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    /// Canned result sets by normalised statement text
    results: HashMap<String, ResultSet>,

    /// Driver messages to fail with, by normalised statement text
    failures: HashMap<String, String>,

    /// Procedure outputs by upper-cased name
    procedures: HashMap<String, CallOutput>,

    /// Statements that return rows when nothing is registered for them
    row_keywords: Vec<&'static str>,

    events: Vec<EngineEvent>,
    autocommit: bool,
    engine_name: String,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    /// Engine with no canned answers and autocommit on
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            failures: HashMap::new(),
            procedures: HashMap::new(),
            row_keywords: vec!["select", "values", "with"],
            events: Vec::new(),
            autocommit: true,
            engine_name: "scripted".to_string(),
        }
    }

    /// Return `result` whenever `sql` is run, directly or prepared
    pub fn with_result(mut self, sql: &str, result: ResultSet) -> Self {
        self.add_result(sql, result);
        self
    }

    /// Fail `sql` with a driver message
    ///
    /// The message is parsed like real driver text, so include
    /// `SQLSTATE=` and `SQLCODE=` tokens to control the reported status.
    pub fn with_failure(mut self, sql: &str, message: impl Into<String>) -> Self {
        self.add_failure(sql, message);
        self
    }

    /// Register a stored procedure
    pub fn with_procedure(mut self, name: &str, output: CallOutput) -> Self {
        self.procedures.insert(name.to_uppercase(), output);
        self
    }

    /// Set the engine name used in statement identifiers
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.engine_name = name.into();
        self
    }

    pub fn add_result(&mut self, sql: &str, result: ResultSet) {
        self.results.insert(normalize(sql), result);
    }

    pub fn add_failure(&mut self, sql: &str, message: impl Into<String>) {
        self.failures.insert(normalize(sql), message.into());
    }

    /// Everything the engine was asked to do, in order
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Statements run directly, one entry per run of identical statements
    pub fn executed(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Execute { sql, .. } => Some(sql.as_str()),
                EngineEvent::ExecutePrepared { sql, .. } => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    fn answer(&self, sql: &str) -> Result<QueryOutput, EngineError> {
        let key = normalize(sql);
        if let Some(message) = self.failures.get(&key) {
            tracing::debug!(sql = %key, "scripted failure");
            return Err(EngineError::Sql(message.clone()));
        }
        if let Some(result) = self.results.get(&key) {
            return Ok(QueryOutput::Rows(result.clone()));
        }

        let returns_rows = key
            .split_whitespace()
            .next()
            .is_some_and(|first| self.row_keywords.contains(&first));
        Ok(if returns_rows {
            QueryOutput::Rows(ResultSet::default())
        } else {
            QueryOutput::Completed { affected: Some(0) }
        })
    }

    fn record_execute(&mut self, sql: &str) {
        if let Some(EngineEvent::Execute { sql: last, times }) = self.events.last_mut() {
            if last == sql {
                *times += 1;
                return;
            }
        }
        self.events.push(EngineEvent::Execute {
            sql: sql.to_string(),
            times: 1,
        });
    }
}

impl QueryEngine for ScriptedEngine {
    fn name(&self) -> &str {
        &self.engine_name
    }

    fn execute_immediate(&mut self, sql: &str) -> Result<QueryOutput, EngineError> {
        self.record_execute(sql);
        self.answer(sql)
    }

    fn prepare(&mut self, sql: &str) -> Result<StatementHandle, EngineError> {
        self.events.push(EngineEvent::Prepare(sql.to_string()));
        if let Some(message) = self.failures.get(&normalize(sql)) {
            return Err(EngineError::Sql(message.clone()));
        }
        Ok(StatementHandle::new(&self.engine_name, sql))
    }

    fn execute(
        &mut self,
        handle: &StatementHandle,
        params: &[BoundParam],
    ) -> Result<QueryOutput, EngineError> {
        let expected = handle.marker_count();
        if let Some(extra) = params.iter().find(|p| p.position == 0 || p.position > expected) {
            return Err(EngineError::Bind {
                position: extra.position,
                message: format!("statement has {} parameter marker(s)", expected),
            });
        }

        self.events.push(EngineEvent::ExecutePrepared {
            sql: handle.sql().to_string(),
            params: params.to_vec(),
        });
        self.answer(handle.sql())
    }

    fn call_procedure(
        &mut self,
        name: &str,
        args: &[Option<Value>],
    ) -> Result<CallOutput, EngineError> {
        self.events.push(EngineEvent::Call {
            name: name.to_string(),
            args: args.to_vec(),
        });

        let mut output = self
            .procedures
            .get(&name.to_uppercase())
            .cloned()
            .ok_or_else(|| EngineError::ProcedureNotFound(name.to_string()))?;

        // arguments come back unchanged unless the procedure defines outputs
        if output.returned.is_empty() {
            output.returned = args
                .iter()
                .map(|arg| arg.clone().unwrap_or(Value::Null))
                .collect();
        }
        Ok(output)
    }

    fn commit(&mut self) -> Result<(), EngineError> {
        self.events.push(EngineEvent::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), EngineError> {
        self.events.push(EngineEvent::Rollback);
        Ok(())
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), EngineError> {
        self.events.push(EngineEvent::Autocommit(enabled));
        self.autocommit = enabled;
        Ok(())
    }
}

fn normalize(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
