//! Session context and statement dispatch

use crate::error::SessionError;
use crate::help::help_text;
use crate::outcome::Outcome;
use crate::registry::{expand_markers, PreparedRegistry};
use crate::script::parse_script;
use crate::timer::time_statement;
use sqlmagic_core::status::NO_ROWS_SQLCODE;
use sqlmagic_core::{Diagnostic, DiagnosticCode, DisplayMode, Settings, Severity, SqlStatus, Value};
use sqlmagic_engine::{BoundParam, ParamType, QueryEngine, QueryOutput, ResultSet, StatementHandle};
use sqlmagic_preprocess::bindings::resolve;
use sqlmagic_preprocess::scanner::dequote;
use sqlmagic_preprocess::{
    classify, extract_flags, parse_call, parse_using, remainder, split_statements, strip_comments,
    substitute_bindings, ArgValue, BindType, BindingEnvironment, Command, Delimiter, Flag, FlagSet,
    MacroExpansion, MacroTable, UsingValue,
};
use std::time::{Duration, Instant};

type StatementResult = Result<Option<Outcome>, SessionError>;

/// One logical `%sql` session
///
/// Hosts running several kernels create one session per kernel; nothing is
/// shared between sessions.
pub struct Session<E: QueryEngine> {
    engine: E,
    settings: Settings,
    macros: MacroTable,
    registry: PreparedRegistry,
    flags: FlagSet,
    status: SqlStatus,
    messages: Vec<Diagnostic>,
}

impl<E: QueryEngine> Session<E> {
    pub fn new(engine: E) -> Self {
        Self::with_settings(engine, Settings::default())
    }

    pub fn with_settings(engine: E, settings: Settings) -> Self {
        Self {
            engine,
            settings,
            macros: MacroTable::new(),
            registry: PreparedRegistry::new(),
            flags: FlagSet::new(),
            status: SqlStatus::default(),
            messages: Vec::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn registry(&self) -> &PreparedRegistry {
        &self.registry
    }

    /// Flags of the most recent invocation
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Status of the most recent invocation
    pub fn status(&self) -> &SqlStatus {
        &self.status
    }

    /// Messages produced since the last call
    pub fn take_messages(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.messages)
    }

    /// Run every `%%sql define` cell (and any other invocation) of a library
    ///
    /// Returns the number of macros defined by the library.
    pub fn load_macro_library(&mut self, text: &str, env: &dyn BindingEnvironment) -> usize {
        let before = self.macros.len();
        for invocation in parse_script(text) {
            self.run(&invocation.line, invocation.cell.as_deref(), env);
        }
        self.macros.len().saturating_sub(before)
    }

    /// Process one `%sql` line, or a `%%sql` cell with its header line
    pub fn run(&mut self, line: &str, cell: Option<&str>, env: &dyn BindingEnvironment) -> Vec<Outcome> {
        let started = Instant::now();
        self.status = SqlStatus::default();

        let (residual, flags) = extract_flags(line.trim());
        self.flags = flags;
        tracing::debug!(line = %residual, flags = self.flags.len(), cell = cell.is_some(), "run");

        let mut outputs = Vec::new();
        self.dispatch_invocation(&residual, cell, env, &mut outputs);

        self.status.elapsed = started.elapsed();
        outputs
    }

    fn dispatch_invocation(
        &mut self,
        residual: &str,
        cell: Option<&str>,
        env: &dyn BindingEnvironment,
        outputs: &mut Vec<Outcome>,
    ) {
        if self.flags.is_set(Flag::SampleData) {
            self.fail(SessionError::Unsupported {
                flag: "-sampledata".to_string(),
            });
            return;
        }

        let expansion = self.expand(residual);
        if expansion.expanded() && expansion.text.trim().is_empty() {
            return;
        }
        let line = expansion.text.trim().to_string();

        if line == "?" || self.flags.is_set(Flag::Help) {
            outputs.push(Outcome::Help(help_text()));
            return;
        }

        match classify(&line) {
            Command::Define => {
                self.define(&line, cell.unwrap_or_default(), outputs);
                return;
            }
            Command::Option => {
                let text = match cell {
                    Some(body) => format!("{} {}", remainder(&line), body),
                    None => remainder(&line).to_string(),
                };
                self.apply_options(&text, outputs);
                return;
            }
            _ => {}
        }

        let text = if line.is_empty() { cell.unwrap_or_default() } else { line.as_str() };
        if text.trim().is_empty() {
            return;
        }

        let before = outputs.len();
        let folded = strip_comments(text).replace(['\n', '\r'], " ");
        for statement in split_statements(&folded, self.delimiter()) {
            self.run_statement(&statement, env, outputs);
        }

        let produced_output = outputs[before..].iter().any(Outcome::is_output);
        if !produced_output && !self.quiet() && self.status.is_ok() {
            self.info(DiagnosticCode::Info, "Command completed.");
        }
    }

    fn delimiter(&self) -> Delimiter {
        if self.flags.is_set(Flag::Delim) {
            Delimiter::At
        } else {
            Delimiter::Semicolon
        }
    }

    fn quiet(&self) -> bool {
        self.flags.is_set(Flag::Quiet)
    }

    fn expand(&mut self, statement: &str) -> MacroExpansion {
        let expansion = self.macros.expand(statement);
        self.messages.extend(expansion.diagnostics.iter().cloned());
        expansion
    }

    /// Expand macros in one statement, then dispatch what they produced
    fn run_statement(&mut self, statement: &str, env: &dyn BindingEnvironment, outputs: &mut Vec<Outcome>) {
        let expansion = self.expand(statement);
        if !expansion.expanded() {
            self.dispatch_one(statement, env, outputs);
            return;
        }

        // macro output may hold several statements; they are not expanded again
        let folded = expansion.text.replace('\n', " ");
        for piece in split_statements(&folded, self.delimiter()) {
            self.dispatch_one(&piece, env, outputs);
        }
    }

    fn dispatch_one(&mut self, statement: &str, env: &dyn BindingEnvironment, outputs: &mut Vec<Outcome>) {
        match self.dispatch(statement, env) {
            Ok(Some(outcome)) => outputs.push(outcome),
            Ok(None) => {}
            Err(e) => self.fail(e),
        }
    }

    fn dispatch(&mut self, statement: &str, env: &dyn BindingEnvironment) -> StatementResult {
        let command = classify(statement);

        // CALL resolves `:name` arguments itself, as typed values
        let sql = match command {
            Command::Call => statement.to_string(),
            _ => substitute_bindings(statement, env),
        };
        if self.flags.is_set(Flag::Echo) {
            self.messages
                .push(Diagnostic::info(DiagnosticCode::Info, sql.clone()).with_statement(sql.clone()));
        }
        tracing::debug!(command = ?command, sql = %sql, "dispatch");

        match command {
            Command::Commit => self.commit(remainder(&sql)),
            Command::Rollback => self.rollback(),
            Command::Autocommit => self.autocommit(remainder(&sql)),
            Command::Prepare => self.prepare(remainder(&sql)),
            Command::Execute => self.execute_prepared(remainder(&sql), env),
            Command::Call => self.call(remainder(&sql), env),
            Command::Define => {
                let mut outputs = Vec::new();
                self.define(&sql, "", &mut outputs);
                Ok(outputs.pop())
            }
            Command::Option => {
                let mut outputs = Vec::new();
                self.apply_options(remainder(&sql), &mut outputs);
                Ok(outputs.pop())
            }
            Command::Statement(_) | Command::Unknown => self.execute_statement(&sql),
        }
    }

    fn define(&mut self, header: &str, body: &str, outputs: &mut Vec<Outcome>) {
        match self.macros.define(header, body) {
            Ok(name) => outputs.push(Outcome::Defined(name)),
            Err(e) => {
                self.status = SqlStatus::syntax_error(e.to_string());
                self.messages.push(e.to_diagnostic());
            }
        }
    }

    fn apply_options(&mut self, text: &str, outputs: &mut Vec<Outcome>) {
        let outcome = self.settings.apply_options(text);
        for error in outcome.errors {
            self.messages
                .push(Diagnostic::error(DiagnosticCode::OptionInvalid, error.to_string()));
        }
        if let Some(listing) = outcome.listing {
            outputs.push(Outcome::Settings(listing));
        }
        if outcome.changed {
            tracing::debug!(settings = ?self.settings, "options changed");
        }
    }

    fn commit(&mut self, rest: &str) -> StatementResult {
        self.engine.commit()?;
        let hold = rest
            .split_whitespace()
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("HOLD"));
        if !hold {
            self.registry.clear();
        }
        Ok(Some(Outcome::Completed { affected: None }))
    }

    fn rollback(&mut self) -> StatementResult {
        self.engine.rollback()?;
        self.registry.clear();
        Ok(Some(Outcome::Completed { affected: None }))
    }

    fn autocommit(&mut self, rest: &str) -> StatementResult {
        let setting = rest.split_whitespace().next().map(str::to_uppercase);
        match setting.as_deref() {
            Some("ON") => self.engine.set_autocommit(true)?,
            Some("OFF") => self.engine.set_autocommit(false)?,
            _ => return Ok(None),
        }
        Ok(Some(Outcome::Completed { affected: None }))
    }

    fn prepare(&mut self, text: &str) -> StatementResult {
        if text.is_empty() {
            return Err(SessionError::PrepareMissingTarget);
        }

        let sql = expand_markers(text)?;
        let handle = self.engine.prepare(&sql)?;
        let id = self.registry.insert(handle);
        Ok(Some(Outcome::Prepared(id)))
    }

    fn execute_prepared(&mut self, text: &str, env: &dyn BindingEnvironment) -> StatementResult {
        let (id, rest) = split_word(text);
        if id.is_empty() {
            return Err(SessionError::ExecuteMissingId);
        }
        let handle: StatementHandle = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::StatementNotFound { id: id.to_string() })?;

        let params = if rest.is_empty() {
            Vec::new()
        } else {
            let (keyword, values) = split_word(rest);
            if !keyword.eq_ignore_ascii_case("USING") {
                return Err(SessionError::ExecuteMissingUsing);
            }
            let values = parse_using(values);
            if values.is_empty() {
                return Err(SessionError::ExecuteMissingParameters);
            }
            self.bind(&values, env)?
        };

        let output = self.engine.execute(&handle, &params)?;
        Ok(self.shape(output))
    }

    fn bind(&self, values: &[UsingValue], env: &dyn BindingEnvironment) -> Result<Vec<BoundParam>, SessionError> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let (value, param_type) = match value {
                    UsingValue::StringLiteral(s) => (Value::String(s.clone()), ParamType::Char),
                    UsingValue::Integer(n) => (Value::Integer(*n), ParamType::Integer),
                    UsingValue::Float(f) => (Value::Float(*f), ParamType::Double),
                    UsingValue::Variable { name, bind_type } => {
                        if name.is_empty() {
                            return Err(SessionError::BindFailed { name: name.clone() });
                        }
                        let value = resolve(env, name)
                            .ok_or_else(|| SessionError::UnknownVariable { name: name.clone() })?;
                        (value, sql_type(*bind_type))
                    }
                };
                Ok(BoundParam {
                    position: i + 1,
                    value,
                    param_type,
                })
            })
            .collect()
    }

    fn call(&mut self, text: &str, env: &dyn BindingEnvironment) -> StatementResult {
        let spec = parse_call(text);
        let args = spec
            .args
            .iter()
            .map(|arg| match &arg.value {
                ArgValue::Null => Ok(None),
                ArgValue::Variable(name) => resolve(env, name)
                    .map(Some)
                    .ok_or_else(|| SessionError::UnknownVariable { name: name.clone() }),
                ArgValue::Literal(text) => Ok(Some(Value::String(dequote(text).to_string()))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut output = self.engine.call_procedure(&spec.name, &args)?;
        if !self.flags.is_set(Flag::All) {
            output.result = output.result.map(|r| r.limited(self.settings.maxrows));
        }
        Ok(Some(Outcome::Call(output)))
    }

    fn execute_statement(&mut self, sql: &str) -> StatementResult {
        if self.flags.is_set(Flag::Time) {
            let runtime = self.settings.runtime;
            let count = time_statement(&mut self.engine, sql, Duration::from_secs(runtime))?;
            if !self.quiet() {
                self.info(
                    DiagnosticCode::Info,
                    format!("Total iterations in {} second(s): {}", runtime, count),
                );
            }
            return Ok(Some(Outcome::Iterations { count, runtime }));
        }

        let output = self.engine.execute_immediate(sql)?;
        Ok(self.shape(output))
    }

    /// Turn engine output into what the flags ask for
    fn shape(&mut self, output: QueryOutput) -> Option<Outcome> {
        let result = match output {
            QueryOutput::Rows(result) => result,
            QueryOutput::Completed { affected } => return Some(Outcome::Completed { affected }),
        };

        let shaped = self.flags.is_set(Flag::PrettyJson)
            || self.flags.is_set(Flag::Array)
            || self.flags.is_set(Flag::Json);

        if result.is_empty() {
            self.status.sqlcode = NO_ROWS_SQLCODE;
            if !self.quiet() {
                self.messages.push(Diagnostic::new(
                    DiagnosticCode::NoRowsFound,
                    Severity::Warn,
                    "No rows found.",
                ));
            }
            if !shaped {
                return None;
            }
        }

        Some(if self.flags.is_set(Flag::PrettyJson) {
            Outcome::Documents(result.first_column_json())
        } else if self.flags.is_set(Flag::Array) {
            Outcome::Array(result.to_array())
        } else if self.flags.is_set(Flag::Json) {
            Outcome::Records(result.to_records())
        } else {
            self.rows(result)
        })
    }

    fn rows(&self, result: ResultSet) -> Outcome {
        let display = if self.flags.is_set(Flag::Grid) {
            DisplayMode::Grid
        } else {
            self.settings.display
        };
        let unlimited =
            display == DisplayMode::Grid || self.flags.is_set(Flag::All) || self.settings.maxrows < 0;

        if unlimited {
            return Outcome::Rows {
                result,
                display,
                truncated: false,
            };
        }
        let limited = result.limited(self.settings.maxrows);
        Outcome::Rows {
            truncated: limited.len() < result.len(),
            result: limited,
            display,
        }
    }

    fn info(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.messages.push(Diagnostic::info(code, message));
    }

    /// Record a failed statement; quiet mode hides engine failures only
    fn fail(&mut self, error: SessionError) {
        tracing::warn!(error = %error, "statement failed");
        self.status = error.status();
        if matches!(error, SessionError::Engine(_)) && self.quiet() {
            return;
        }
        self.messages.push(error.to_diagnostic());
    }
}

/// First whitespace-delimited word and the trimmed rest
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (text, ""),
    }
}

fn sql_type(bind_type: BindType) -> ParamType {
    match bind_type {
        BindType::Char => ParamType::Char,
        BindType::Integer => ParamType::Integer,
        BindType::Decimal => ParamType::Double,
        BindType::Binary => ParamType::Binary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sqlmagic_engine::{EngineEvent, ScriptedEngine};
    use sqlmagic_preprocess::{Bindings, BindingsBuilder};

    fn employees() -> ResultSet {
        ResultSet::from_rows(
            &["EMPNO", "LASTNAME"],
            (1..=12).map(|i| vec![json!(i * 10), json!(format!("EMP{}", i))]),
        )
    }

    fn session() -> Session<ScriptedEngine> {
        Session::new(ScriptedEngine::new().with_result("select * from emp", employees()))
    }

    fn codes(session: &mut Session<ScriptedEngine>) -> Vec<DiagnosticCode> {
        session.take_messages().into_iter().map(|d| d.code).collect()
    }

    #[test]
    fn plain_query_is_limited_to_maxrows() {
        let mut session = session();
        let out = session.run("select * from emp", None, &Bindings::new());
        match &out[..] {
            [Outcome::Rows { result, display, truncated }] => {
                assert_eq!(result.len(), 10);
                assert_eq!(*display, DisplayMode::Table);
                assert!(truncated);
            }
            other => panic!("unexpected {:?}", other),
        }

        let out = session.run("-a select * from emp", None, &Bindings::new());
        assert!(matches!(&out[..], [Outcome::Rows { result, truncated: false, .. }] if result.len() == 12));
    }

    #[test]
    fn grid_shows_every_row() {
        let mut session = session();
        let out = session.run("-grid select * from emp", None, &Bindings::new());
        assert!(matches!(
            &out[..],
            [Outcome::Rows { display: DisplayMode::Grid, truncated: false, .. }]
        ));
    }

    #[test]
    fn result_shapes_follow_flags() {
        let mut session = session();
        let out = session.run("-r select * from emp", None, &Bindings::new());
        let Outcome::Array(rows) = &out[0] else { panic!("expected array") };
        assert_eq!(rows[0], vec![json!("EMPNO"), json!("LASTNAME")]);
        assert_eq!(rows.len(), 13);

        let out = session.run("-json select * from emp", None, &Bindings::new());
        let Outcome::Records(records) = &out[0] else { panic!("expected records") };
        assert_eq!(json!(records[0]), json!({"empno": 10, "lastname": "EMP1"}));
    }

    #[test]
    fn empty_result_sets_sqlcode_100() {
        let mut session = session();
        let out = session.run("select * from nothing", None, &Bindings::new());
        assert!(out.is_empty());
        assert_eq!(session.status().sqlcode, NO_ROWS_SQLCODE);
        assert_eq!(codes(&mut session), vec![DiagnosticCode::NoRowsFound, DiagnosticCode::Info]);

        session.run("-q select * from nothing", None, &Bindings::new());
        assert!(session.take_messages().is_empty());
    }

    #[test]
    fn engine_failure_sets_status() {
        let mut session = Session::new(
            ScriptedEngine::new().with_failure("select * from nope", "[X][Y] SQL0204N bad SQLSTATE=42704 SQLCODE=-204"),
        );
        session.run("select * from nope", None, &Bindings::new());
        assert_eq!(session.status().sqlcode, -204);
        assert_eq!(session.status().sqlstate, "42704");
        let messages = session.take_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].code, DiagnosticCode::EngineError);

        session.run("-q select * from nope", None, &Bindings::new());
        assert!(session.take_messages().is_empty());
        assert_eq!(session.status().sqlcode, -204);
    }

    #[test]
    fn status_resets_each_run() {
        let mut session = session();
        session.run("select * from nothing", None, &Bindings::new());
        session.run("delete from t", None, &Bindings::new());
        assert_eq!(session.status().sqlcode, 0);
    }

    #[test]
    fn command_completed_when_nothing_shown() {
        let mut session = session();
        let out = session.run("", Some("delete from t;\ninsert into t values (1);"), &Bindings::new());
        assert_eq!(out.len(), 2);
        let messages = session.take_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "Command completed.");
    }

    #[test]
    fn line_wins_over_cell() {
        let mut session = session();
        session.run("delete from a", Some("delete from b"), &Bindings::new());
        assert_eq!(session.engine().executed(), vec!["delete from a"]);
    }

    #[test]
    fn comments_and_newlines_are_folded() {
        let mut session = session();
        session.run(
            "",
            Some("delete -- remove everything\nfrom t\nwhere c = '--x'"),
            &Bindings::new(),
        );
        assert_eq!(session.engine().executed(), vec!["delete  from t where c = '--x'"]);
    }

    #[test]
    fn bindings_are_inlined() {
        let mut session = session();
        let env = BindingsBuilder::new().var("empno", 10_i64).var("name", "O'Neil").build();
        session.run("update emp set lastname = :name where empno = :empno", None, &env);
        assert_eq!(
            session.engine().executed(),
            vec!["update emp set lastname = 'O''Neil' where empno = 10"]
        );
    }

    #[test]
    fn echo_reports_substituted_text() {
        let mut session = session();
        let env = BindingsBuilder::new().var("n", 3_i64).build();
        session.run("-e delete from t where id = :n", None, &env);
        let messages = session.take_messages();
        assert_eq!(messages[0].message, "delete from t where id = 3");
    }

    #[test]
    fn help_and_question_mark() {
        let mut session = session();
        assert!(matches!(&session.run("?", None, &Bindings::new())[..], [Outcome::Help(_)]));
        assert!(matches!(&session.run("-h", None, &Bindings::new())[..], [Outcome::Help(_)]));
        assert!(session.engine().events().is_empty());
    }

    #[test]
    fn sampledata_is_unsupported() {
        let mut session = session();
        assert!(session.run("-sampledata", None, &Bindings::new()).is_empty());
        assert_eq!(codes(&mut session), vec![DiagnosticCode::Unsupported]);
    }

    #[test]
    fn options_change_settings() {
        let mut session = session();
        session.run("OPTION MAXROWS 3 DISPLAY GRID", None, &Bindings::new());
        assert_eq!(session.settings().maxrows, 3);
        assert_eq!(session.settings().display, DisplayMode::Grid);

        let out = session.run("option list", None, &Bindings::new());
        assert!(matches!(&out[..], [Outcome::Settings(text)] if text.contains("MAXROWS")));

        session.run("option maxrows lots", None, &Bindings::new());
        assert_eq!(codes(&mut session), vec![DiagnosticCode::OptionInvalid]);
        assert_eq!(session.settings().maxrows, 3);
    }

    #[test]
    fn timer_reports_iterations() {
        let mut session = session();
        session.run("option runtime 0", None, &Bindings::new());
        let out = session.run("-t values 1", None, &Bindings::new());
        assert_eq!(out, vec![Outcome::Iterations { count: 0, runtime: 0 }]);
        assert_eq!(session.take_messages()[0].message, "Total iterations in 0 second(s): 0");
    }

    #[test]
    fn define_uses_cell_body() {
        let mut session = session();
        let out = session.run("define emps", Some("select * from emp"), &Bindings::new());
        assert_eq!(out, vec![Outcome::Defined("EMPS".to_string())]);

        let out = session.run("-r emps", None, &Bindings::new());
        assert!(matches!(&out[..], [Outcome::Array(rows)] if rows.len() == 13));
        assert!(session.flags().is_set(Flag::Array));
    }

    #[test]
    fn define_without_name() {
        let mut session = session();
        session.run("define", Some("select 1"), &Bindings::new());
        assert_eq!(codes(&mut session), vec![DiagnosticCode::MacroMissingName]);
        assert!(session.macros().is_empty());
    }

    #[test]
    fn macro_exit_suppresses_statement() {
        let mut session = session();
        session.run("define guard", Some("if {argc} = 0\nexit need a table\nendif\ndelete from {1}"), &Bindings::new());
        session.run("guard", None, &Bindings::new());
        assert!(session.engine().executed().is_empty());
        assert_eq!(codes(&mut session), vec![DiagnosticCode::MacroExit]);

        session.run("guard t", None, &Bindings::new());
        assert_eq!(session.engine().executed(), vec!["delete from t"]);
    }

    #[test]
    fn commit_hold_keeps_prepared_statements() {
        let mut session = session();
        let out = session.run("prepare values ?", None, &Bindings::new());
        let Outcome::Prepared(id) = &out[0] else { panic!("expected id") };

        session.run("commit hold", None, &Bindings::new());
        assert!(session.registry().contains(id));

        session.run("rollback", None, &Bindings::new());
        assert!(session.registry().is_empty());
    }

    #[test]
    fn autocommit_switch() {
        let mut session = session();
        session.run("autocommit off", None, &Bindings::new());
        assert!(!session.engine().autocommit());
        session.run("autocommit maybe", None, &Bindings::new());
        assert!(!session.engine().autocommit());
        assert_eq!(session.engine().events(), &[EngineEvent::Autocommit(false)]);
    }

    #[test]
    fn macro_library_loads_define_cells() {
        let mut session = session();
        let library = "%%sql define one\nvalues 1\n%%sql define two\nvalues 2\n";
        assert_eq!(session.load_macro_library(library, &Bindings::new()), 2);
        assert_eq!(session.macros().names(), vec!["ONE", "TWO"]);
    }
}
