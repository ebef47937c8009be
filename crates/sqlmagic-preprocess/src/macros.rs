//! Macro table and the macro script interpreter
//!
//! A macro is a named script of lines. Control lines are recognised by their
//! first token:
//!
//! | line            | effect                                                  |
//! |-----------------|---------------------------------------------------------|
//! | `# ...`         | comment                                                 |
//! | `if A op B`     | open a conditional level (`= == <= =< >= => <> != < >`) |
//! | `else`          | flip the innermost evaluated level                      |
//! | `endif`         | close a level                                           |
//! | `var NAME v...` | bind NAME to the remaining tokens joined by spaces      |
//! | `echo msg...`   | report an informational message                         |
//! | `exit msg...`   | report an error message and produce no statement        |
//! | `return`        | stop and produce the text collected so far              |
//! | `pass`          | nothing                                                 |
//!
//! Any other active line has its `{...}` variables substituted and is
//! appended to the output. Comparisons are lexicographic on the substituted
//! text.

use crate::scanner::{dequote, CharClass, QuoteScanner};
use crate::vars::{substitute_vars, Scope};
use sqlmagic_core::{Diagnostic, DiagnosticCode, Severity};
use std::collections::HashMap;

/// Errors that abort a macro definition or a macro run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacroError {
    #[error("No command name supplied.")]
    MissingName,

    #[error("Macro {macro_name}: incorrect number of arguments for the if clause.")]
    IfArity { macro_name: String },

    #[error("Macro {macro_name}: unknown comparison operator in the if statement: {operator}")]
    UnknownOperator { macro_name: String, operator: String },

    #[error("Macro {macro_name}: unmatched if/endif pairs.")]
    UnmatchedEndif { macro_name: String },

    #[error("Macro {macro_name}: var requires a variable name.")]
    VarMissingName { macro_name: String },
}

impl MacroError {
    /// Convert to a user-visible diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            Self::MissingName => DiagnosticCode::MacroMissingName,
            Self::IfArity { .. } | Self::VarMissingName { .. } => DiagnosticCode::MacroSyntax,
            Self::UnknownOperator { .. } => DiagnosticCode::MacroUnknownOperator,
            Self::UnmatchedEndif { .. } => DiagnosticCode::MacroUnmatchedEndif,
        };
        Diagnostic::error(code, self.to_string())
    }
}

/// A user-defined macro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    /// Upper-cased name
    pub name: String,

    /// Raw script text
    pub body: String,
}

/// Result of offering a statement to the macro table
#[derive(Debug, Clone, PartialEq)]
pub struct MacroExpansion {
    /// Statement to continue with; empty means nothing further to run
    pub text: String,

    /// Name of the macro that ran, if any
    pub macro_name: Option<String>,

    /// Messages from `echo`, `exit` and interpreter errors
    pub diagnostics: Vec<Diagnostic>,
}

impl MacroExpansion {
    fn passthrough(statement: &str) -> Self {
        Self {
            text: statement.to_string(),
            macro_name: None,
            diagnostics: Vec::new(),
        }
    }

    /// True when a macro replaced the statement
    pub fn expanded(&self) -> bool {
        self.macro_name.is_some()
    }
}

/// Macros of one session, keyed by upper-cased name
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    macros: HashMap<String, Macro>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle `DEFINE name` with the given body; returns the stored name
    ///
    /// Redefining a name replaces the previous script.
    pub fn define(&mut self, header: &str, body: &str) -> Result<String, MacroError> {
        let name = header
            .split_whitespace()
            .nth(1)
            .ok_or(MacroError::MissingName)?
            .to_uppercase();

        tracing::debug!(name = %name, lines = body.lines().count(), "defined macro");
        self.insert(name.clone(), body);
        Ok(name)
    }

    /// Store a macro under `name` (case-folded)
    pub fn insert(&mut self, name: impl Into<String>, body: impl Into<String>) {
        let name = name.into().to_uppercase();
        self.macros.insert(
            name.clone(),
            Macro {
                name,
                body: body.into(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(&name.to_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Defined names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the macro named by the statement's first token, if there is one
    ///
    /// A statement whose first token is not a macro name is returned as is.
    pub fn expand(&self, statement: &str) -> MacroExpansion {
        let tokens = tokenize(statement);
        let Some(first) = tokens.first() else {
            return MacroExpansion::passthrough(statement);
        };

        match self.macros.get(&first.to_uppercase()) {
            Some(found) => {
                tracing::debug!(name = %found.name, args = tokens.len() - 1, "expanding macro");
                Interpreter::new(found, &tokens).run()
            }
            None => MacroExpansion::passthrough(statement),
        }
    }
}

/// Split on whitespace outside quotes; quote characters are kept
pub fn tokenize(text: &str) -> Vec<String> {
    let mut scanner = QuoteScanner::new();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if scanner.classify(ch) == CharClass::Plain && ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

enum Flow {
    Next,
    Return,
    Exit,
}

/// One run of a macro script
struct Interpreter<'a> {
    name: &'a str,
    script: &'a str,
    scope: Scope,
    /// Activity of each open conditional level; index 0 is the script itself
    levels: Vec<bool>,
    /// `if` lines seen, evaluated or not, minus `endif` lines
    if_count: usize,
    output: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Interpreter<'a> {
    fn new(definition: &'a Macro, tokens: &[String]) -> Self {
        Self {
            name: &definition.name,
            script: &definition.body,
            scope: Scope::from_tokens(tokens),
            levels: vec![true],
            if_count: 0,
            output: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn active(&self) -> bool {
        self.levels.last().copied().unwrap_or(false)
    }

    /// Number of evaluated conditional levels currently open
    fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    fn run(mut self) -> MacroExpansion {
        let script = self.script;
        for line in script.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match self.step(line) {
                Ok(Flow::Next) => {}
                Ok(Flow::Return) => return self.finish(),
                Ok(Flow::Exit) => return self.abort(),
                Err(e) => {
                    tracing::debug!(name = %self.name, error = %e, "macro aborted");
                    self.diagnostics.push(e.to_diagnostic());
                    return self.abort();
                }
            }
        }

        if self.depth() > 0 {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::MacroUnclosedIf,
                Severity::Warn,
                format!("Macro {}: {} if block(s) not closed with endif.", self.name, self.depth()),
            ));
        }
        self.finish()
    }

    fn step(&mut self, line: &str) -> Result<Flow, MacroError> {
        let args: Vec<String> = tokenize(line)
            .iter()
            .map(|token| substitute_vars(token, &self.scope))
            .collect();
        let keyword = args.first().map(String::as_str).unwrap_or_default();
        let active = self.active();

        match keyword {
            "if" => {
                self.if_count += 1;
                if active {
                    let holds = self.condition(&args)?;
                    self.levels.push(holds);
                }
            }
            "else" => {
                if self.if_count == self.depth() {
                    if let Some(level) = self.levels.last_mut() {
                        *level = !*level;
                    }
                }
            }
            "endif" => {
                if self.if_count == 0 {
                    return Err(MacroError::UnmatchedEndif {
                        macro_name: self.name.to_string(),
                    });
                }
                self.if_count -= 1;
                if self.if_count < self.depth() {
                    self.levels.pop();
                }
            }
            _ if !active => {}
            "echo" | "exit" => {
                let message = args[1..].join(" ");
                if !message.is_empty() {
                    self.diagnostics.push(if keyword == "echo" {
                        Diagnostic::info(DiagnosticCode::MacroEcho, message)
                    } else {
                        Diagnostic::error(DiagnosticCode::MacroExit, message)
                    });
                }
                if keyword == "exit" {
                    return Ok(Flow::Exit);
                }
            }
            "pass" => {}
            "var" => {
                let name = args.get(1).ok_or_else(|| MacroError::VarMissingName {
                    macro_name: self.name.to_string(),
                })?;
                let value = args[2..].join(" ");
                self.scope.set(name.clone(), value);
            }
            "return" => return Ok(Flow::Return),
            _ => self.output.push(substitute_vars(line, &self.scope)),
        }

        Ok(Flow::Next)
    }

    fn condition(&self, args: &[String]) -> Result<bool, MacroError> {
        if args.len() < 4 {
            return Err(MacroError::IfArity {
                macro_name: self.name.to_string(),
            });
        }

        let left = args[1].as_str();
        let op = args[2].as_str();
        let right = match dequote(&args[3]) {
            inner if inner.len() != args[3].len() => inner.trim(),
            same => same,
        };

        Ok(match op {
            "=" | "==" => left == right,
            "<=" | "=<" => left <= right,
            ">=" | "=>" => left >= right,
            "<>" | "!=" => left != right,
            "<" => left < right,
            ">" => left > right,
            _ => {
                return Err(MacroError::UnknownOperator {
                    macro_name: self.name.to_string(),
                    operator: op.to_string(),
                })
            }
        })
    }

    fn finish(self) -> MacroExpansion {
        MacroExpansion {
            text: self.output.join("\n"),
            macro_name: Some(self.name.to_string()),
            diagnostics: self.diagnostics,
        }
    }

    fn abort(self) -> MacroExpansion {
        MacroExpansion {
            text: String::new(),
            macro_name: Some(self.name.to_string()),
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(name: &str, body: &str) -> MacroTable {
        let mut table = MacroTable::new();
        table.define(&format!("define {}", name), body).unwrap();
        table
    }

    fn messages(expansion: &MacroExpansion) -> Vec<(DiagnosticCode, &str)> {
        expansion
            .diagnostics
            .iter()
            .map(|d| (d.code, d.message.as_str()))
            .collect()
    }

    #[test]
    fn define_requires_a_name() {
        let mut table = MacroTable::new();
        assert_eq!(table.define("DEFINE", "x"), Err(MacroError::MissingName));
        assert_eq!(table.define("DEFINE tables", "x"), Ok("TABLES".to_string()));
        assert!(table.contains("Tables"));
    }

    #[test]
    fn redefinition_overwrites() {
        let mut table = table("m", "select 1");
        table.define("define M", "select 2").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.expand("m").text, "select 2");
    }

    #[test]
    fn unknown_name_passes_through() {
        let table = table("m", "select 1");
        let expansion = table.expand("select * from t");
        assert!(!expansion.expanded());
        assert_eq!(expansion.text, "select * from t");
        assert_eq!(table.expand("").text, "");
    }

    #[test]
    fn positional_arguments_and_argc() {
        let table = table("show", "select '{0}', {argc}, '{^1}', '{*2}' from t");
        let expansion = table.expand("show emp a b");
        assert_eq!(expansion.text, "select 'show', 3, 'EMP', 'a b' from t");
    }

    #[test]
    fn nested_else_belongs_to_inner_if() {
        let body = "if 1 = 1\nif 2 = 3\necho X\nelse\necho Y\nendif\nendif";
        let expansion = table("m", body).expand("m");
        assert_eq!(messages(&expansion), vec![(DiagnosticCode::MacroEcho, "Y")]);
        assert_eq!(expansion.text, "");
    }

    #[test]
    fn else_inside_skipped_block_is_ignored() {
        let body = "if a = b\nif x = x\nselect 1\nelse\nselect 2\nendif\nelse\nselect 3\nendif";
        assert_eq!(table("m", body).expand("m").text, "select 3");
    }

    #[test]
    fn comparison_operators() {
        let cases = [
            ("if b > a", true),
            ("if b < a", false),
            ("if abc <= abd", true),
            ("if abc => abd", false),
            ("if x <> y", true),
            ("if x != x", false),
            ("if 10 < 9", true), // lexicographic
            ("if TABLES == 'TABLES'", true),
        ];
        for (cond, expected) in cases {
            let body = format!("{}\nyes\nelse\nno\nendif", cond);
            let got = table("m", &body).expand("m").text;
            assert_eq!(got, if expected { "yes" } else { "no" }, "{}", cond);
        }
    }

    #[test]
    fn var_binds_and_substitutes() {
        let body = "var syntax Usage: M name\nvar who {^1}\nselect '{who}'\necho {syntax}";
        let expansion = table("m", body).expand("m bob");
        assert_eq!(expansion.text, "select 'BOB'");
        assert_eq!(messages(&expansion), vec![(DiagnosticCode::MacroEcho, "Usage: M name")]);
    }

    #[test]
    fn exit_produces_nothing() {
        let body = "select 1\nif {argc} == 0\nexit missing argument\nendif\nselect 2";
        let expansion = table("m", body).expand("m");
        assert_eq!(expansion.text, "");
        assert!(expansion.expanded());
        assert_eq!(
            messages(&expansion),
            vec![(DiagnosticCode::MacroExit, "missing argument")]
        );

        let expansion = table("m", body).expand("m x");
        assert_eq!(expansion.text, "select 1\nselect 2");
    }

    #[test]
    fn return_stops_with_collected_text() {
        let body = "select *\nfrom t\nif {argc} = 1\nwhere a = {1}\nreturn\nendif\norder by 1";
        assert_eq!(table("m", body).expand("m 5").text, "select *\nfrom t\nwhere a = 5");
        assert_eq!(table("m", body).expand("m").text, "select *\nfrom t\norder by 1");
    }

    #[test]
    fn inactive_control_lines_are_skipped() {
        let body = "if 1 = 2\nvar x set\nexit no\nreturn\nendif\nselect '{x}'";
        let expansion = table("m", body).expand("m");
        assert_eq!(expansion.text, "select 'null'");
        assert!(expansion.diagnostics.is_empty());
    }

    #[test]
    fn unmatched_endif_aborts() {
        let expansion = table("m", "select 1\nendif\nselect 2").expand("m");
        assert_eq!(expansion.text, "");
        assert_eq!(expansion.diagnostics[0].code, DiagnosticCode::MacroUnmatchedEndif);
        assert!(expansion.diagnostics[0].is_error());
    }

    #[test]
    fn malformed_if_aborts() {
        let expansion = table("m", "if a =\nselect 1\nendif").expand("m");
        assert_eq!(expansion.text, "");
        assert_eq!(expansion.diagnostics[0].code, DiagnosticCode::MacroSyntax);

        let expansion = table("m", "if a ~ b\nselect 1\nendif").expand("m");
        assert_eq!(expansion.diagnostics[0].code, DiagnosticCode::MacroUnknownOperator);
    }

    #[test]
    fn unclosed_if_warns_but_keeps_output() {
        let expansion = table("m", "select 1\nif a = a\nselect 2").expand("m");
        assert_eq!(expansion.text, "select 1\nselect 2");
        assert_eq!(expansion.diagnostics[0].code, DiagnosticCode::MacroUnclosedIf);
        assert_eq!(expansion.diagnostics[0].severity, Severity::Warn);
    }

    #[test]
    fn comments_and_pass_are_ignored() {
        let body = "# header\n\n  pass\nselect 1 # not a comment here";
        assert_eq!(table("m", body).expand("m").text, "select 1 # not a comment here");
    }

    #[test]
    fn invocations_do_not_share_state() {
        let table = table("m", "if {1} = a\nvar v first\nendif\nselect '{v}'");
        let first = table.expand("m a");
        assert_eq!(first.text, "select 'first'");
        let again = table.expand("m a");
        assert_eq!(first, again);
        assert_eq!(table.expand("m b").text, "select 'null'");
    }

    #[test]
    fn quoted_arguments_stay_together() {
        let table = table("m", "select {1} from t where {2}");
        assert_eq!(table.expand("m 'a b' \"x = 1\"").text, "select 'a b' from t where \"x = 1\"");
    }

    #[test]
    fn tokenizer_collapses_whitespace() {
        assert_eq!(tokenize("  a \t b  'c  d' "), vec!["a", "b", "'c  d'"]);
    }
}
