//! `:name` binding substitution
//!
//! Inlines values from the host's variable namespace into statement text.
//! Text inside string literals is never touched, and a name that does not
//! resolve is left as `:name` so time literals and paths survive unchanged.

use crate::scanner::{CharClass, QuoteScanner};
use sqlmagic_core::value::RAW_HEX_PREFIX;
use sqlmagic_core::Value;
use std::collections::HashMap;

/// Source of values for `:name` references
pub trait BindingEnvironment {
    /// Resolve a bare name (no indexing)
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// In-memory binding environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a binding
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl BindingEnvironment for Bindings {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}

/// Builder for Bindings
pub struct BindingsBuilder {
    bindings: Bindings,
}

impl BindingsBuilder {
    pub fn new() -> Self {
        Self {
            bindings: Bindings::new(),
        }
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.insert(name, value);
        self
    }

    pub fn build(self) -> Bindings {
        self.bindings
    }
}

impl Default for BindingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a reference such as `emp`, `ids[2]` or `row['name']`
pub fn resolve(env: &dyn BindingEnvironment, reference: &str) -> Option<Value> {
    let (base, mut rest) = match reference.find('[') {
        Some(pos) => (&reference[..pos], &reference[pos..]),
        None => (reference, ""),
    };

    let mut value = env.lookup(base)?;
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        value = value.index(&inner[..close])?;
        rest = &inner[close + 1..];
    }
    Some(value)
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '@' | '[' | ']')
}

/// Replace `:name` references outside string literals with literal text
///
/// A reference directly followed by `.` is inlined without quotes, so
/// `:schema.table` produces `EMPSCHEMA.table` rather than `'EMPSCHEMA'.table`.
pub fn substitute_bindings(text: &str, env: &dyn BindingEnvironment) -> String {
    if !text.contains(':') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut scanner = QuoteScanner::new();
    let mut name: Option<String> = None;

    for ch in text.chars() {
        if let Some(current) = name.as_mut() {
            if is_name_char(ch) {
                current.push(ch);
                continue;
            }
        }
        if let Some(current) = name.take() {
            emit(&mut out, &current, ch != '.', env);
        }

        match scanner.classify(ch) {
            CharClass::Plain if ch == ':' => name = Some(String::new()),
            _ => out.push(ch),
        }
    }

    if let Some(current) = name {
        emit(&mut out, &current, true, env);
    }

    out
}

fn emit(out: &mut String, name: &str, quoted: bool, env: &dyn BindingEnvironment) {
    if name.is_empty() || name.starts_with('[') || name.starts_with(']') {
        out.push(':');
        out.push_str(name);
        return;
    }

    match resolve(env, name) {
        Some(value) => {
            tracing::trace!(name, "inlined binding");
            out.push_str(&render(&value, quoted));
        }
        None => {
            out.push(':');
            out.push_str(name);
        }
    }
}

/// Literal SQL text for a value
///
/// Numbers and `0x…` text are bare, other scalars are quoted strings and
/// `Null` is the bare `NULL` keyword.
pub fn render(value: &Value, quoted: bool) -> String {
    match value {
        Value::String(s) if s.starts_with(RAW_HEX_PREFIX) => s.clone(),
        Value::String(s) => quote(s, quoted),
        Value::Map(_) => quote(&value.as_text(), quoted),
        Value::List(items) => items
            .iter()
            .map(render_element)
            .collect::<Vec<_>>()
            .join(","),
        Value::Integer(_) | Value::Float(_) | Value::Raw(_) | Value::Null => value.as_text(),
    }
}

/// List elements are always quoted according to their own type
fn render_element(value: &Value) -> String {
    render(value, true)
}

/// Wrap in single quotes, doubling embedded single quotes
pub fn quote(text: &str, quoted: bool) -> String {
    if quoted {
        format!("'{}'", text.replace('\'', "''"))
    } else {
        text.to_string()
    }
}
