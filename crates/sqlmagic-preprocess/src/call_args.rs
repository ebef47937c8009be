//! CALL argument lists and EXECUTE ... USING value lists

use crate::scanner::{dequote, find_unquoted_with, CharClass, QuoteScanner};
use std::fmt;

/// Formal name or value text used for an omitted part of an argument
pub const NULL_TEXT: &str = "null";

/// Value of one procedure argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Blank slot or the `NULL` keyword
    Null,

    /// Literal text, quotes kept for positional arguments
    Literal(String),

    /// `:name` reference into the binding environment
    Variable(String),
}

impl ArgValue {
    /// Classify raw slot text; only the bare `NULL` keyword is SQL NULL
    fn from_text(text: &str) -> Self {
        if text.is_empty() || text.eq_ignore_ascii_case("null") {
            Self::Null
        } else if let Some(name) = text.strip_prefix(':') {
            Self::Variable(name.to_string())
        } else {
            Self::Literal(text.to_string())
        }
    }

    /// Named values lose their quotes, after classification
    fn dequoted(self) -> Self {
        match self {
            Self::Literal(text) => Self::Literal(dequote(&text).to_string()),
            other => other,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str(NULL_TEXT),
            Self::Literal(text) => f.write_str(text),
            Self::Variable(name) => write!(f, ":{}", name),
        }
    }
}

/// One slot of a CALL argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
    /// Formal name given as `name=value`
    pub name: Option<String>,
    pub value: ArgValue,
}

impl CallArgument {
    /// Textual `(name, value)` form with `"null"` for missing parts
    pub fn pair(&self) -> (String, String) {
        (
            self.name.clone().unwrap_or_else(|| NULL_TEXT.to_string()),
            self.value.to_string(),
        )
    }
}

/// A parsed `name(arg, ...)` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    pub name: String,
    pub args: Vec<CallArgument>,
}

impl CallSpec {
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.args.iter().map(CallArgument::pair).collect()
    }
}

/// Parse `name(arg1, key=arg2, , arg4)`
///
/// The procedure name ends at `(` or whitespace. Commas inside `'...'`,
/// `"..."` and `[...]` do not separate arguments. Parsing stops at the first
/// unquoted `)`; a missing `)` still yields the arguments seen so far.
pub fn parse_call(text: &str) -> CallSpec {
    let text = text.trim();
    let (name, rest) = match text.find(|ch: char| ch == '(' || ch.is_whitespace()) {
        Some(pos) => (&text[..pos], text[pos..].trim_start()),
        None => (text, ""),
    };
    let rest = rest.strip_prefix('(').unwrap_or(rest);

    let mut scanner = QuoteScanner::with_brackets();
    let mut args = Vec::new();
    let mut slot = String::new();

    for ch in rest.chars() {
        let class = scanner.classify(ch);
        match ch {
            ',' if class == CharClass::Plain => {
                args.push(parse_slot(&slot));
                slot.clear();
            }
            ')' if class == CharClass::Plain => break,
            _ => slot.push(ch),
        }
    }
    // `proc()` has no arguments, `proc(a,)` ends with a blank one
    if !slot.trim().is_empty() || !args.is_empty() {
        args.push(parse_slot(&slot));
    }

    tracing::trace!(procedure = name, args = args.len(), "parsed call");
    CallSpec {
        name: name.to_string(),
        args,
    }
}

fn parse_slot(slot: &str) -> CallArgument {
    let slot = slot.trim();
    if slot.is_empty() {
        return CallArgument {
            name: None,
            value: ArgValue::Null,
        };
    }

    match find_unquoted_with(QuoteScanner::with_brackets(), slot, '=') {
        Some(eq) => CallArgument {
            name: Some(slot[..eq].trim().to_string()),
            value: ArgValue::from_text(slot[eq + 1..].trim()).dequoted(),
        },
        None => CallArgument {
            name: None,
            value: ArgValue::from_text(slot),
        },
    }
}

/// SQL type requested with a `name@type` suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindType {
    #[default]
    Char,
    Integer,
    Decimal,
    Binary,
}

impl BindType {
    /// `int/integer`, `dec/decimal`, `bin/binary`; anything else is `Char`
    pub fn parse(text: &str) -> Self {
        match text.to_ascii_lowercase().as_str() {
            "int" | "integer" => Self::Integer,
            "dec" | "decimal" => Self::Decimal,
            "bin" | "binary" => Self::Binary,
            _ => Self::Char,
        }
    }
}

/// One value of an `EXECUTE id USING ...` list
#[derive(Debug, Clone, PartialEq)]
pub enum UsingValue {
    StringLiteral(String),
    Integer(i64),
    Float(f64),
    Variable { name: String, bind_type: BindType },
}

/// Parse `v1, 'text', 3, name@int`, optionally wrapped in parentheses
pub fn parse_using(text: &str) -> Vec<UsingValue> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
        .unwrap_or(trimmed);
    if inner.is_empty() {
        return Vec::new();
    }

    let mut scanner = QuoteScanner::new();
    let mut values = Vec::new();
    let mut current = String::new();
    for ch in inner.chars() {
        if scanner.classify(ch) == CharClass::Plain && ch == ',' {
            values.push(using_value(&current));
            current.clear();
        } else {
            current.push(ch);
        }
    }
    values.push(using_value(&current));

    values
}

fn using_value(text: &str) -> UsingValue {
    let text = text.trim();

    if text.starts_with(['\'', '"']) {
        let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or_default();
        // unterminated literal keeps everything after the opening quote
        let inner = if text.len() >= 2 && text.ends_with(&text[..1]) {
            inner
        } else {
            &text[1..]
        };
        return UsingValue::StringLiteral(inner.to_string());
    }
    if let Ok(n) = text.parse::<i64>() {
        return UsingValue::Integer(n);
    }
    if let Ok(n) = text.parse::<f64>() {
        return UsingValue::Float(n);
    }

    let reference = text.strip_prefix(':').unwrap_or(text);
    let (name, bind_type) = match reference.split_once('@') {
        Some((name, ty)) => (name, BindType::parse(ty)),
        None => (reference, BindType::Char),
    };
    UsingValue::Variable {
        name: name.to_string(),
        bind_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(text: &str) -> Vec<(String, String)> {
        parse_call(text).pairs()
    }

    fn owned(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn quoted_commas_do_not_split() {
        let spec = parse_call("proc(1, 'x,y', k=:v)");
        assert_eq!(spec.name, "proc");
        assert_eq!(
            spec.pairs(),
            owned(&[("null", "1"), ("null", "'x,y'"), ("k", ":v")])
        );
        assert_eq!(spec.args[2].value, ArgValue::Variable("v".to_string()));
    }

    #[test]
    fn blank_slots_are_null() {
        assert_eq!(
            pairs("p(a, , c)"),
            owned(&[("null", "a"), ("null", "null"), ("null", "c")])
        );
        assert_eq!(pairs("p(a,)"), owned(&[("null", "a"), ("null", "null")]));
    }

    #[test]
    fn no_arguments() {
        let spec = parse_call("sysproc.refresh()");
        assert_eq!(spec.name, "sysproc.refresh");
        assert!(spec.args.is_empty());
        assert!(parse_call("refresh").args.is_empty());
        assert_eq!(pairs("p (1)"), owned(&[("null", "1")]));
    }

    #[test]
    fn named_values_are_dequoted() {
        assert_eq!(
            pairs("p(mode = 'a=b', [x,y]=2)"),
            owned(&[("mode", "a=b"), ("[x,y]", "2")])
        );
    }

    #[test]
    fn null_keyword() {
        let spec = parse_call("p(NULL, x=null)");
        assert_eq!(spec.args[0].value, ArgValue::Null);
        assert_eq!(spec.args[1].value, ArgValue::Null);
    }

    #[test]
    fn quoted_null_is_text() {
        let spec = parse_call("p(x='null', y=':v', 'NULL')");
        assert_eq!(spec.args[0].value, ArgValue::Literal("null".to_string()));
        assert_eq!(spec.args[1].value, ArgValue::Literal(":v".to_string()));
        assert_eq!(spec.args[2].value, ArgValue::Literal("'NULL'".to_string()));
    }

    #[test]
    fn equals_inside_brackets_is_not_a_name() {
        assert_eq!(
            pairs("p([a=b], k=[x=y])"),
            owned(&[("null", "[a=b]"), ("k", "[x=y]")])
        );
        assert_eq!(pairs("p([k]=1)"), owned(&[("[k]", "1")]));
    }

    #[test]
    fn unterminated_list_keeps_partial_argument() {
        assert_eq!(pairs("p(1, 'abc"), owned(&[("null", "1"), ("null", "'abc")]));
    }

    #[test]
    fn using_values() {
        assert_eq!(
            parse_using("(12, 'O''x', 1.5, :empno@int, name, amt@decimal, b@bin)"),
            vec![
                UsingValue::Integer(12),
                UsingValue::StringLiteral("O''x".to_string()),
                UsingValue::Float(1.5),
                UsingValue::Variable { name: "empno".to_string(), bind_type: BindType::Integer },
                UsingValue::Variable { name: "name".to_string(), bind_type: BindType::Char },
                UsingValue::Variable { name: "amt".to_string(), bind_type: BindType::Decimal },
                UsingValue::Variable { name: "b".to_string(), bind_type: BindType::Binary },
            ]
        );
    }

    #[test]
    fn using_quoted_commas() {
        assert_eq!(
            parse_using("'a,b', 2"),
            vec![UsingValue::StringLiteral("a,b".to_string()), UsingValue::Integer(2)]
        );
        assert!(parse_using("  ").is_empty());
        assert!(parse_using("()").is_empty());
    }
}
