//! Tagged values crossing the substitution and binding boundary
//!
//! Host bindings are classified once, when they enter the preprocessor,
//! instead of re-guessing their type at every use site.

use serde::{Deserialize, Serialize};

/// Prefix marking a string as raw hexadecimal text that is never quoted
pub const RAW_HEX_PREFIX: &str = "0x";

/// A value taken from the binding environment or a literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Text that is quoted when inlined
    String(String),

    /// Integer, inlined bare
    Integer(i64),

    /// Floating point, inlined bare
    Float(f64),

    /// Sequence, inlined as a comma-joined list
    List(Vec<Value>),

    /// `0x…` hex text, inlined verbatim
    Raw(String),

    /// Record, inlined as quoted JSON text
    Map(serde_json::Map<String, serde_json::Value>),

    /// SQL NULL
    Null,
}

impl Value {
    /// Classify a piece of text: `0x…` is raw, everything else is a string
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.starts_with(RAW_HEX_PREFIX) {
            Self::Raw(text)
        } else {
            Self::String(text)
        }
    }

    /// Infer the type of untyped text (command line, environment)
    ///
    /// Integers and floats become numbers, JSON arrays and objects become
    /// lists and maps, anything else is classified with [`Value::from_text`].
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
                return Self::from(json);
            }
        }
        Self::from_text(text)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }

    /// Unquoted textual form
    pub fn as_text(&self) -> String {
        match self {
            Self::String(s) | Self::Raw(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::List(items) => items
                .iter()
                .map(Value::as_text)
                .collect::<Vec<_>>()
                .join(","),
            Self::Map(map) => serde_json::Value::Object(map.clone()).to_string(),
            Self::Null => "NULL".to_string(),
        }
    }

    /// Look up an element by index (lists) or key (maps)
    ///
    /// Keys may be wrapped in matching quotes: `row['id']`.
    pub fn index(&self, key: &str) -> Option<Value> {
        let key = key.trim();
        match self {
            Self::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
            Self::Map(map) => map.get(strip_quotes(key)).cloned().map(Value::from),
            _ => None,
        }
    }

    /// Convert back to JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) | Self::Raw(s) => serde_json::Value::String(s.clone()),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(map) => serde_json::Value::Object(map.clone()),
            Self::Null => serde_json::Value::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::String(if b { "TRUE" } else { "FALSE" }.to_string()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Self::from_text(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Self::Map(map),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::from_text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::from_text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// Floats keep a fractional part so they never read back as integers
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

fn strip_quotes(s: &str) -> &str {
    for q in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hex_text_is_raw() {
        assert_eq!(Value::from_text("0xFF00"), Value::Raw("0xFF00".to_string()));
        assert_eq!(Value::from_text("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn infer_numbers_and_json() {
        assert_eq!(Value::infer("42"), Value::Integer(42));
        assert_eq!(Value::infer("2.5"), Value::Float(2.5));
        assert_eq!(
            Value::infer("[1, \"a\"]"),
            Value::List(vec![Value::Integer(1), Value::String("a".to_string())])
        );
        assert!(matches!(Value::infer("{\"a\": 1}"), Value::Map(_)));
        assert_eq!(Value::infer("[not json"), Value::String("[not json".to_string()));
    }

    #[test]
    fn float_text_keeps_fraction() {
        assert_eq!(Value::Float(3.0).as_text(), "3.0");
        assert_eq!(Value::Float(0.25).as_text(), "0.25");
    }

    #[test]
    fn index_lists_and_maps() {
        let list = Value::from(json!([10, 20, 30]));
        assert_eq!(list.index("1"), Some(Value::Integer(20)));
        assert_eq!(list.index("7"), None);

        let map = Value::from(json!({"id": 7, "name": "x"}));
        assert_eq!(map.index("'id'"), Some(Value::Integer(7)));
        assert_eq!(map.index("name"), Some(Value::String("x".to_string())));
        assert_eq!(Value::Integer(1).index("0"), None);
    }

    #[test]
    fn json_booleans_are_text() {
        assert_eq!(Value::from(json!(true)), Value::String("TRUE".to_string()));
        assert_eq!(Value::from(json!(false)), Value::String("FALSE".to_string()));
        assert_eq!(Value::from(json!(null)), Value::Null);
    }
}
