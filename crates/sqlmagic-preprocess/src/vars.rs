//! `{name}` variable substitution for macro bodies
//!
//! | token     | result                                                   |
//! |-----------|----------------------------------------------------------|
//! | `{name}`  | value of `name`                                          |
//! | `{^name}` | value of `name`, upper-cased                             |
//! | `{*n}`    | values of `n`, `n+1`, ... joined by spaces, until a gap  |
//!
//! An undefined name yields the text `null`; an empty vararg run yields
//! nothing. A `{` without a later `}` ends substitution and the rest of the
//! text is copied verbatim.

use std::collections::HashMap;

/// Text emitted for an undefined variable
pub const UNDEFINED: &str = "null";

/// Named string variables visible to one macro invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    vars: HashMap<String, String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `"0"`..`"n"` to the invocation tokens and `"argc"` to `n`
    pub fn from_tokens(tokens: &[String]) -> Self {
        let mut scope = Self::new();
        for (i, token) in tokens.iter().enumerate() {
            scope.set(i.to_string(), token.clone());
        }
        scope.set("argc", tokens.len().saturating_sub(1).to_string());
        scope
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Replace every `{...}` token in `text` using `scope`
pub fn substitute_vars(text: &str, scope: &Scope) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open + 1..].find('}') else {
            break;
        };
        let close = open + 1 + len;

        out.push_str(&rest[..open]);
        out.push_str(&resolve(&rest[open + 1..close], scope));
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

fn resolve(token: &str, scope: &Scope) -> String {
    if let Some(name) = token.strip_prefix('^') {
        return scope
            .get(name)
            .map(str::to_uppercase)
            .unwrap_or_else(|| UNDEFINED.to_string());
    }

    if let Some(start) = token.strip_prefix('*') {
        // non-numeric start expands to nothing, like a missing argument
        let Ok(start) = start.parse::<usize>() else {
            return String::new();
        };
        return (start..)
            .map_while(|i| scope.get(&i.to_string()))
            .collect::<Vec<_>>()
            .join(" ");
    }

    scope
        .get(token)
        .map(str::to_string)
        .unwrap_or_else(|| UNDEFINED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scope(pairs: &[(&str, &str)]) -> Scope {
        let mut scope = Scope::new();
        for (k, v) in pairs {
            scope.set(*k, *v);
        }
        scope
    }

    #[test]
    fn plain_and_upper() {
        let s = scope(&[("name", "emp")]);
        assert_eq!(substitute_vars("select * from {name}", &s), "select * from emp");
        assert_eq!(substitute_vars("'{^name}'", &s), "'EMP'");
    }

    #[test]
    fn undefined_is_null() {
        let s = Scope::new();
        assert_eq!(substitute_vars("{x} and {^y}", &s), "null and null");
    }

    #[test]
    fn vararg_expansion() {
        let s = scope(&[("0", "CMD"), ("1", "A"), ("2", "B")]);
        assert_eq!(substitute_vars("{*1}", &s), "A B");
        assert_eq!(substitute_vars("{*0}", &s), "CMD A B");
        assert_eq!(substitute_vars("{*3}", &s), "");
        assert_eq!(substitute_vars("[{*x}]", &s), "[]");
    }

    #[test]
    fn malformed_tokens_pass_through() {
        let s = scope(&[("a", "1")]);
        assert_eq!(substitute_vars("{a} then {broken", &s), "1 then {broken");
        assert_eq!(substitute_vars("no braces }", &s), "no braces }");
    }

    #[test]
    fn scope_from_tokens() {
        let tokens: Vec<String> = ["LIST", "TABLES"].iter().map(|s| s.to_string()).collect();
        let s = Scope::from_tokens(&tokens);
        assert_eq!(s.get("0"), Some("LIST"));
        assert_eq!(s.get("1"), Some("TABLES"));
        assert_eq!(s.get("argc"), Some("1"));
        assert_eq!(Scope::from_tokens(&[]).get("argc"), Some("0"));
    }
}
