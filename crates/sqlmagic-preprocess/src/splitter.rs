//! Statement splitting and comment removal

use crate::scanner::{CharClass, QuoteScanner};

/// Statement terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// `;` (default)
    #[default]
    Semicolon,

    /// `@`, for bodies that contain `;` themselves (procedures, triggers)
    At,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Self::Semicolon => ';',
            Self::At => '@',
        }
    }
}

/// Split a block of statements on `delimiter`, ignoring delimiters in quotes
///
/// Each statement is trimmed and empty statements are dropped. A trailing
/// statement without a delimiter is still returned, as is the remainder of an
/// unterminated quote.
pub fn split_statements(text: &str, delimiter: Delimiter) -> Vec<String> {
    let delimiter = delimiter.as_char();
    let mut scanner = QuoteScanner::new();
    let mut statements = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if scanner.classify(ch) == CharClass::Plain && ch == delimiter {
            push_trimmed(&mut statements, &current);
            current.clear();
        } else {
            current.push(ch);
        }
    }
    push_trimmed(&mut statements, &current);

    statements
}

fn push_trimmed(statements: &mut Vec<String>, statement: &str) {
    let trimmed = statement.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

/// Remove `--` comments up to the end of each line
///
/// `--` inside a string literal is kept.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut scanner = QuoteScanner::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let class = scanner.classify(ch);
        if class == CharClass::Plain && ch == '-' && chars.peek() == Some(&'-') {
            // skip to end of line, keep the newline
            for rest in chars.by_ref() {
                if rest == '\n' {
                    out.push('\n');
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }

    out
}
