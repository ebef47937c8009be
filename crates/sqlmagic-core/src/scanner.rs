//! Quote-aware character scanner
//!
//! Every component that splits or tokenizes statement text drives this state
//! machine, so delimiters, brackets and `=` signs inside string literals are
//! never treated as structure.

/// How a character relates to the quoting state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Character opened a quoted region
    Open,

    /// Character closed the current quoted region
    Close,

    /// Character is inside a quoted region
    Quoted,

    /// Character is outside any quoted region
    Plain,
}

impl CharClass {
    /// True for the characters of a quoted region, including its delimiters
    pub fn is_quoted(self) -> bool {
        !matches!(self, Self::Plain)
    }
}

/// Single-pass quote tracker
///
/// `"` and `'` open a region closed by the same character. When bracket
/// quoting is enabled (call-argument contexts) `[` opens a region closed by `]`.
#[derive(Debug, Clone, Default)]
pub struct QuoteScanner {
    close: Option<char>,
    brackets: bool,
}

impl QuoteScanner {
    /// Scanner recognising `"` and `'`
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner that additionally treats `[ ... ]` as a quoted region
    pub fn with_brackets() -> Self {
        Self {
            close: None,
            brackets: true,
        }
    }

    /// Currently inside a quoted region
    pub fn in_quote(&self) -> bool {
        self.close.is_some()
    }

    /// Feed one character and classify it
    pub fn classify(&mut self, ch: char) -> CharClass {
        match self.close {
            Some(close) if ch == close => {
                self.close = None;
                CharClass::Close
            }
            Some(_) => CharClass::Quoted,
            None => match ch {
                '"' | '\'' => {
                    self.close = Some(ch);
                    CharClass::Open
                }
                '[' if self.brackets => {
                    self.close = Some(']');
                    CharClass::Open
                }
                _ => CharClass::Plain,
            },
        }
    }
}

/// Find the first occurrence of `target` outside `'` and `"` quotes
pub fn find_unquoted(text: &str, target: char) -> Option<usize> {
    find_unquoted_with(QuoteScanner::new(), text, target)
}

/// Find the first occurrence of `target` that `scanner` classifies as plain
pub fn find_unquoted_with(mut scanner: QuoteScanner, text: &str, target: char) -> Option<usize> {
    text.char_indices()
        .find(|&(_, ch)| scanner.classify(ch) == CharClass::Plain && ch == target)
        .map(|(pos, _)| pos)
}

/// Strip one pair of matching surrounding quotes
pub fn dequote(text: &str) -> &str {
    for q in ['\'', '"'] {
        if text.len() >= 2 {
            if let Some(inner) = text.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)) {
                return inner;
            }
        }
    }
    text
}
