//! Leading-keyword classification of a statement

use regex::Regex;
use std::sync::OnceLock;

/// Commands the dispatcher handles itself; everything else goes to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Define,
    Option,
    Commit,
    Rollback,
    Autocommit,
    Prepare,
    Execute,
    Call,
    /// Any other leading keyword (SELECT, INSERT, ...), upper-cased
    Statement(String),
    /// Text does not start with a keyword
    Unknown,
}

impl Command {
    /// The upper-cased leading keyword, if any
    pub fn keyword(&self) -> Option<&str> {
        Some(match self {
            Self::Define => "DEFINE",
            Self::Option => "OPTION",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::Autocommit => "AUTOCOMMIT",
            Self::Prepare => "PREPARE",
            Self::Execute => "EXECUTE",
            Self::Call => "CALL",
            Self::Statement(keyword) => keyword.as_str(),
            Self::Unknown => return None,
        })
    }
}

fn first_word() -> &'static Regex {
    static FIRST_WORD: OnceLock<Regex> = OnceLock::new();
    FIRST_WORD.get_or_init(|| {
        Regex::new(r"^\s*([a-zA-Z]+)(?:\s|$)").expect("static pattern")
    })
}

/// Classify a statement by its first alphabetic word
///
/// The word must be followed by whitespace or the end of the text, so
/// `select*from t` has no command.
pub fn classify(text: &str) -> Command {
    let Some(caps) = first_word().captures(text) else {
        return Command::Unknown;
    };

    let keyword = caps[1].to_uppercase();
    match keyword.as_str() {
        "DEFINE" => Command::Define,
        "OPTION" => Command::Option,
        "COMMIT" => Command::Commit,
        "ROLLBACK" => Command::Rollback,
        "AUTOCOMMIT" => Command::Autocommit,
        "PREPARE" => Command::Prepare,
        "EXECUTE" => Command::Execute,
        "CALL" => Command::Call,
        _ => Command::Statement(keyword),
    }
}

/// Text following the first word, trimmed
pub fn remainder(text: &str) -> &str {
    let trimmed = text.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(pos) => trimmed[pos..].trim(),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_dispatcher_commands() {
        assert_eq!(classify("  prepare insert into t values (?)"), Command::Prepare);
        assert_eq!(classify("Execute s1 using 1"), Command::Execute);
        assert_eq!(classify("CALL p(1)"), Command::Call);
        assert_eq!(classify("commit"), Command::Commit);
        assert_eq!(classify("define LIST"), Command::Define);
    }

    #[test]
    fn other_statements() {
        assert_eq!(classify("select * from t"), Command::Statement("SELECT".to_string()));
        assert_eq!(classify("select*from t"), Command::Unknown);
        assert_eq!(classify("(values 1)"), Command::Unknown);
        assert_eq!(classify(""), Command::Unknown);
        assert_eq!(classify("values 1").keyword(), Some("VALUES"));
    }

    #[test]
    fn remainder_after_keyword() {
        assert_eq!(remainder("  PREPARE  select 1 "), "select 1");
        assert_eq!(remainder("COMMIT"), "");
    }
}
