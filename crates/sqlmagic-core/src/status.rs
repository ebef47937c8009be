//! Error status of the last statement (sqlcode / sqlstate / message)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Code used when the engine failure carried no usable message,
/// and for syntax errors detected by the dispatcher itself
pub const UNKNOWN_SQLCODE: i64 = -99999;

/// Code reported when a query produced no rows
pub const NO_ROWS_SQLCODE: i64 = 100;

/// Status fields of the most recent invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlStatus {
    pub sqlcode: i64,
    pub sqlstate: String,
    pub sqlerror: String,
    /// Wall-clock time of the last invocation
    pub elapsed: Duration,
}

impl Default for SqlStatus {
    fn default() -> Self {
        Self {
            sqlcode: 0,
            sqlstate: "0".to_string(),
            sqlerror: String::new(),
            elapsed: Duration::ZERO,
        }
    }
}

impl SqlStatus {
    /// Parse an engine failure message
    ///
    /// Driver messages look like `[vendor][driver] text SQLSTATE=42704 SQLCODE=-204`.
    /// Everything up to the last `]` is dropped, then the `SQLSTATE=` and
    /// `SQLCODE=` tokens are extracted.
    pub fn from_engine_message(raw: &str) -> Self {
        let message = raw.replace('\r', " ");
        let message = match message.rfind(']') {
            Some(pos) => message[pos + 1..].trim().to_string(),
            None => message.trim().to_string(),
        };

        if message.is_empty() {
            return Self::unknown();
        }

        let sqlstate = token_after(&message, "SQLSTATE=")
            .map(str::to_string)
            .unwrap_or_else(|| "0".to_string());

        let sqlcode = match token_after(&message, "SQLCODE=") {
            Some(code) => code.parse().unwrap_or(UNKNOWN_SQLCODE),
            None => 0,
        };

        Self {
            sqlcode,
            sqlstate,
            sqlerror: message,
            elapsed: Duration::ZERO,
        }
    }

    /// Status for a failure with no usable message
    pub fn unknown() -> Self {
        Self {
            sqlcode: UNKNOWN_SQLCODE,
            sqlstate: UNKNOWN_SQLCODE.to_string(),
            sqlerror: "Unknown error.".to_string(),
            elapsed: Duration::ZERO,
        }
    }

    /// Status for a dispatcher-level syntax error
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self {
            sqlcode: UNKNOWN_SQLCODE,
            sqlstate: "0".to_string(),
            sqlerror: message.into(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.sqlcode >= 0
    }
}

/// Value following `key` up to the next space
fn token_after<'a>(message: &'a str, key: &str) -> Option<&'a str> {
    let start = message.find(key)? + key.len();
    let rest = &message[start..];
    let end = rest.find(' ').unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_driver_message() {
        let status = SqlStatus::from_engine_message(
            "[IBM][CLI Driver][DB2/LINUXX8664] SQL0204N  \"X.T\" is an undefined name.  SQLSTATE=42704 SQLCODE=-204",
        );
        assert_eq!(status.sqlcode, -204);
        assert_eq!(status.sqlstate, "42704");
        assert!(status.sqlerror.starts_with("SQL0204N"));
        assert!(!status.is_ok());
    }

    #[test]
    fn message_without_codes() {
        let status = SqlStatus::from_engine_message("connection lost");
        assert_eq!(status.sqlcode, 0);
        assert_eq!(status.sqlstate, "0");
        assert_eq!(status.sqlerror, "connection lost");
    }

    #[test]
    fn empty_message_is_unknown() {
        let status = SqlStatus::from_engine_message("[driver]  ");
        assert_eq!(status, SqlStatus::unknown());
    }
}
