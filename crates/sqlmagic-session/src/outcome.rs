//! What a statement hands back to the host

use serde_json::{Map, Value as Json};
use sqlmagic_core::DisplayMode;
use sqlmagic_engine::{CallOutput, ResultSet};

/// Output of one dispatched statement
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Query rows for the host to render
    Rows {
        result: ResultSet,
        display: DisplayMode,
        /// Rows were cut to `maxrows`
        truncated: bool,
    },

    /// `-r`/`-array`: column names in row 0, then the rows
    Array(Vec<Vec<Json>>),

    /// `-json`: one record per row keyed by lower-cased column name
    Records(Vec<Map<String, Json>>),

    /// `-j`: the first column of each row as a JSON document
    Documents(Vec<Json>),

    /// `-t`: iterations completed in `runtime` seconds
    Iterations { count: u64, runtime: u64 },

    /// Identifier of a newly prepared statement
    Prepared(String),

    /// Result of a procedure call
    Call(CallOutput),

    /// Statement ran and returned no rows
    Completed { affected: Option<u64> },

    /// Macro stored by DEFINE
    Defined(String),

    /// Settings listing from `OPTION LIST`
    Settings(String),

    Help(String),
}

impl Outcome {
    /// Counts as visible output, which suppresses "Command completed."
    pub fn is_output(&self) -> bool {
        !matches!(self, Self::Completed { .. } | Self::Defined(_))
    }

    /// JSON form for reports and dry runs
    pub fn to_json(&self) -> Json {
        match self {
            Self::Rows { result, .. } => serde_json::json!({
                "columns": result.columns,
                "rows": result.rows,
            }),
            Self::Array(rows) => serde_json::json!(rows),
            Self::Records(records) => serde_json::json!(records),
            Self::Documents(docs) => Json::Array(docs.clone()),
            Self::Iterations { count, runtime } => {
                serde_json::json!({ "iterations": count, "runtime": runtime })
            }
            Self::Prepared(id) => serde_json::json!({ "prepared": id }),
            Self::Call(output) => serde_json::json!({
                "result": output.result.as_ref().map(|r| serde_json::json!({
                    "columns": r.columns,
                    "rows": r.rows,
                })),
                "returned": output.returned.iter().map(|v| v.to_json()).collect::<Vec<_>>(),
            }),
            Self::Completed { affected } => serde_json::json!({ "affected": affected }),
            Self::Defined(name) => serde_json::json!({ "defined": name }),
            Self::Settings(text) | Self::Help(text) => Json::String(text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completion_is_not_output() {
        assert!(!Outcome::Completed { affected: Some(1) }.is_output());
        assert!(!Outcome::Defined("LIST".to_string()).is_output());
        assert!(Outcome::Prepared("abc".to_string()).is_output());
    }

    #[test]
    fn json_forms() {
        let rows = Outcome::Rows {
            result: ResultSet::from_rows(&["A"], vec![vec![json!(1)]]),
            display: DisplayMode::Table,
            truncated: false,
        };
        assert_eq!(rows.to_json(), json!({"columns": ["A"], "rows": [[1]]}));
        assert_eq!(
            Outcome::Iterations { count: 7, runtime: 1 }.to_json(),
            json!({"iterations": 7, "runtime": 1})
        );
    }
}
