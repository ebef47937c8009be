//! Result sets and the shapes the session can return them in

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Rows returned by a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names as reported by the engine
    pub columns: Vec<String>,

    /// Row values in column order
    pub rows: Vec<Vec<Json>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Json>>) -> Self {
        Self { columns, rows }
    }

    /// Build from column names and rows of anything JSON-convertible
    pub fn from_rows<R, V>(columns: &[&str], rows: R) -> Self
    where
        R: IntoIterator<Item = Vec<V>>,
        V: Into<Json>,
    {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep at most `max` rows; a negative limit keeps everything
    pub fn limited(&self, max: i64) -> Self {
        match usize::try_from(max) {
            Ok(max) if max < self.rows.len() => Self {
                columns: self.columns.clone(),
                rows: self.rows[..max].to_vec(),
            },
            _ => self.clone(),
        }
    }

    /// Rows as arrays, column names first
    pub fn to_array(&self) -> Vec<Vec<Json>> {
        let header = self.columns.iter().cloned().map(Json::String).collect();
        std::iter::once(header).chain(self.rows.iter().cloned()).collect()
    }

    /// Rows as records keyed by lower-cased column name
    pub fn to_records(&self) -> Vec<Map<String, Json>> {
        let keys: Vec<String> = self.columns.iter().map(|c| c.to_lowercase()).collect();
        self.rows
            .iter()
            .map(|row| keys.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    /// First column of each row parsed as a JSON document
    ///
    /// Values that are not valid JSON text are returned unchanged.
    pub fn first_column_json(&self) -> Vec<Json> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .map(|cell| match cell {
                Json::String(text) => serde_json::from_str(text).unwrap_or_else(|_| cell.clone()),
                other => other.clone(),
            })
            .collect()
    }
}
