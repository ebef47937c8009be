//! Prepared-statement registry

use crate::error::SessionError;
use regex::{Captures, Regex};
use sqlmagic_engine::StatementHandle;
use std::collections::HashMap;
use std::sync::OnceLock;

fn marker_pattern() -> &'static Regex {
    static MARKERS: OnceLock<Regex> = OnceLock::new();
    MARKERS.get_or_init(|| Regex::new(r"\?\*(\d+)").expect("static pattern"))
}

/// Most parameter markers one `?*N` may expand to
pub const MAX_PARAMETER_MARKERS: usize = 32_767;

/// Expand `?*N` into `N` comma-separated `?` markers
///
/// `?*0` expands to nothing. A count above [`MAX_PARAMETER_MARKERS`] is
/// rejected before anything is allocated.
pub fn expand_markers(sql: &str) -> Result<String, SessionError> {
    let pattern = marker_pattern();
    let oversized = pattern.captures_iter(sql).find(|caps| {
        caps[1]
            .parse::<usize>()
            .map_or(true, |count| count > MAX_PARAMETER_MARKERS)
    });
    if let Some(caps) = oversized {
        return Err(SessionError::TooManyMarkers {
            count: caps[1].to_string(),
            max: MAX_PARAMETER_MARKERS,
        });
    }

    Ok(pattern
        .replace_all(sql, |caps: &Captures| {
            let count: usize = caps[1].parse().unwrap_or(0);
            vec!["?"; count].join(",")
        })
        .into_owned())
}

/// Statement handles by identifier
///
/// Handles are assumed invalid after a transaction boundary, so COMMIT and
/// ROLLBACK clear the whole table.
#[derive(Debug, Clone, Default)]
pub struct PreparedRegistry {
    handles: HashMap<String, StatementHandle>,
}

impl PreparedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a handle, replacing any handle with the same identifier
    ///
    /// Returns the identifier.
    pub fn insert(&mut self, handle: StatementHandle) -> String {
        let id = handle.id().to_string();
        if self.handles.insert(id.clone(), handle).is_some() {
            tracing::debug!(id = %id, "replaced prepared statement");
        } else {
            tracing::debug!(id = %id, "registered prepared statement");
        }
        id
    }

    pub fn get(&self, id: &str) -> Option<&StatementHandle> {
        self.handles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        if !self.handles.is_empty() {
            tracing::debug!(count = self.handles.len(), "cleared prepared statements");
        }
        self.handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn markers_expand_to_placeholders() {
        assert_eq!(
            expand_markers("INSERT INTO t VALUES (?*2)").unwrap(),
            "INSERT INTO t VALUES (?,?)"
        );
        assert_eq!(
            expand_markers("select * from t where a in (?*3) and b = ?").unwrap(),
            "select * from t where a in (?,?,?) and b = ?"
        );
        assert_eq!(expand_markers("values (?*1, ?*0)").unwrap(), "values (?, )");
    }

    #[test]
    fn oversized_marker_counts_are_rejected() {
        let at_limit = expand_markers(&format!("values (?*{})", MAX_PARAMETER_MARKERS)).unwrap();
        assert_eq!(at_limit.matches('?').count(), MAX_PARAMETER_MARKERS);

        assert_eq!(
            expand_markers("values (?*4000000000)"),
            Err(SessionError::TooManyMarkers {
                count: "4000000000".to_string(),
                max: MAX_PARAMETER_MARKERS,
            })
        );
        assert!(expand_markers("values (?*99999999999999999999999)").is_err());
    }

    #[test]
    fn same_text_replaces_handle() {
        let mut registry = PreparedRegistry::new();
        let first = registry.insert(StatementHandle::new("e", "values ?"));
        let second = registry.insert(StatementHandle::new("e", "values ?"));
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);

        registry.insert(StatementHandle::new("e", "values (?,?)"));
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(!registry.contains(&first));
        assert!(registry.is_empty());
    }
}
