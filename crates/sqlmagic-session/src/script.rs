//! Notebook-style scripts of `%sql` lines and `%%sql` cells
//!
//! ```text
//! %sql -q OPTION MAXROWS 20
//! %%sql define list
//! select tabname from syscat.tables where tabschema = '{^1}'
//! %%sql -e
//! list db2inst1;
//! ```
//!
//! A `%sql` line is one invocation without a cell. A `%%sql` line starts a
//! cell that runs until the next marker. Other lines outside a cell are
//! ignored. Text without any marker is a single cell with an empty line.

use serde::{Deserialize, Serialize};

const LINE_MARKER: &str = "%sql";
const CELL_MARKER: &str = "%%sql";

/// One `%sql` or `%%sql` invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Text after the marker
    pub line: String,

    /// Cell body for `%%sql`
    pub cell: Option<String>,

    /// 1-based line of the marker
    pub line_number: usize,
}

fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(marker)?;
    match rest.chars().next() {
        None => Some(""),
        Some(ch) if ch.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

/// Split a script into invocations
pub fn parse_script(text: &str) -> Vec<Invocation> {
    let mut invocations = Vec::new();
    let mut cell: Option<(Invocation, Vec<&str>)> = None;
    let mut saw_marker = false;

    for (index, line) in text.lines().enumerate() {
        let cell_line = strip_marker(line, CELL_MARKER);
        let line_line = if cell_line.is_none() { strip_marker(line, LINE_MARKER) } else { None };

        if cell_line.is_none() && line_line.is_none() {
            if let Some((_, body)) = cell.as_mut() {
                body.push(line);
            }
            continue;
        }

        saw_marker = true;
        if let Some(open) = cell.take() {
            invocations.push(close_cell(open));
        }

        match (cell_line, line_line) {
            (Some(rest), _) => {
                let invocation = Invocation {
                    line: rest.to_string(),
                    cell: None,
                    line_number: index + 1,
                };
                cell = Some((invocation, Vec::new()));
            }
            (None, Some(rest)) => invocations.push(Invocation {
                line: rest.to_string(),
                cell: None,
                line_number: index + 1,
            }),
            (None, None) => {}
        }
    }

    if let Some(open) = cell.take() {
        invocations.push(close_cell(open));
    }

    if !saw_marker && !text.trim().is_empty() {
        invocations.push(Invocation {
            line: String::new(),
            cell: Some(text.to_string()),
            line_number: 1,
        });
    }

    invocations
}

fn close_cell((mut invocation, body): (Invocation, Vec<&str>)) -> Invocation {
    invocation.cell = Some(body.join("\n"));
    invocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_and_cells() {
        let script = "\
# setup
%sql OPTION MAXROWS 20
%%sql define list
select 1
select 2
%sql -q list
%%sql
values 1;
";
        let got = parse_script(script);
        assert_eq!(got.len(), 4);

        assert_eq!(got[0].line, "OPTION MAXROWS 20");
        assert_eq!(got[0].cell, None);
        assert_eq!(got[0].line_number, 2);

        assert_eq!(got[1].line, "define list");
        assert_eq!(got[1].cell.as_deref(), Some("select 1\nselect 2"));

        assert_eq!(got[2].line, "-q list");
        assert_eq!(got[3].line, "");
        assert_eq!(got[3].cell.as_deref(), Some("values 1;"));
    }

    #[test]
    fn plain_text_is_one_cell() {
        let got = parse_script("select 1;\nselect 2;");
        assert_eq!(
            got,
            vec![Invocation {
                line: String::new(),
                cell: Some("select 1;\nselect 2;".to_string()),
                line_number: 1,
            }]
        );
        assert!(parse_script("  \n").is_empty());
    }

    #[test]
    fn marker_needs_a_word_boundary() {
        let got = parse_script("%sqlx not a marker\n%sql values 1");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].line, "values 1");
    }
}
