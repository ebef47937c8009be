//! Option help shown for `%sql ?` and `-h`

use sqlmagic_preprocess::Flag;

const FLAGS: &[(Flag, &str)] = &[
    (Flag::All, "Return every row and ignore the MAXROWS setting"),
    (Flag::Delim, "Separate statements with @ instead of ;"),
    (Flag::Echo, "Show each statement after macro and variable substitution"),
    (Flag::Help, "Show this help"),
    (Flag::PrettyJson, "Parse the first column of each row as a JSON document"),
    (Flag::Json, "Return rows as JSON records keyed by lower-case column name"),
    (Flag::Quiet, "Suppress messages"),
    (Flag::Array, "Return rows as arrays, column names first"),
    (Flag::Time, "Repeat the statement for RUNTIME seconds and report the count"),
    (Flag::Grid, "Show results in a scrollable grid"),
    (Flag::SampleData, "Load the sample tables (not supported)"),
];

/// Help text listing every flag and its spellings
pub fn help_text() -> String {
    let mut text = String::from("SQL Options\n\nFlags precede the statement, e.g. %sql -q -r select * from t\n\n");
    for (flag, description) in FLAGS {
        text.push_str(&format!("{:<16}{}\n", flag.aliases().join(", "), description));
    }
    text
}
