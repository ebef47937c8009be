//! The `%sql` command session
//!
//! A [`Session`] owns everything that lives across invocations: the macro
//! table, the prepared-statement registry, settings, the status of the last
//! statement and pending messages. Each top-level `%sql` line or `%%sql` cell
//! is handed to [`Session::run`], which extracts flags, expands macros, splits
//! the text into statements and dispatches each one to the query engine.

pub mod error;
pub mod registry;
pub mod outcome;
pub mod help;
pub mod script;
pub mod timer;
pub mod session;

pub use error::SessionError;
pub use registry::{expand_markers, PreparedRegistry, MAX_PARAMETER_MARKERS};
pub use outcome::Outcome;
pub use help::help_text;
pub use script::{parse_script, Invocation};
pub use timer::time_statement;
pub use session::Session;
