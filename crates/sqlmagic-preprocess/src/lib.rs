//! Statement preprocessing for the `%sql` command language
//!
//! This crate handles:
//! - Leading `-flag` extraction and delimiter-aware statement splitting
//! - `{name}` variable substitution inside macros
//! - `:name` binding substitution with type-aware quoting
//! - The macro interpreter (`if/else/endif`, `var`, `echo`, `exit`, `return`)
//! - CALL argument lists and EXECUTE ... USING value lists

pub use sqlmagic_core::scanner;
pub mod flags;
pub mod splitter;
pub mod vars;
pub mod bindings;
pub mod command;
pub mod macros;
pub mod call_args;

pub use scanner::{QuoteScanner, CharClass};
pub use flags::{extract_flags, Flag, FlagSet};
pub use splitter::{split_statements, strip_comments, Delimiter};
pub use vars::{substitute_vars, Scope};
pub use bindings::{substitute_bindings, BindingEnvironment, Bindings, BindingsBuilder};
pub use command::{classify, remainder, Command};
pub use macros::{tokenize, Macro, MacroError, MacroExpansion, MacroTable};
pub use call_args::{parse_call, parse_using, ArgValue, BindType, CallArgument, CallSpec, UsingValue};
