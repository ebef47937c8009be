//! Query-engine boundary for the `%sql` session
//!
//! The session never talks to a database directly. It goes through the
//! [`QueryEngine`] trait, which a driver implements for a real connection.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlmagic_engine::{QueryEngine, ResultSet, ScriptedEngine};
//!
//! let mut engine = ScriptedEngine::new()
//!     .with_result("select * from emp", ResultSet::new(vec!["ID".into()], vec![]));
//! let output = engine.execute_immediate("select * from emp")?;
//! ```

pub mod engine;
pub mod result;
pub mod scripted;

pub use engine::{BoundParam, CallOutput, EngineError, ParamType, QueryEngine, QueryOutput, StatementHandle};
pub use result::ResultSet;
pub use scripted::{EngineEvent, ScriptedEngine};
