//! `-t` statement timer

use sqlmagic_engine::{EngineError, QueryEngine};
use std::time::{Duration, Instant};

/// Run `sql` repeatedly until `runtime` has elapsed
///
/// Returns the number of completed executions. The first failure stops the
/// loop and is returned instead.
pub fn time_statement<E: QueryEngine + ?Sized>(
    engine: &mut E,
    sql: &str,
    runtime: Duration,
) -> Result<u64, EngineError> {
    let deadline = Instant::now() + runtime;
    let mut count = 0;

    while Instant::now() < deadline {
        engine.execute_immediate(sql)?;
        count += 1;
    }

    tracing::debug!(count, runtime_ms = runtime.as_millis() as u64, "timed statement");
    Ok(count)
}
