//! # agent-mail-query-observer
//!
//! Per-task query instrumentation for the agent-mail database layer.
//!
//! ## Core Types
//!
//! - **[`QueryTracker`]**: Mutable instrumentation record (counts, timings,
//!   per-table histogram, capped slow-query samples)
//! - **[`QueryReport`]**: Serializable snapshot of a tracker, suitable for any
//!   external reporting sink
//! - **[`track_queries`]**: Runs a future with a fresh tracker installed for
//!   the current task and returns the report alongside the future's output
//!
//! ## Architecture
//!
//! Tracker state is task-local: each logical task that opts into tracking gets
//! its own tracker, and concurrent tasks never observe each other's counters.
//! The database layer calls [`record`] from its statement-execution seam; when
//! no tracker is installed for the current task the call is a no-op, so
//! tracking imposes no measurable overhead when unused.

mod context;
mod statement;
mod tracker;

// Re-export public types
pub use context::{TrackerHandle, current, record, track_queries};
pub use statement::extract_table_name;
pub use tracker::{QueryReport, QueryTracker, SLOW_QUERY_LIMIT, SlowQuery};
