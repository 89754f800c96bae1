//! # agent-mail-db
//!
//! Concurrency-safe SQLite access layer for the agent-mail message store.
//!
//! ## Core Types
//!
//! - **[`Database`]**: Service object owning the connection pool and the
//!   idempotent schema bootstrap
//! - **[`Session`]**: Unit-of-work handle for one logical operation, with
//!   instrumented statement execution
//! - **[`DatabaseSettings`]**: Resolved configuration (connection URL, echo
//!   flag)
//! - **[`RetryConfig`]** / [`retry_on_lock`]: Bounded exponential backoff
//!   with jitter for transient lock contention
//! - **[`Error`]**: Error type for database operations
//!
//! ## Architecture
//!
//! - **Single pool, lazy connections**: sized conservatively for file-backed
//!   SQLite (WAL journaling, `synchronous = NORMAL`, 30 s busy timeout on
//!   every new physical connection)
//! - **Double-checked bootstrap**: primary tables, the `fts_messages`
//!   full-text structure, its synchronizing triggers, and the secondary
//!   indexes are created in one transaction by exactly one caller per
//!   process, no matter how many race on first use
//! - **Task-scoped instrumentation**: statements executed through a session
//!   feed the query tracker installed for the current task (see
//!   `agent-mail-query-observer`); tracking off means zero overhead
//! - **Guaranteed release**: a session returns its connection to the pool on
//!   every exit path, including cancellation

mod config;
mod database;
mod error;
mod global;
mod pool;
mod retry;
pub mod schema;
mod session;
mod timestamps;

// Re-export public types
pub use config::{
   BUSY_TIMEOUT, BackendKind, CONNECTION_MAX_AGE, DatabaseSettings, FILE_MAX_OVERFLOW,
   FILE_POOL_SIZE, NETWORK_MAX_OVERFLOW, NETWORK_POOL_SIZE, POOL_ACQUIRE_TIMEOUT,
   clear_settings_cache, pool_limits, resolved_settings,
};
pub use database::Database;
pub use error::{Error, Result, is_lock_error};
pub use global::{database, init_database, reset_database};
pub use pool::build_pool;
pub use retry::{
   DEFAULT_BASE_DELAY, DEFAULT_JITTER_FRACTION, DEFAULT_MAX_DELAY, DEFAULT_MAX_RETRIES,
   RetryConfig, backoff_delay, retry_on_lock, retry_when,
};
pub use session::Session;
pub use timestamps::{format_timestamp, parse_timestamp, parse_timestamp_bytes};

// The instrumentation surface lives in its own crate; re-export the pieces
// callers interact with directly.
pub use agent_mail_query_observer::{
   QueryReport, QueryTracker, SLOW_QUERY_LIMIT, SlowQuery, current as current_tracker,
   track_queries,
};
