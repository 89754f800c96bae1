//! Pool construction with SQLite-appropriate concurrency policies.

use sqlx::ConnectOptions;
use sqlx::sqlite::{
   SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::debug;

use crate::config::{
   BUSY_TIMEOUT, BackendKind, CONNECTION_MAX_AGE, DatabaseSettings, POOL_ACQUIRE_TIMEOUT,
   pool_limits,
};
use crate::error::Result;

/// Build a lazily-connecting pool for the given settings.
///
/// No connection is opened until first acquire. Every new physical
/// connection is configured for concurrent access: WAL journaling so readers
/// proceed while the single writer appends, `synchronous = NORMAL` (safe
/// under WAL, cheaper than FULL), and a 30-second busy timeout so short-lived
/// lock contention resolves inside the engine instead of surfacing an error.
///
/// The pool itself validates connections on checkout, fails acquires after
/// [`POOL_ACQUIRE_TIMEOUT`], and recycles connections older than
/// [`CONNECTION_MAX_AGE`].
pub fn build_pool(settings: &DatabaseSettings) -> Result<Pool<Sqlite>> {
   let backend = settings.backend();
   let path = settings.sqlite_path()?;

   if backend == BackendKind::File {
      ensure_parent_dir(&path);
   }

   let mut options = SqliteConnectOptions::new()
      .journal_mode(SqliteJournalMode::Wal)
      .synchronous(SqliteSynchronous::Normal)
      .busy_timeout(BUSY_TIMEOUT)
      .create_if_missing(true);

   options = if backend == BackendKind::Memory {
      options.in_memory(true)
   } else {
      options.filename(&path)
   };

   options = if settings.echo {
      options.log_statements(log::LevelFilter::Info)
   } else {
      options.log_statements(log::LevelFilter::Off)
   };

   let (size, overflow) = pool_limits(backend);
   let pool = SqlitePoolOptions::new()
      .max_connections(size + overflow)
      .acquire_timeout(POOL_ACQUIRE_TIMEOUT)
      .max_lifetime(CONNECTION_MAX_AGE)
      .test_before_acquire(true)
      .connect_lazy_with(options);

   debug!(backend = ?backend, max_connections = size + overflow, "pool configured");
   Ok(pool)
}

/// Create the parent directory of a file-backed database, best effort.
///
/// SQLite reports "unable to open database file" when the directory is
/// missing. A creation failure here is logged and otherwise ignored: the
/// connect-time error is the actionable one.
fn ensure_parent_dir(path: &str) {
   let Some(parent) = Path::new(path).parent() else {
      return;
   };
   if parent.as_os_str().is_empty() {
      return;
   }
   if let Err(error) = std::fs::create_dir_all(parent) {
      debug!(
         dir = %parent.display(),
         %error,
         "could not create database directory; deferring to connect time"
      );
   }
}
