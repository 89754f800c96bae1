//! Process-wide database lifecycle.
//!
//! One [`Database`] handle per process lifetime, created on first use and
//! replaced only through an explicit [`reset_database`]. Callers must never
//! observe a partially-initialized handle, so the slot is guarded by a
//! read-fast-path / write-on-miss lock with a double check — concurrent
//! first users take the write lock once, everyone afterwards shares reads.

use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::config::{self, DatabaseSettings};
use crate::database::Database;
use crate::error::Result;

static DATABASE: OnceLock<RwLock<Option<Arc<Database>>>> = OnceLock::new();

fn database_slot() -> &'static RwLock<Option<Arc<Database>>> {
   DATABASE.get_or_init(|| RwLock::new(None))
}

/// Initialize the process-wide database handle.
///
/// Idempotent: when a handle is already live it is returned unchanged and
/// the given settings are ignored — changing configuration requires
/// [`reset_database`] first.
pub fn init_database(settings: DatabaseSettings) -> Result<Arc<Database>> {
   // Fast path: shared read lock for the existing handle.
   {
      let guard = database_slot().read();
      if let Some(database) = guard.as_ref() {
         return Ok(Arc::clone(database));
      }
   }

   let mut guard = database_slot().write();
   // Double-check after acquiring the write lock — another task may have
   // won the race.
   if let Some(database) = guard.as_ref() {
      return Ok(Arc::clone(database));
   }

   let database = Arc::new(Database::connect(settings)?);
   *guard = Some(Arc::clone(&database));
   Ok(database)
}

/// The process-wide database handle, initialized from resolved settings on
/// first use.
pub fn database() -> Result<Arc<Database>> {
   {
      let guard = database_slot().read();
      if let Some(database) = guard.as_ref() {
         return Ok(Arc::clone(database));
      }
   }
   init_database(config::resolved_settings())
}

/// Tear down the process-wide handle.
///
/// Disposes the pool (full asynchronous close; any handle still held
/// elsewhere sees a closed pool, and dropping the last `Arc` is the
/// best-effort fallback), then clears the cached settings so a subsequent
/// [`init_database`] or [`database`] picks up fresh configuration with the
/// schema-ready flag starting false again.
pub async fn reset_database() {
   let existing = database_slot().write().take();
   if let Some(database) = existing {
      database.close().await;
      debug!("process-wide database handle reset");
   }
   config::clear_settings_cache();
}
