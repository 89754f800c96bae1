//! The database service object: pool ownership, session handout, and the
//! double-checked schema bootstrap.

use sqlx::{Pool, Sqlite};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::DatabaseSettings;
use crate::error::Result;
use crate::pool::build_pool;
use crate::retry::{RetryConfig, retry_on_lock};
use crate::schema;
use crate::session::Session;

/// Pooled SQLite database with idempotent schema bootstrap.
///
/// ## State Management
///
/// - **`schema_ready`**: set exactly once per instance, after a bootstrap
///   transaction commits; never unset except by building a new instance
/// - **`schema_lock`**: serializes concurrent first-use bootstrap; the
///   ready flag is re-checked under it (double-checked locking) so callers
///   after the first successful bootstrap never serialize
///
/// Configuration is immutable after construction — changing settings means
/// building a new instance (see the lifecycle module's reset).
pub struct Database {
   pool: Pool<Sqlite>,
   settings: DatabaseSettings,
   schema_ready: AtomicBool,
   schema_lock: Mutex<()>,
}

impl Database {
   /// Build a database handle for the given settings.
   ///
   /// The pool connects lazily; this never touches the underlying store.
   pub fn connect(settings: DatabaseSettings) -> Result<Self> {
      let pool = build_pool(&settings)?;
      info!(url = %settings.url, "database handle created");
      Ok(Self {
         pool,
         settings,
         schema_ready: AtomicBool::new(false),
         schema_lock: Mutex::new(()),
      })
   }

   /// The underlying connection pool.
   pub fn pool(&self) -> &Pool<Sqlite> {
      &self.pool
   }

   /// The settings this handle was built with.
   pub fn settings(&self) -> &DatabaseSettings {
      &self.settings
   }

   /// Check a session out of the pool for one logical operation.
   pub async fn acquire(&self) -> Result<Session> {
      let conn = self.pool.acquire().await?;
      Ok(Session::new(conn))
   }

   /// Whether the schema bootstrap has completed on this instance.
   pub fn schema_ready(&self) -> bool {
      self.schema_ready.load(Ordering::Acquire)
   }

   /// Ensure the primary schema, full-text index, triggers, and secondary
   /// indexes exist.
   ///
   /// Safe to call repeatedly and from any number of concurrent tasks;
   /// exactly one caller performs the work. Returns `true` when this call
   /// ran the bootstrap transaction, `false` when the schema was already
   /// ready. Wrapped in the lock-retry wrapper so a bootstrap racing other
   /// writers survives transient lock errors; a failure partway through
   /// leaves the ready flag unset and the next call retries the full
   /// sequence (every statement is individually idempotent).
   pub async fn ensure_schema(&self) -> Result<bool> {
      self.ensure_schema_once().await
   }

   async fn ensure_schema_once(&self) -> Result<bool> {
      if self.schema_ready() {
         return Ok(false);
      }

      let _guard = self.schema_lock.lock().await;
      if self.schema_ready() {
         return Ok(false);
      }

      create_schema(self.pool.clone()).await?;
      self.schema_ready.store(true, Ordering::Release);
      Ok(true)
   }

   /// Dispose the pool, closing all idle connections and waiting for
   /// checked-out ones to be returned.
   pub async fn close(&self) {
      self.pool.close().await;
      debug!(url = %self.settings.url, "database pool closed");
   }
}

/// One transaction creating everything the layer depends on.
///
/// Takes the pool by owned value (a cheap `Arc` clone) rather than
/// borrowing `&self`, so the returned future carries no late-bound
/// lifetime. That keeps it a single concrete `Send` type and avoids a
/// higher-ranked-lifetime inference failure when the bootstrap is spawned
/// onto a task (see [`exec_raw`]).
async fn create_schema(pool: Pool<Sqlite>) -> Result<()> {
   let mut tx = pool.begin().await?;

   exec_raw(&mut tx, schema::CREATE_TABLES).await?;
   exec_raw(&mut tx, schema::CREATE_FTS_TABLE).await?;
   for trigger in schema::FTS_TRIGGERS {
      exec_raw(&mut tx, trigger).await?;
   }
   for index in schema::SECONDARY_INDEXES {
      exec_raw(&mut tx, index).await?;
   }

   tx.commit().await?;
   debug!("schema bootstrap committed");
   Ok(())
}

/// Execute a single raw SQL statement on the bootstrap transaction.
///
/// The `&mut SqliteConnection` reborrow happens inside this named-lifetime
/// function rather than inline in `create_schema`, which early-binds the
/// connection lifetime so the bootstrap future stays `Send` when spawned
/// onto a task (works around a higher-ranked-lifetime inference limitation).
async fn exec_raw(tx: &mut sqlx::Transaction<'_, Sqlite>, sql: &'static str) -> Result<()> {
   sqlx::raw_sql(sql).execute(&mut **tx).await?;
   Ok(())
}
