//! Database settings and connection-URL classification.
//!
//! Settings arrive as an opaque `{url, echo}` pair produced by whatever
//! resolver the host application uses; this module only interprets the URL
//! far enough to pick a backend, extract the SQLite file path, and size the
//! pool. SQLAlchemy-style URLs (`sqlite:///rel`, `sqlite:////abs`,
//! `sqlite+aiosqlite:///x`) are accepted for compatibility with existing
//! deployments.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{Error, Result};

/// Base pool size for file-backed SQLite.
///
/// SQLite has low write concurrency; large pools can exhaust file handles
/// under stress tests, so the file-backed pool stays small.
pub const FILE_POOL_SIZE: u32 = 5;
/// Overflow allowance for file-backed SQLite.
pub const FILE_MAX_OVERFLOW: u32 = 5;
/// Base pool size for networked backends.
pub const NETWORK_POOL_SIZE: u32 = 25;
/// Overflow allowance for networked backends.
pub const NETWORK_MAX_OVERFLOW: u32 = 25;

/// How long an acquire waits for a free connection before failing with a
/// clear error instead of hanging indefinitely.
pub const POOL_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
/// Connections older than this are recycled to avoid stale handles.
pub const CONNECTION_MAX_AGE: Duration = Duration::from_secs(3600);
/// In-engine busy-wait before SQLite reports a lock failure.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved database settings.
///
/// # Examples
///
/// ```
/// use agent_mail_db::DatabaseSettings;
///
/// // Use defaults
/// let settings = DatabaseSettings::default();
///
/// // Override just the URL
/// let settings = DatabaseSettings {
///    url: "sqlite:///./mail.sqlite3".to_string(),
///    ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
   /// Connection string: embedded file path or networked URL
   pub url: String,

   /// Emit every statement to the log (development/debugging aid)
   pub echo: bool,
}

impl Default for DatabaseSettings {
   fn default() -> Self {
      Self {
         url: "sqlite:///./storage.sqlite3".to_string(),
         echo: false,
      }
   }
}

/// Which kind of backend a connection URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
   /// File-backed SQLite database
   File,
   /// In-memory SQLite database
   Memory,
   /// Anything that is not SQLite (server-based engines)
   Networked,
}

impl DatabaseSettings {
   /// Resolve settings from the environment (`DATABASE_URL`,
   /// `DATABASE_ECHO`), falling back to defaults.
   pub fn from_env() -> Self {
      let defaults = Self::default();
      let url = std::env::var("DATABASE_URL").unwrap_or(defaults.url);
      let echo = std::env::var("DATABASE_ECHO")
         .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
         .unwrap_or(false);
      Self { url, echo }
   }

   /// Classify the connection URL.
   pub fn backend(&self) -> BackendKind {
      match strip_sqlite_scheme(&self.url) {
         Some(rest) => {
            if extract_path(rest) == ":memory:" {
               BackendKind::Memory
            } else {
               BackendKind::File
            }
         }
         None => BackendKind::Networked,
      }
   }

   /// Parse the SQLite path from the database URL.
   pub fn sqlite_path(&self) -> Result<String> {
      let Some(rest) = strip_sqlite_scheme(&self.url) else {
         return Err(Error::InvalidDatabaseUrl {
            url: self.url.clone(),
            reason: "expected sqlite:///path/to/db.sqlite3".to_string(),
         });
      };
      Ok(extract_path(rest))
   }
}

fn strip_sqlite_scheme(url: &str) -> Option<&str> {
   // Driver-qualified first so "sqlite://" does not leave "+aiosqlite" behind.
   for scheme in ["sqlite+aiosqlite://", "sqlite://"] {
      if let Some(rest) = url.strip_prefix(scheme) {
         return Some(rest);
      }
   }
   None
}

/// `sqlite:///rel` → `rel`, `sqlite:////abs` → `/abs`; query string and
/// fragment are not part of the path.
fn extract_path(rest: &str) -> String {
   let rest = rest.strip_prefix('/').unwrap_or(rest);
   let rest = rest.split(['?', '#']).next().unwrap_or(rest);
   if rest.is_empty() {
      ":memory:".to_string()
   } else {
      rest.to_string()
   }
}

/// Pool sizing `(size, overflow)` for a backend.
///
/// File-backed SQLite gets a conservative pool; networked engines tolerate
/// (and benefit from) a much larger one. Memory databases are pinned to a
/// single connection — each additional connection to `:memory:` would open
/// its own private store and never see the bootstrapped schema.
pub fn pool_limits(backend: BackendKind) -> (u32, u32) {
   match backend {
      BackendKind::File => (FILE_POOL_SIZE, FILE_MAX_OVERFLOW),
      BackendKind::Memory => (1, 0),
      BackendKind::Networked => (NETWORK_POOL_SIZE, NETWORK_MAX_OVERFLOW),
   }
}

static SETTINGS_CACHE: OnceLock<RwLock<Option<DatabaseSettings>>> = OnceLock::new();

fn settings_cache() -> &'static RwLock<Option<DatabaseSettings>> {
   SETTINGS_CACHE.get_or_init(|| RwLock::new(None))
}

/// Environment-resolved settings, cached for the life of the process (or
/// until [`clear_settings_cache`]).
pub fn resolved_settings() -> DatabaseSettings {
   {
      let guard = settings_cache().read();
      if let Some(settings) = guard.as_ref() {
         return settings.clone();
      }
   }

   let mut guard = settings_cache().write();
   // Double-check after acquiring the write lock.
   if let Some(settings) = guard.as_ref() {
      return settings.clone();
   }
   let settings = DatabaseSettings::from_env();
   *guard = Some(settings.clone());
   settings
}

/// Drop the cached settings so the next resolution re-reads the environment.
///
/// Tests frequently mutate env vars; the lifecycle reset calls this so a
/// rebuilt pool picks up fresh configuration.
pub fn clear_settings_cache() {
   *settings_cache().write() = None;
}
