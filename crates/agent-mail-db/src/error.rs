//! Error types for agent-mail-db

use thiserror::Error;

/// Errors that may occur when working with agent-mail-db
#[derive(Error, Debug)]
pub enum Error {
   /// IO error when accessing database files. Standard library IO errors
   /// are converted to this variant.
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// Connection string that cannot be used with this layer
   #[error("invalid database URL '{url}': {reason}")]
   InvalidDatabaseUrl { url: String, reason: String },
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Classify an error as transient lock contention.
///
/// SQLite serializes writers at the engine level; under concurrent load an
/// operation can fail with a "database is locked" / "database is busy"
/// message even though retrying a moment later would succeed. The check is
/// message-based because the lock condition surfaces through several sqlx
/// error variants.
pub fn is_lock_error(error: &Error) -> bool {
   let message = error.to_string().to_lowercase();
   message.contains("database is locked")
      || message.contains("database is busy")
      || message.contains("locked")
}
