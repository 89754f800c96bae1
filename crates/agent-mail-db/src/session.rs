//! Unit-of-work session over a pooled connection.

use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqliteQueryResult, SqliteRow};
use sqlx::{Execute, Sqlite};
use std::ops::{Deref, DerefMut};
use std::time::Instant;
use tracing::trace;

use crate::error::Result;

/// A unit-of-work handle scoped to one logical operation.
///
/// The session owns a checked-out pool connection for its lifetime and is
/// the instrumentation seam: statements executed through [`execute`],
/// [`fetch_all`], [`fetch_optional`], or [`fetch_one`] are timed and fed to
/// the query tracker active for the current task (a no-op when tracking is
/// off).
///
/// ## Release semantics
///
/// [`release`] is the deliberate close. Every other exit path — early
/// `return`, `?` propagation, panic unwind, task cancellation (which drops
/// the future, and with it the session) — releases the connection through
/// `Drop`, so a session can never leak its connection back out of the pool.
///
/// [`execute`]: Session::execute
/// [`fetch_all`]: Session::fetch_all
/// [`fetch_optional`]: Session::fetch_optional
/// [`fetch_one`]: Session::fetch_one
/// [`release`]: Session::release
#[must_use = "if unused, the connection is immediately returned to the pool"]
pub struct Session {
   conn: PoolConnection<Sqlite>,
}

impl Session {
   pub(crate) fn new(conn: PoolConnection<Sqlite>) -> Self {
      Self { conn }
   }

   /// Execute a write statement (INSERT/UPDATE/DELETE/DDL).
   pub async fn execute<'q>(
      &mut self,
      query: Query<'q, Sqlite, SqliteArguments<'q>>,
   ) -> Result<SqliteQueryResult> {
      let sql = Execute::sql(&query);
      let started = Instant::now();
      let result = query.execute(&mut *self.conn).await?;
      agent_mail_query_observer::record(sql, elapsed_ms(started));
      Ok(result)
   }

   /// Execute a query and return all matching rows.
   pub async fn fetch_all<'q>(
      &mut self,
      query: Query<'q, Sqlite, SqliteArguments<'q>>,
   ) -> Result<Vec<SqliteRow>> {
      let sql = Execute::sql(&query);
      let started = Instant::now();
      let rows = query.fetch_all(&mut *self.conn).await?;
      agent_mail_query_observer::record(sql, elapsed_ms(started));
      Ok(rows)
   }

   /// Execute a query and return zero or one row.
   pub async fn fetch_optional<'q>(
      &mut self,
      query: Query<'q, Sqlite, SqliteArguments<'q>>,
   ) -> Result<Option<SqliteRow>> {
      let sql = Execute::sql(&query);
      let started = Instant::now();
      let row = query.fetch_optional(&mut *self.conn).await?;
      agent_mail_query_observer::record(sql, elapsed_ms(started));
      Ok(row)
   }

   /// Execute a query expected to return exactly one row.
   pub async fn fetch_one<'q>(
      &mut self,
      query: Query<'q, Sqlite, SqliteArguments<'q>>,
   ) -> Result<SqliteRow> {
      let sql = Execute::sql(&query);
      let started = Instant::now();
      let row = query.fetch_one(&mut *self.conn).await?;
      agent_mail_query_observer::record(sql, elapsed_ms(started));
      Ok(row)
   }

   /// Release the session, returning its connection to the pool.
   ///
   /// Equivalent to dropping the session; provided so the deliberate close
   /// reads as one at call sites.
   pub fn release(self) {
      trace!("session released");
   }
}

impl Deref for Session {
   type Target = SqliteConnection;

   fn deref(&self) -> &Self::Target {
      &self.conn
   }
}

impl DerefMut for Session {
   fn deref_mut(&mut self) -> &mut Self::Target {
      &mut self.conn
   }
}

fn elapsed_ms(started: Instant) -> f64 {
   started.elapsed().as_secs_f64() * 1000.0
}
