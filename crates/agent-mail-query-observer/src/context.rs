//! Task-scoped tracker propagation.
//!
//! The active tracker travels with the task, not through a process global:
//! [`track_queries`] installs a fresh tracker for the duration of one future,
//! and [`record`] looks it up from whatever task is currently executing.
//! Tasks that never opt in pay only a failed task-local lookup.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::tracker::{QueryReport, QueryTracker};

/// Shared handle to the tracker installed for a task.
pub type TrackerHandle = Arc<Mutex<QueryTracker>>;

tokio::task_local! {
   static ACTIVE_TRACKER: TrackerHandle;
}

/// Run `fut` with a fresh tracker installed for the current task.
///
/// Every statement the database layer executes while `fut` is running (on
/// this task) is attributed to the new tracker. Returns the future's output
/// together with the final [`QueryReport`]. Scopes nest: an inner
/// `track_queries` shadows the outer tracker until it completes.
pub async fn track_queries<F>(slow_query_ms: Option<f64>, fut: F) -> (F::Output, QueryReport)
where
   F: Future,
{
   let tracker: TrackerHandle = Arc::new(Mutex::new(QueryTracker::new(slow_query_ms)));
   debug!(?slow_query_ms, "query tracking started");

   let output = ACTIVE_TRACKER.scope(Arc::clone(&tracker), fut).await;

   let report = tracker.lock().report();
   debug!(total = report.total, "query tracking stopped");
   (output, report)
}

/// The tracker installed for the current task, or `None` when tracking is
/// not active.
pub fn current() -> Option<TrackerHandle> {
   ACTIVE_TRACKER.try_with(Arc::clone).ok()
}

/// Record a statement against the current task's tracker.
///
/// No-op when no tracker is active.
pub fn record(statement: &str, duration_ms: f64) {
   if let Ok(tracker) = ACTIVE_TRACKER.try_with(Arc::clone) {
      tracker.lock().record(statement, duration_ms);
   }
}
