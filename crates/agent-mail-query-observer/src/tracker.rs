//! Instrumentation record for statements executed by one logical task.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

use crate::statement::extract_table_name;

/// Maximum number of slow-query samples retained per tracker.
///
/// Bounded so a pathological workload cannot grow the sample list without
/// limit; once the cap is reached further slow statements still count toward
/// the totals but are not sampled.
pub const SLOW_QUERY_LIMIT: usize = 50;

/// A sampled statement that met the slow-query threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowQuery {
   /// Best-effort table attribution, `None` when no table was recognized
   pub table: Option<String>,
   /// Statement duration in milliseconds, rounded to two decimals
   pub duration_ms: f64,
}

/// Per-task query instrumentation record.
///
/// Populated by the database layer's statement-execution seam while tracking
/// is active for the current task. Never persisted; export via [`report`].
///
/// [`report`]: QueryTracker::report
#[derive(Debug, Default)]
pub struct QueryTracker {
   total: u64,
   total_time_ms: f64,
   per_table: HashMap<String, u64>,
   slow_query_ms: Option<f64>,
   slow_queries: Vec<SlowQuery>,
}

impl QueryTracker {
   /// Create a tracker, optionally sampling statements at or above
   /// `slow_query_ms` milliseconds.
   pub fn new(slow_query_ms: Option<f64>) -> Self {
      Self {
         slow_query_ms,
         ..Self::default()
      }
   }

   /// Record one executed statement and its duration.
   pub fn record(&mut self, statement: &str, duration_ms: f64) {
      self.total += 1;
      self.total_time_ms += duration_ms;

      let table = extract_table_name(statement);
      if let Some(ref name) = table {
         *self.per_table.entry(name.clone()).or_insert(0) += 1;
      }

      if let Some(threshold) = self.slow_query_ms
         && duration_ms >= threshold
         && self.slow_queries.len() < SLOW_QUERY_LIMIT
      {
         self.slow_queries.push(SlowQuery {
            table,
            duration_ms: round2(duration_ms),
         });
      }
   }

   /// Total number of recorded statements.
   pub fn total(&self) -> u64 {
      self.total
   }

   /// Export a serializable snapshot of this tracker.
   pub fn report(&self) -> QueryReport {
      let mut entries: Vec<(String, u64)> = self
         .per_table
         .iter()
         .map(|(table, count)| (table.clone(), *count))
         .collect();
      // Descending count, then table name, so the hottest tables lead.
      entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

      QueryReport {
         total: self.total,
         total_time_ms: round2(self.total_time_ms),
         per_table: entries.into_iter().collect(),
         slow_query_ms: self.slow_query_ms,
         slow_queries: self.slow_queries.clone(),
      }
   }
}

/// Snapshot of a [`QueryTracker`], ordered and rounded for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
   /// Total statement count
   pub total: u64,
   /// Cumulative statement time in milliseconds, rounded to two decimals
   pub total_time_ms: f64,
   /// Per-table invocation histogram, descending by count then name
   pub per_table: IndexMap<String, u64>,
   /// The slow-query threshold this tracker was started with, if any
   pub slow_query_ms: Option<f64>,
   /// Sampled slow statements, capped at [`SLOW_QUERY_LIMIT`]
   pub slow_queries: Vec<SlowQuery>,
}

fn round2(value: f64) -> f64 {
   (value * 100.0).round() / 100.0
}
