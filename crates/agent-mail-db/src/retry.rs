//! Retry wrapper for transient database-lock contention.
//!
//! Single-writer SQLite serializes writers at the engine level, so a burst of
//! concurrent writes surfaces as transient "database is locked" errors.
//! Bounded backoff with jitter converts that contention into slightly higher
//! tail latency instead of a hard failure; the jitter desynchronizes retries
//! when many tasks contend on the same resource at once.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{Error, Result, is_lock_error};

/// Default maximum retry attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// Default initial backoff delay.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
/// Default backoff ceiling.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
/// Default symmetric jitter fraction (±25%).
pub const DEFAULT_JITTER_FRACTION: f64 = 0.25;

/// Parameters for the retry wrapper.
#[derive(Debug, Clone)]
pub struct RetryConfig {
   /// Maximum number of retry attempts after the initial try
   pub max_retries: u32,
   /// Initial delay, doubled on each attempt
   pub base_delay: Duration,
   /// Ceiling applied to the exponential delay before jitter
   pub max_delay: Duration,
   /// Symmetric jitter fraction (0.25 → delays vary by ±25%)
   pub jitter_fraction: f64,
}

impl Default for RetryConfig {
   fn default() -> Self {
      Self {
         max_retries: DEFAULT_MAX_RETRIES,
         base_delay: DEFAULT_BASE_DELAY,
         max_delay: DEFAULT_MAX_DELAY,
         jitter_fraction: DEFAULT_JITTER_FRACTION,
      }
   }
}

/// Backoff delay for a zero-based attempt index.
///
/// `min(base_delay * 2^attempt, max_delay)` scaled by `1 ± jitter`, where
/// `random` in `[0.0, 1.0)` supplies the jitter sign and magnitude.
#[must_use]
pub fn backoff_delay(config: &RetryConfig, attempt: u32, random: f64) -> Duration {
   let exponential = config.base_delay.as_secs_f64() * (1u64 << attempt.min(31)) as f64;
   let capped = exponential.min(config.max_delay.as_secs_f64());
   let jitter = 1.0 + (random * 2.0 - 1.0) * config.jitter_fraction;
   Duration::from_secs_f64((capped * jitter).max(0.0))
}

/// Re-execute `op` while it fails with errors the classifier marks
/// transient, up to `config.max_retries` retries.
///
/// `op` produces a fresh future per attempt and must do its own resource
/// acquisition inside that future: nothing may be held across the backoff
/// sleep, so a retried operation acquires its session (or transaction) anew
/// each time. Terminal errors — anything the classifier rejects, or a
/// transient error once retries are exhausted — are returned unchanged.
pub async fn retry_when<T, F, Fut>(
   config: &RetryConfig,
   is_transient: impl Fn(&Error) -> bool,
   mut op: F,
) -> Result<T>
where
   F: FnMut() -> Fut,
   Fut: Future<Output = Result<T>>,
{
   let mut attempt: u32 = 0;
   loop {
      match op().await {
         Ok(value) => return Ok(value),
         Err(error) if is_transient(&error) && attempt < config.max_retries => {
            let delay = backoff_delay(config, attempt, rand::random::<f64>());
            warn!(
               attempt = attempt + 1,
               max_retries = config.max_retries,
               delay_ms = delay.as_millis() as u64,
               %error,
               "transient database contention, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
         }
         Err(error) => return Err(error),
      }
   }
}

/// [`retry_when`] specialized to transient lock/busy errors.
pub async fn retry_on_lock<T, F, Fut>(config: &RetryConfig, op: F) -> Result<T>
where
   F: FnMut() -> Fut,
   Fut: Future<Output = Result<T>>,
{
   retry_when(config, is_lock_error, op).await
}
