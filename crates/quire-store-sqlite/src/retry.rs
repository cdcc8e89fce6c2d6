use std::time::Duration;

/// How the store retries calls that fail with transient lock contention.
///
/// Attempt `n` (1-based) that fails transiently is followed by a sleep of
/// `base_delay * n`, so the wait grows linearly. Other failures are returned
/// at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts including the first; `1` disables retrying.
  pub max_attempts: u32,
  pub base_delay:   Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      base_delay:   Duration::from_millis(100),
    }
  }
}

impl RetryPolicy {
  pub fn none() -> Self {
    Self {
      max_attempts: 1,
      base_delay:   Duration::ZERO,
    }
  }

  /// Sleep after failed attempt `attempt`.
  pub fn delay_for(&self, attempt: u32) -> Duration {
    self.base_delay.saturating_mul(attempt)
  }

  /// Whether another attempt may follow failed attempt `attempt`.
  pub fn allows_retry(&self, attempt: u32) -> bool {
    attempt < self.max_attempts
  }
}
