//! Call accounting for the store.
//!
//! The store reports to whatever [`MetricsSink`] it was opened with; nothing
//! here is process-global, so two stores never share counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Receives one event per finished store call and one per retry.
pub trait MetricsSink: Send + Sync {
  /// A call finished; `ok` is false when it returned a database-level error.
  fn record_call(&self, op: &'static str, ok: bool);

  /// A call hit transient contention and is about to be retried.
  fn record_retry(&self, op: &'static str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
  fn record_call(&self, _op: &'static str, _ok: bool) {}

  fn record_retry(&self, _op: &'static str) {}
}

/// Per-instance atomic counters.
#[derive(Debug, Default)]
pub struct CountingMetrics {
  calls:    AtomicU64,
  failures: AtomicU64,
  retries:  AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
  pub calls:    u64,
  pub failures: u64,
  pub retries:  u64,
}

impl CountingMetrics {
  pub fn new() -> Self { Self::default() }

  pub fn snapshot(&self) -> MetricsSnapshot {
    MetricsSnapshot {
      calls:    self.calls.load(Ordering::Relaxed),
      failures: self.failures.load(Ordering::Relaxed),
      retries:  self.retries.load(Ordering::Relaxed),
    }
  }
}

impl MetricsSink for CountingMetrics {
  fn record_call(&self, _op: &'static str, ok: bool) {
    self.calls.fetch_add(1, Ordering::Relaxed);
    if !ok {
      self.failures.fetch_add(1, Ordering::Relaxed);
    }
  }

  fn record_retry(&self, _op: &'static str) {
    self.retries.fetch_add(1, Ordering::Relaxed);
  }
}
