//! SQLite backend for Quire.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Transient lock contention is retried
//! according to a [`RetryPolicy`]; every call is reported to a
//! [`MetricsSink`].

mod encode;
mod schema;
mod store;

pub mod error;
pub mod metrics;
pub mod retry;

pub use error::{Error, Result};
pub use metrics::{CountingMetrics, MetricsSink, MetricsSnapshot, NoopMetrics};
pub use retry::RetryPolicy;
pub use store::{SqliteStore, StoreOptions};

#[cfg(test)]
mod tests;
