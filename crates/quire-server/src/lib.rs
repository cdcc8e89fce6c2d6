//! Wiring for the Quire server binary: configuration and the HTTP app.

use std::{path::Path, path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, http::StatusCode};
use quire_core::{service::FormService, store::FormStore, validate::SubmissionPolicy};
use quire_store_sqlite::{MetricsSink, RetryPolicy, StoreOptions};
use serde::Deserialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `QUIRE_*` environment variables. Every key has a default.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                    String,
  pub port:                    u16,
  pub store_path:              PathBuf,
  /// Language localized texts fall back to.
  pub default_language:        String,
  pub enforce_required_fields: bool,
  pub request_timeout_secs:    u64,
  pub retry_max_attempts:      u32,
  pub retry_base_delay_ms:     u64,
  pub busy_timeout_ms:         u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                    "127.0.0.1".to_owned(),
      port:                    8080,
      store_path:              PathBuf::from("quire.db"),
      default_language:        quire_core::locale::DEFAULT_LANGUAGE.to_owned(),
      enforce_required_fields: false,
      request_timeout_secs:    30,
      retry_max_attempts:      3,
      retry_base_delay_ms:     100,
      busy_timeout_ms:         5000,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists), then let `QUIRE_*` environment variables
  /// override individual keys.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("QUIRE").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn policy(&self) -> SubmissionPolicy {
    SubmissionPolicy {
      enforce_required_fields: self.enforce_required_fields,
    }
  }

  pub fn store_options(&self, metrics: Arc<dyn MetricsSink>) -> StoreOptions {
    StoreOptions {
      retry: RetryPolicy {
        max_attempts: self.retry_max_attempts.max(1),
        base_delay:   Duration::from_millis(self.retry_base_delay_ms),
      },
      metrics,
      busy_timeout: Duration::from_millis(self.busy_timeout_ms),
    }
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// The service for `store`, configured from `cfg`.
pub fn service<S: FormStore>(store: S, cfg: &ServerConfig) -> FormService<S> {
  FormService::new(store)
    .with_policy(cfg.policy())
    .with_default_language(cfg.default_language.clone())
}

/// The full HTTP app: the API under `/api/v1`, with per-request tracing and
/// a request timeout.
pub fn app<S>(service: Arc<FormService<S>>, cfg: &ServerConfig) -> Router
where
  S: FormStore + 'static,
{
  Router::new()
    .nest("/api/v1", quire_api::api_router(service))
    .layer(TraceLayer::new_for_http())
    .layer(timeout_layer(cfg))
}

/// Requests running past the configured timeout get a bare 408.
pub fn timeout_layer(cfg: &ServerConfig) -> TimeoutLayer {
  TimeoutLayer::with_status_code(
    StatusCode::REQUEST_TIMEOUT,
    cfg.request_timeout(),
  )
}
