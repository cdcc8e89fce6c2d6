//! Forms: the container that owns fields and, transitively, responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::FormStatus;

/// A form definition. Status changes go through the methods in
/// [`crate::lifecycle`]; nothing else writes `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
  pub form_id:     Uuid,
  pub title:       String,
  pub description: String,
  pub status:      FormStatus,
  pub created_at:  DateTime<Utc>,
  /// Optimistic concurrency counter; the store bumps it on every update and
  /// rejects writes carrying a stale value.
  pub version:     i64,
}

/// Input to [`crate::service::FormService::create_form`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewForm {
  pub title:       String,
  #[serde(default)]
  pub description: String,
}
