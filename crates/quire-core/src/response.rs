//! Responses, their answers, and the embeddings attached to answers.
//!
//! All three are immutable once written. A response is deleted as a whole,
//! taking its answers and their vectors with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  enums::{EmbeddingModel, FieldType, ResponseStatus},
  locale::LocalizedValue,
};

// ─── Respondent ──────────────────────────────────────────────────────────────

/// Free-form metadata about whoever submitted a response. Expected to hold at
/// least `email` and/or `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Respondent(serde_json::Map<String, serde_json::Value>);

impl Respondent {
  pub fn new() -> Self { Self::default() }

  pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
    self.0.insert(key.into(), value);
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<serde_json::Map<String, serde_json::Value>> for Respondent {
  fn from(map: serde_json::Map<String, serde_json::Value>) -> Self { Self(map) }
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
  pub response_id:  Uuid,
  pub form_id:      Uuid,
  pub respondent:   Respondent,
  pub status:       ResponseStatus,
  /// Server-assigned when the submission is persisted.
  pub submitted_at: DateTime<Utc>,
}

// ─── Answers ─────────────────────────────────────────────────────────────────

/// One respondent-provided value for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseAnswer {
  pub answer_id:   Uuid,
  pub response_id: Uuid,
  pub field_id:    Uuid,
  /// Copied from the field at submission time so later field edits do not
  /// change how the answer is read.
  pub field_type:  FieldType,
  pub value:       LocalizedValue,
  /// Zero-based position in the submitted answer list.
  pub position:    u32,
  pub created_at:  DateTime<Utc>,
}

// ─── Vectors ─────────────────────────────────────────────────────────────────

/// An embedding of one answer. At most one per answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerVector {
  pub vector_id:  Uuid,
  pub answer_id:  Uuid,
  pub embedding:  Vec<f32>,
  pub model:      EmbeddingModel,
  pub created_at: DateTime<Utc>,
}

impl AnswerVector {
  pub fn dimension(&self) -> usize { self.embedding.len() }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// A response together with its answers in submission order.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseDetail {
  #[serde(flatten)]
  pub response: Response,
  pub answers:  Vec<ResponseAnswer>,
}
