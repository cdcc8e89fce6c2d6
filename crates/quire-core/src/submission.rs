//! Submission inputs and the validated forms the store accepts.
//!
//! Raw inputs ([`Submission`], [`VectorInput`]) carry enum values as strings
//! and ids that may be nil. Only [`crate::validate`] can turn them into a
//! [`ValidatedSubmission`] or [`ValidatedVectors`], which are the sole inputs
//! of the store's write paths.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  enums::{EmbeddingModel, FieldType, ResponseStatus},
  locale::LocalizedValue,
  response::{AnswerVector, Respondent, Response, ResponseAnswer},
};

// ─── Raw input ───────────────────────────────────────────────────────────────

/// One end-user submission against a form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submission {
  /// Caller-chosen response id; generated when absent.
  #[serde(default)]
  pub response_id: Option<Uuid>,
  #[serde(default)]
  pub form_id:     Uuid,
  #[serde(default)]
  pub respondent:  Respondent,
  #[serde(default)]
  pub answers:     Vec<AnswerInput>,
  /// Embeddings for answers of this submission. Each must target an answer
  /// that carries a caller-chosen `id`.
  #[serde(default)]
  pub vectors:     Vec<VectorInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerInput {
  /// Caller-chosen answer id; generated when absent.
  #[serde(default)]
  pub id:         Option<Uuid>,
  #[serde(default)]
  pub field_id:   Uuid,
  #[serde(default)]
  pub field_type: String,
  #[serde(default)]
  pub value:      LocalizedValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VectorInput {
  #[serde(default)]
  pub answer_id:  Uuid,
  #[serde(default)]
  pub embedding:  Vec<f32>,
  #[serde(default)]
  pub model_name: String,
}

// ─── Validated ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NewAnswer {
  pub answer_id:  Option<Uuid>,
  pub field_id:   Uuid,
  pub field_type: FieldType,
  pub value:      LocalizedValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVector {
  pub answer_id: Uuid,
  pub embedding: Vec<f32>,
  pub model:     EmbeddingModel,
}

impl NewVector {
  fn into_vector(self, now: DateTime<Utc>) -> AnswerVector {
    AnswerVector {
      vector_id:  Uuid::new_v4(),
      answer_id:  self.answer_id,
      embedding:  self.embedding,
      model:      self.model,
      created_at: now,
    }
  }
}

/// A submission the validator has approved.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
  pub(crate) response_id: Option<Uuid>,
  pub(crate) form_id:     Uuid,
  pub(crate) respondent:  Respondent,
  pub(crate) answers:     Vec<NewAnswer>,
  pub(crate) vectors:     Vec<NewVector>,
}

impl ValidatedSubmission {
  pub fn form_id(&self) -> Uuid { self.form_id }

  pub fn answers(&self) -> &[NewAnswer] { &self.answers }

  pub fn vectors(&self) -> &[NewVector] { &self.vectors }

  /// Assign identities, status and timestamps. Answers are bound to the new
  /// response and numbered in input order.
  pub fn into_record(self, now: DateTime<Utc>) -> SubmissionRecord {
    let response = Response {
      response_id:  self.response_id.unwrap_or_else(Uuid::new_v4),
      form_id:      self.form_id,
      respondent:   self.respondent,
      status:       ResponseStatus::Submitted,
      submitted_at: now,
    };

    let answers = self
      .answers
      .into_iter()
      .zip(0u32..)
      .map(|(a, position)| ResponseAnswer {
        answer_id: a.answer_id.unwrap_or_else(Uuid::new_v4),
        response_id: response.response_id,
        field_id: a.field_id,
        field_type: a.field_type,
        value: a.value,
        position,
        created_at: now,
      })
      .collect();

    let vectors = self
      .vectors
      .into_iter()
      .map(|v| v.into_vector(now))
      .collect();

    SubmissionRecord { response, answers, vectors }
  }
}

/// Everything one submission writes, with identities assigned.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
  pub response: Response,
  pub answers:  Vec<ResponseAnswer>,
  pub vectors:  Vec<AnswerVector>,
}

/// Vectors the validator has approved for attachment to existing answers.
#[derive(Debug, Clone)]
pub struct ValidatedVectors(pub(crate) Vec<NewVector>);

impl ValidatedVectors {
  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn into_vectors(self, now: DateTime<Utc>) -> Vec<AnswerVector> {
    self.0.into_iter().map(|v| v.into_vector(now)).collect()
  }
}
