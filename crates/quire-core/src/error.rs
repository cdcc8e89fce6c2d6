//! Error types for `quire-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::enums::FormStatus;

/// A structural or business-rule violation, always detectable before any
/// write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("form title is required")]
  MissingTitle,

  #[error("response form id is required")]
  MissingFormId,

  #[error("respondent is required")]
  EmptyRespondent,

  #[error("form has no fields")]
  NoFields,

  #[error("answer {index}: field id is required")]
  MissingFieldId { index: usize },

  #[error("answer {index}: unknown field type {value:?}")]
  UnknownFieldType { index: usize, value: String },

  #[error("answer id {0} appears more than once")]
  DuplicateAnswerId(Uuid),

  #[error("required field {0} has no answer")]
  MissingRequiredAnswer(Uuid),

  #[error("unknown field type {0:?}")]
  UnknownType(String),

  #[error("field order must be greater than zero, got {0}")]
  NonPositiveFieldOrder(i32),

  #[error("missing options")]
  MissingOptions,

  #[error("options are not allowed for {0} fields")]
  UnexpectedOptions(&'static str),

  #[error("vector {index}: answer id is required")]
  MissingAnswerId { index: usize },

  #[error("missing embedding")]
  MissingEmbedding,

  #[error("vector {index}: unknown model name {value:?}")]
  UnknownModel { index: usize, value: String },

  #[error("answer {0} has more than one vector")]
  DuplicateVector(Uuid),

  #[error("vector targets answer {0}, which is not part of this submission")]
  UnknownVectorAnswer(Uuid),

  #[error("no vectors supplied")]
  NoVectors,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation error: {0}")]
  Validation(#[from] ValidationError),

  #[error("form not found: {0}")]
  FormNotFound(Uuid),

  #[error("field not found: {0}")]
  FieldNotFound(Uuid),

  #[error("response not found: {0}")]
  ResponseNotFound(Uuid),

  #[error("answer not found: {0}")]
  AnswerNotFound(Uuid),

  #[error("vector not found: {0}")]
  VectorNotFound(Uuid),

  #[error("form {form_id} is not accepting responses (status: {status})")]
  FormNotAcceptingResponses { form_id: Uuid, status: FormStatus },

  #[error("illegal transition for form {form_id}: cannot {action} a {from} form")]
  IllegalTransition {
    form_id: Uuid,
    from:    FormStatus,
    action:  &'static str,
  },

  #[error("form {form_id} was modified concurrently (expected version {expected})")]
  StaleForm { form_id: Uuid, expected: i64 },

  #[error("form {0} still has responses; delete with cascade")]
  FormHasResponses(Uuid),

  #[error("answer {0} already has a vector")]
  VectorAlreadyAttached(Uuid),

  #[error("id {0} is already taken")]
  IdTaken(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// The coarse error taxonomy surfaced at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  IllegalTransition,
  NotAcceptingResponses,
  Conflict,
  /// I/O or persistence failure, possibly transient.
  Store,
}

/// Implemented by every error type that can cross the store boundary.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::FormNotFound(_)
      | Self::FieldNotFound(_)
      | Self::ResponseNotFound(_)
      | Self::AnswerNotFound(_)
      | Self::VectorNotFound(_) => ErrorKind::NotFound,
      Self::FormNotAcceptingResponses { .. } => {
        ErrorKind::NotAcceptingResponses
      }
      Self::IllegalTransition { .. } | Self::StaleForm { .. } => {
        ErrorKind::IllegalTransition
      }
      Self::FormHasResponses(_)
      | Self::VectorAlreadyAttached(_)
      | Self::IdTaken(_) => ErrorKind::Conflict,
      Self::Serialization(_) => ErrorKind::Store,
    }
  }
}
