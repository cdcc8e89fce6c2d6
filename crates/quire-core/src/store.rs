//! The `FormStore` trait.
//!
//! Implemented by storage backends (e.g. `quire-store-sqlite`). The service
//! layer and the HTTP API depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify,
  enums::FormStatus,
  field::FormField,
  form::Form,
  response::{AnswerVector, Response, ResponseAnswer},
  submission::{ValidatedSubmission, ValidatedVectors},
};

/// Abstraction over a Quire storage backend.
///
/// Lookups return `None` for a missing row; updates and deletes of a missing
/// row fail with the matching not-found error.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait FormStore: Send + Sync {
  type Error: std::error::Error
    + From<crate::Error>
    + Classify
    + Send
    + Sync
    + 'static;

  // ── Forms ─────────────────────────────────────────────────────────────

  fn insert_form(
    &self,
    form: Form,
  ) -> impl Future<Output = Result<Form, Self::Error>> + Send + '_;

  fn get_form(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Form>, Self::Error>> + Send + '_;

  /// All forms, newest first, optionally filtered by status.
  fn list_forms(
    &self,
    status: Option<FormStatus>,
  ) -> impl Future<Output = Result<Vec<Form>, Self::Error>> + Send + '_;

  /// Persist `form` if the stored version still equals `form.version`.
  ///
  /// Returns the stored form with its version bumped. A version mismatch
  /// fails with [`crate::Error::StaleForm`].
  fn update_form(
    &self,
    form: Form,
  ) -> impl Future<Output = Result<Form, Self::Error>> + Send + '_;

  /// Delete a form with its fields. With `cascade`, responses go too;
  /// without it, a form that has responses fails with
  /// [`crate::Error::FormHasResponses`].
  fn delete_form(
    &self,
    id: Uuid,
    cascade: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Fields ────────────────────────────────────────────────────────────

  /// Fails with an illegal transition if the owning form has been closed in
  /// the meantime.
  fn insert_field(
    &self,
    field: FormField,
  ) -> impl Future<Output = Result<FormField, Self::Error>> + Send + '_;

  fn get_field(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<FormField>, Self::Error>> + Send + '_;

  fn update_field(
    &self,
    field: FormField,
  ) -> impl Future<Output = Result<FormField, Self::Error>> + Send + '_;

  fn delete_field(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fields of a form ordered by `field_order`, ties in insertion order.
  /// Empty if the form has none.
  fn list_fields(
    &self,
    form_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FormField>, Self::Error>> + Send + '_;

  // ── Responses ─────────────────────────────────────────────────────────

  /// Persist a response, its answers and any vectors as one unit.
  ///
  /// The form status is re-read inside the write transaction; a form that was
  /// closed after validation fails with
  /// [`crate::Error::FormNotAcceptingResponses`], and one whose fields were
  /// all deleted fails with [`crate::ValidationError::NoFields`]. Either way
  /// nothing is written.
  fn submit(
    &self,
    submission: ValidatedSubmission,
  ) -> impl Future<Output = Result<Response, Self::Error>> + Send + '_;

  fn get_response(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Response>, Self::Error>> + Send + '_;

  /// Responses of a form, oldest first.
  fn list_responses(
    &self,
    form_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Response>, Self::Error>> + Send + '_;

  /// Answers of a response in submission order.
  fn list_answers(
    &self,
    response_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ResponseAnswer>, Self::Error>> + Send + '_;

  /// Delete a response with its answers and their vectors.
  fn delete_response(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Vectors ───────────────────────────────────────────────────────────

  /// Attach vectors to existing answers, all or nothing.
  ///
  /// Every target answer must exist ([`crate::Error::AnswerNotFound`]) and
  /// must not carry a vector yet ([`crate::Error::VectorAlreadyAttached`]).
  fn attach_vectors(
    &self,
    vectors: ValidatedVectors,
  ) -> impl Future<Output = Result<Vec<AnswerVector>, Self::Error>> + Send + '_;

  fn get_vector_for_answer(
    &self,
    answer_id: Uuid,
  ) -> impl Future<Output = Result<Option<AnswerVector>, Self::Error>> + Send + '_;

  fn delete_vector(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
