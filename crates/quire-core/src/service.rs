//! `FormService`: the use cases behind the HTTP API.
//!
//! Each operation fetches what it needs from the store, applies the pure
//! lifecycle, catalog or validation rules, and writes the result back.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Classify, Error,
  catalog,
  enums::FormStatus,
  field::{FieldSpec, FieldView, FormField},
  form::{Form, NewForm},
  locale::DEFAULT_LANGUAGE,
  response::{AnswerVector, Response, ResponseDetail},
  store::FormStore,
  submission::{Submission, VectorInput},
  validate::{self, SubmissionPolicy},
};

/// A form with its fields resolved for one language.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedForm {
  #[serde(flatten)]
  pub form:   Form,
  pub fields: Vec<FieldView>,
}

pub struct FormService<S> {
  store:            S,
  policy:           SubmissionPolicy,
  default_language: String,
}

impl<S: FormStore> FormService<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      policy: SubmissionPolicy::default(),
      default_language: DEFAULT_LANGUAGE.to_owned(),
    }
  }

  pub fn with_policy(mut self, policy: SubmissionPolicy) -> Self {
    self.policy = policy;
    self
  }

  /// Language that localized texts fall back to when the requested one is
  /// missing or blank.
  pub fn with_default_language(mut self, lang: impl Into<String>) -> Self {
    self.default_language = lang.into();
    self
  }

  pub fn store(&self) -> &S { &self.store }

  // ─── Forms ────────────────────────────────────────────────────────────────

  pub async fn create_form(&self, input: NewForm) -> Result<Form, S::Error> {
    let form = Form::create(input.title, input.description)?;
    let form = self.store.insert_form(form).await?;
    info!(form_id = %form.form_id, "form created");
    Ok(form)
  }

  pub async fn get_form(&self, id: Uuid) -> Result<Form, S::Error> {
    self
      .store
      .get_form(id)
      .await?
      .ok_or_else(|| Error::FormNotFound(id).into())
  }

  pub async fn list_forms(
    &self,
    status: Option<FormStatus>,
  ) -> Result<Vec<Form>, S::Error> {
    self.store.list_forms(status).await
  }

  pub async fn edit_form(
    &self,
    id: Uuid,
    input: NewForm,
  ) -> Result<Form, S::Error> {
    let mut form = self.get_form(id).await?;
    form
      .edit(input.title, input.description)
      .inspect_err(|e| debug!(form_id = %id, error = %e, "edit rejected"))?;
    self.store.update_form(form).await
  }

  pub async fn publish(&self, id: Uuid) -> Result<Form, S::Error> {
    let mut form = self.get_form(id).await?;
    form
      .publish()
      .inspect_err(|e| debug!(form_id = %id, error = %e, "publish rejected"))?;
    let form = self.store.update_form(form).await?;
    info!(form_id = %id, "form published");
    Ok(form)
  }

  /// Idempotent; closing a closed form returns it unchanged without a write.
  pub async fn close(&self, id: Uuid) -> Result<Form, S::Error> {
    let mut form = self.get_form(id).await?;
    if !form.close() {
      return Ok(form);
    }
    let form = self.store.update_form(form).await?;
    info!(form_id = %id, "form closed");
    Ok(form)
  }

  pub async fn delete_form(
    &self,
    id: Uuid,
    cascade: bool,
  ) -> Result<(), S::Error> {
    self.store.delete_form(id, cascade).await?;
    info!(form_id = %id, cascade, "form deleted");
    Ok(())
  }

  /// The form and its ordered fields, texts resolved for `lang` (or the
  /// default language when `None`).
  pub async fn render_form(
    &self,
    id: Uuid,
    lang: Option<&str>,
  ) -> Result<RenderedForm, S::Error> {
    let form = self.get_form(id).await?;
    let lang = lang.unwrap_or(&self.default_language);
    let fields = self
      .list_fields(id)
      .await?
      .iter()
      .map(|f| f.view(lang, &self.default_language))
      .collect();
    Ok(RenderedForm { form, fields })
  }

  // ─── Fields ───────────────────────────────────────────────────────────────

  pub async fn create_field(
    &self,
    form_id: Uuid,
    spec: FieldSpec,
  ) -> Result<FormField, S::Error> {
    let form = self.get_form(form_id).await?;
    let field = catalog::create_field(&form, spec).inspect_err(|e| {
      debug!(form_id = %form_id, error = %e, "field rejected");
    })?;
    let field = self.store.insert_field(field).await?;
    info!(form_id = %form_id, field_id = %field.field_id, "field created");
    Ok(field)
  }

  pub async fn update_field(
    &self,
    id: Uuid,
    spec: FieldSpec,
  ) -> Result<FormField, S::Error> {
    let existing = self
      .store
      .get_field(id)
      .await?
      .ok_or(Error::FieldNotFound(id))?;
    let form = self.get_form(existing.form_id).await?;
    let field = catalog::update_field(&form, existing, spec).inspect_err(|e| {
      debug!(field_id = %id, error = %e, "field update rejected");
    })?;
    self.store.update_field(field).await
  }

  pub async fn delete_field(&self, id: Uuid) -> Result<(), S::Error> {
    self.store.delete_field(id).await
  }

  pub async fn list_fields(
    &self,
    form_id: Uuid,
  ) -> Result<Vec<FormField>, S::Error> {
    self.get_form(form_id).await?;
    let fields = self.store.list_fields(form_id).await?;
    Ok(catalog::ordered(fields))
  }

  // ─── Responses ────────────────────────────────────────────────────────────

  /// Validate and persist one submission.
  pub async fn submit(
    &self,
    submission: Submission,
  ) -> Result<Response, S::Error> {
    let form_id = submission.form_id;
    let form = if form_id.is_nil() {
      None
    } else {
      self.store.get_form(form_id).await?
    };
    let fields = match &form {
      Some(_) => self.store.list_fields(form_id).await?,
      None => Vec::new(),
    };

    let validated = validate::validate_submission(
      submission,
      form.as_ref(),
      &fields,
      &self.policy,
    )
    .inspect_err(|e| debug!(form_id = %form_id, error = %e, "submission rejected"))?;

    let answers = validated.answers().len();
    let vectors = validated.vectors().len();
    let response = self.store.submit(validated).await.inspect_err(|e| {
      debug!(form_id = %form_id, kind = ?e.kind(), error = %e, "submission failed");
    })?;

    info!(
      form_id = %form_id,
      response_id = %response.response_id,
      answers,
      vectors,
      "response submitted"
    );
    Ok(response)
  }

  pub async fn get_response(
    &self,
    id: Uuid,
  ) -> Result<ResponseDetail, S::Error> {
    let response = self
      .store
      .get_response(id)
      .await?
      .ok_or(Error::ResponseNotFound(id))?;
    let answers = self.store.list_answers(id).await?;
    Ok(ResponseDetail { response, answers })
  }

  pub async fn list_responses(
    &self,
    form_id: Uuid,
  ) -> Result<Vec<Response>, S::Error> {
    self.get_form(form_id).await?;
    self.store.list_responses(form_id).await
  }

  pub async fn delete_response(&self, id: Uuid) -> Result<(), S::Error> {
    self.store.delete_response(id).await?;
    info!(response_id = %id, "response deleted");
    Ok(())
  }

  // ─── Vectors ──────────────────────────────────────────────────────────────

  pub async fn attach_vectors(
    &self,
    inputs: Vec<VectorInput>,
  ) -> Result<Vec<AnswerVector>, S::Error> {
    let vectors = validate::validate_vectors(inputs)
      .inspect_err(|e| debug!(error = %e, "vectors rejected"))?;
    let vectors = self.store.attach_vectors(vectors).await?;
    info!(count = vectors.len(), "vectors attached");
    Ok(vectors)
  }

  /// Fails with [`Error::VectorNotFound`] carrying the answer id when the
  /// answer has no vector.
  pub async fn get_vector_for_answer(
    &self,
    answer_id: Uuid,
  ) -> Result<AnswerVector, S::Error> {
    self
      .store
      .get_vector_for_answer(answer_id)
      .await?
      .ok_or_else(|| Error::VectorNotFound(answer_id).into())
  }

  pub async fn delete_vector(&self, id: Uuid) -> Result<(), S::Error> {
    self.store.delete_vector(id).await
  }
}
