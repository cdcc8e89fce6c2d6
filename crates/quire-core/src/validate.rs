//! Submission validation.
//!
//! Checks run in a fixed order and stop at the first failure. Everything here
//! is pure; the form and its fields are fetched by the caller.

use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  enums::{EmbeddingModel, FieldType},
  error::ValidationError,
  field::FormField,
  form::Form,
  submission::{
    AnswerInput, NewAnswer, NewVector, Submission, ValidatedSubmission,
    ValidatedVectors, VectorInput,
  },
};

/// Optional rules layered on top of the fixed checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SubmissionPolicy {
  /// Reject submissions that leave a `required` field unanswered.
  #[serde(default)]
  pub enforce_required_fields: bool,
}

/// Validate `submission` against `form` (as fetched by `submission.form_id`)
/// and its `fields`.
pub fn validate_submission(
  submission: Submission,
  form: Option<&Form>,
  fields: &[FormField],
  policy: &SubmissionPolicy,
) -> Result<ValidatedSubmission> {
  let Submission {
    response_id,
    form_id,
    respondent,
    answers,
    vectors,
  } = submission;

  if form_id.is_nil() {
    return Err(ValidationError::MissingFormId.into());
  }
  if respondent.is_empty() {
    return Err(ValidationError::EmptyRespondent.into());
  }

  let form = form
    .filter(|f| f.form_id == form_id)
    .ok_or(Error::FormNotFound(form_id))?;
  if !form.can_accept_responses() {
    return Err(Error::FormNotAcceptingResponses {
      form_id,
      status: form.status,
    });
  }

  if fields.is_empty() {
    return Err(ValidationError::NoFields.into());
  }

  let answers = check_answers(answers)?;

  if policy.enforce_required_fields {
    check_required(fields, &answers)?;
  }

  let vectors = if vectors.is_empty() {
    Vec::new()
  } else {
    let vectors = check_vectors(vectors)?;
    let client_ids: HashSet<Uuid> =
      answers.iter().filter_map(|a| a.answer_id).collect();
    if let Some(v) = vectors.iter().find(|v| !client_ids.contains(&v.answer_id))
    {
      return Err(ValidationError::UnknownVectorAnswer(v.answer_id).into());
    }
    vectors
  };

  Ok(ValidatedSubmission {
    response_id,
    form_id,
    respondent,
    answers,
    vectors,
  })
}

/// Validate vectors destined for answers that already exist. Whether those
/// answers exist, and whether they already carry a vector, is for the store
/// to decide.
pub fn validate_vectors(inputs: Vec<VectorInput>) -> Result<ValidatedVectors> {
  if inputs.is_empty() {
    return Err(ValidationError::NoVectors.into());
  }
  Ok(ValidatedVectors(check_vectors(inputs)?))
}

fn check_answers(
  inputs: Vec<AnswerInput>,
) -> Result<Vec<NewAnswer>, ValidationError> {
  let mut seen = HashSet::new();

  inputs
    .into_iter()
    .enumerate()
    .map(|(index, input)| {
      if input.field_id.is_nil() {
        return Err(ValidationError::MissingFieldId { index });
      }
      let field_type: FieldType = input.field_type.parse().map_err(|_| {
        ValidationError::UnknownFieldType {
          index,
          value: input.field_type.clone(),
        }
      })?;
      if let Some(id) = input.id {
        if !seen.insert(id) {
          return Err(ValidationError::DuplicateAnswerId(id));
        }
      }

      Ok(NewAnswer {
        answer_id: input.id,
        field_id: input.field_id,
        field_type,
        value: input.value,
      })
    })
    .collect()
}

fn check_required(
  fields: &[FormField],
  answers: &[NewAnswer],
) -> Result<(), ValidationError> {
  let answered: HashSet<Uuid> = answers.iter().map(|a| a.field_id).collect();
  match fields
    .iter()
    .find(|f| f.required && !answered.contains(&f.field_id))
  {
    Some(f) => Err(ValidationError::MissingRequiredAnswer(f.field_id)),
    None => Ok(()),
  }
}

fn check_vectors(
  inputs: Vec<VectorInput>,
) -> Result<Vec<NewVector>, ValidationError> {
  let mut seen = HashSet::new();

  inputs
    .into_iter()
    .enumerate()
    .map(|(index, input)| {
      if input.answer_id.is_nil() {
        return Err(ValidationError::MissingAnswerId { index });
      }
      if input.embedding.is_empty() {
        return Err(ValidationError::MissingEmbedding);
      }
      let model: EmbeddingModel = input.model_name.parse().map_err(|_| {
        ValidationError::UnknownModel {
          index,
          value: input.model_name.clone(),
        }
      })?;
      if !seen.insert(input.answer_id) {
        return Err(ValidationError::DuplicateVector(input.answer_id));
      }

      Ok(NewVector {
        answer_id: input.answer_id,
        embedding: input.embedding,
        model,
      })
    })
    .collect()
}
