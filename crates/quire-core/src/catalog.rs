//! Field catalog: validation of field definitions and the authoritative
//! field order of a form.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  enums::FieldType,
  error::ValidationError,
  field::{FieldOptions, FieldSpec, FormField},
  form::Form,
};

/// Build a new field for `form` from `spec`.
///
/// Fails with an illegal transition if the form is closed, and with a
/// validation error if the type is unknown, the order is not positive, or the
/// options do not match the type.
pub fn create_field(form: &Form, spec: FieldSpec) -> Result<FormField> {
  ensure_mutable(form, "add a field to")?;
  let (field_type, options) = check_spec(&spec)?;
  let now = Utc::now();

  Ok(FormField {
    field_id: Uuid::new_v4(),
    form_id: form.form_id,
    label: spec.label,
    placeholder: spec.placeholder,
    help_text: spec.help_text,
    field_type,
    field_order: spec.field_order,
    required: spec.required,
    options,
    created_at: now,
    updated_at: now,
  })
}

/// Apply `spec` to `existing`, keeping its identity, owner and creation time.
pub fn update_field(
  form: &Form,
  existing: FormField,
  spec: FieldSpec,
) -> Result<FormField> {
  ensure_mutable(form, "update a field of")?;
  let (field_type, options) = check_spec(&spec)?;

  Ok(FormField {
    label: spec.label,
    placeholder: spec.placeholder,
    help_text: spec.help_text,
    field_type,
    field_order: spec.field_order,
    required: spec.required,
    options,
    updated_at: Utc::now(),
    ..existing
  })
}

/// Sort ascending by `field_order`. The sort is stable, so fields sharing an
/// order keep the order they were given in (insertion order when they come
/// from the store).
pub fn ordered(mut fields: Vec<FormField>) -> Vec<FormField> {
  fields.sort_by_key(|f| f.field_order);
  fields
}

fn ensure_mutable(form: &Form, action: &'static str) -> Result<()> {
  if form.can_mutate_fields() {
    Ok(())
  } else {
    Err(Error::IllegalTransition {
      form_id: form.form_id,
      from: form.status,
      action,
    })
  }
}

fn check_spec(
  spec: &FieldSpec,
) -> Result<(FieldType, Option<FieldOptions>), ValidationError> {
  let field_type: FieldType = spec
    .field_type
    .parse()
    .map_err(|_| ValidationError::UnknownType(spec.field_type.clone()))?;

  if spec.field_order <= 0 {
    return Err(ValidationError::NonPositiveFieldOrder(spec.field_order));
  }

  let options = spec.options.clone().filter(|o| !o.is_empty());
  match (field_type.requires_options(), options.is_some()) {
    (true, false) => Err(ValidationError::MissingOptions),
    (false, true) => Err(ValidationError::UnexpectedOptions(field_type.as_str())),
    _ => Ok((field_type, options)),
  }
}
