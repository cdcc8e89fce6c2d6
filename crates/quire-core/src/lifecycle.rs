//! The form workflow state machine.
//!
//! ```text
//! Draft --publish--> Published --close--> Closed
//! Draft --close-----------------------> Closed
//! Closed --close--> Closed (no-op)
//! ```
//!
//! There is no transition out of `Closed`. Everything here is pure; the
//! caller persists the result through
//! [`FormStore::update_form`](crate::store::FormStore::update_form).

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  enums::FormStatus,
  error::ValidationError,
  form::Form,
};

impl FormStatus {
  /// Statuses reachable from `self` in one step.
  pub fn allowed_transitions(self) -> &'static [FormStatus] {
    match self {
      Self::Draft => &[Self::Published, Self::Closed],
      Self::Published => &[Self::Closed],
      Self::Closed => &[Self::Closed],
    }
  }
}

/// Whether `from -> to` is a legal single step.
pub fn validate_transition(from: FormStatus, to: FormStatus) -> bool {
  from.allowed_transitions().contains(&to)
}

impl Form {
  /// A new form in `Draft`.
  pub fn create(
    title: impl Into<String>,
    description: impl Into<String>,
  ) -> Result<Self> {
    let title = title.into();
    if title.trim().is_empty() {
      return Err(ValidationError::MissingTitle.into());
    }

    Ok(Self {
      form_id: Uuid::new_v4(),
      title,
      description: description.into(),
      status: FormStatus::Draft,
      created_at: Utc::now(),
      version: 1,
    })
  }

  /// `Draft → Published`. Any other starting status is an illegal
  /// transition.
  pub fn publish(&mut self) -> Result<()> {
    self.transition(FormStatus::Published, "publish")
  }

  /// `* → Closed`. Returns `false` when the form was already closed.
  pub fn close(&mut self) -> bool {
    let changed = self.status != FormStatus::Closed;
    self.status = FormStatus::Closed;
    changed
  }

  /// Replace title and description. Closed forms are frozen.
  pub fn edit(
    &mut self,
    title: impl Into<String>,
    description: impl Into<String>,
  ) -> Result<()> {
    if !self.can_mutate_fields() {
      return Err(self.illegal("edit"));
    }
    let title = title.into();
    if title.trim().is_empty() {
      return Err(ValidationError::MissingTitle.into());
    }
    self.title = title;
    self.description = description.into();
    Ok(())
  }

  pub fn can_mutate_fields(&self) -> bool { self.status != FormStatus::Closed }

  pub fn can_accept_responses(&self) -> bool {
    self.status == FormStatus::Published
  }

  fn transition(&mut self, to: FormStatus, action: &'static str) -> Result<()> {
    if self.status == to || !validate_transition(self.status, to) {
      return Err(self.illegal(action));
    }
    self.status = to;
    Ok(())
  }

  fn illegal(&self, action: &'static str) -> Error {
    Error::IllegalTransition {
      form_id: self.form_id,
      from: self.status,
      action,
    }
  }
}
