//! Form fields: the typed, ordered questions a form asks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{enums::FieldType, locale::LocalizedText};

/// Option key → display label, e.g. `{"1": "Yes", "2": "No"}`.
pub type FieldOptions = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
  pub field_id:    Uuid,
  pub form_id:     Uuid,
  pub label:       LocalizedText,
  pub placeholder: LocalizedText,
  pub help_text:   LocalizedText,
  pub field_type:  FieldType,
  /// Display and validation order; always `> 0`.
  pub field_order: i32,
  pub required:    bool,
  /// Present iff `field_type.requires_options()`.
  pub options:     Option<FieldOptions>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl FormField {
  pub fn label(&self, lang: &str) -> &str { self.label.get(lang) }

  pub fn placeholder(&self, lang: &str) -> &str { self.placeholder.get(lang) }

  pub fn help_text(&self, lang: &str) -> &str { self.help_text.get(lang) }

  pub fn has_options(&self) -> bool {
    self.options.as_ref().is_some_and(|o| !o.is_empty())
  }

  /// The field with its texts resolved for `lang`, falling back to
  /// `fallback`.
  pub fn view(&self, lang: &str, fallback: &str) -> FieldView {
    FieldView {
      field_id:    self.field_id,
      label:       self.label.resolve(lang, fallback).to_owned(),
      placeholder: self.placeholder.resolve(lang, fallback).to_owned(),
      help_text:   self.help_text.resolve(lang, fallback).to_owned(),
      field_type:  self.field_type,
      field_order: self.field_order,
      required:    self.required,
      options:     self.options.clone(),
    }
  }
}

/// A field as shown to a respondent in one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
  pub field_id:    Uuid,
  pub label:       String,
  pub placeholder: String,
  pub help_text:   String,
  pub field_type:  FieldType,
  pub field_order: i32,
  pub required:    bool,
  pub options:     Option<FieldOptions>,
}

/// Caller-supplied field definition. `field_type` stays a raw string until
/// [`crate::catalog`] parses it, so an unknown type is reported as a
/// validation error rather than a deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldSpec {
  #[serde(default)]
  pub label:       LocalizedText,
  #[serde(default)]
  pub placeholder: LocalizedText,
  #[serde(default)]
  pub help_text:   LocalizedText,
  #[serde(default, rename = "type", alias = "field_type")]
  pub field_type:  String,
  #[serde(default)]
  pub field_order: i32,
  #[serde(default)]
  pub required:    bool,
  #[serde(default)]
  pub options:     Option<FieldOptions>,
}
