//! The canonical enum ↔ string table.
//!
//! Every enumerated value that crosses a boundary (JSON bodies, SQLite
//! columns) is mapped to and from its string form here and only here. The
//! mapping is derived once by `strum`; serde and the store both go through
//! it, so the two directions cannot drift apart.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Wires serde through the strum mapping: serialise with `IntoStaticStr`,
/// deserialise with `FromStr`.
macro_rules! strum_serde {
  ($($ty:ident),+ $(,)?) => {$(
    impl TryFrom<String> for $ty {
      type Error = strum::ParseError;

      fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
      }
    }

    impl $ty {
      /// The canonical string form.
      pub fn as_str(self) -> &'static str { self.into() }
    }
  )+};
}

strum_serde!(FieldType, FormStatus, ResponseStatus, EmbeddingModel);

// ─── FieldType ───────────────────────────────────────────────────────────────

/// The kind of input a form field collects.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FieldType {
  Text,
  Textarea,
  Number,
  Email,
  Select,
  Radio,
  Checkbox,
  Date,
}

impl FieldType {
  /// Choice-like types must carry a non-empty options map; all others must
  /// not carry one.
  pub fn requires_options(self) -> bool {
    matches!(self, Self::Select | Self::Radio | Self::Checkbox)
  }
}

// ─── FormStatus ──────────────────────────────────────────────────────────────

/// Lifecycle status of a form. See [`crate::lifecycle`] for the legal
/// transitions.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(serialize_all = "lowercase")]
pub enum FormStatus {
  Draft,
  Published,
  Closed,
}

// ─── ResponseStatus ──────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(try_from = "String", into = "&'static str")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseStatus {
  #[default]
  Submitted,
}

// ─── EmbeddingModel ──────────────────────────────────────────────────────────

/// Models whose embeddings may be attached to answers.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum EmbeddingModel {
  #[strum(serialize = "text-embedding-3-small")]
  TextEmbedding3Small,
  #[strum(serialize = "text-embedding-3-large")]
  TextEmbedding3Large,
  #[strum(serialize = "text-embedding-ada-002")]
  TextEmbeddingAda002,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn field_type_parse_is_case_insensitive() {
    assert_eq!("SELECT".parse::<FieldType>().unwrap(), FieldType::Select);
    assert_eq!("Textarea".parse::<FieldType>().unwrap(), FieldType::Textarea);
    assert!("dropdown".parse::<FieldType>().is_err());
  }

  #[test]
  fn string_table_is_bijective() {
    for ft in FieldType::iter() {
      assert_eq!(ft.as_str().parse::<FieldType>().unwrap(), ft);
    }
    for model in EmbeddingModel::iter() {
      assert_eq!(model.as_str().parse::<EmbeddingModel>().unwrap(), model);
    }
  }

  #[test]
  fn serde_uses_the_same_strings() {
    let json = serde_json::to_string(&FieldType::Checkbox).unwrap();
    assert_eq!(json, "\"checkbox\"");

    let status: FormStatus = serde_json::from_str("\"published\"").unwrap();
    assert_eq!(status, FormStatus::Published);

    let model: EmbeddingModel =
      serde_json::from_str("\"text-embedding-3-large\"").unwrap();
    assert_eq!(model, EmbeddingModel::TextEmbedding3Large);

    assert!(serde_json::from_str::<EmbeddingModel>("\"gpt-2\"").is_err());
  }

  #[test]
  fn only_choice_types_require_options() {
    let choice: Vec<_> =
      FieldType::iter().filter(|ft| ft.requires_options()).collect();
    assert_eq!(choice, [
      FieldType::Select,
      FieldType::Radio,
      FieldType::Checkbox
    ]);
  }
}
