//! Localized text and values keyed by language code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Language used when the requested one has no usable entry.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A string per language code, e.g. `{"en": "Name", "ar": "الاسم"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
  /// Resolve `lang`, falling back to [`DEFAULT_LANGUAGE`], then to `""`.
  pub fn get(&self, lang: &str) -> &str { self.resolve(lang, DEFAULT_LANGUAGE) }

  /// Resolve `lang`, falling back to `fallback`, then to `""`. Empty entries
  /// count as absent.
  pub fn resolve(&self, lang: &str, fallback: &str) -> &str {
    [lang, fallback]
      .into_iter()
      .filter_map(|l| self.0.get(l))
      .find(|s| !s.is_empty())
      .map_or("", String::as_str)
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

/// A respondent-provided value per language code. Values are opaque JSON so
/// that numbers, dates and multi-select arrays survive unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedValue(BTreeMap<String, serde_json::Value>);

impl LocalizedValue {
  pub fn new() -> Self { Self::default() }

  /// Same fallback rule as [`LocalizedText::get`]; `null` and `""` count as
  /// absent.
  pub fn get(&self, lang: &str) -> Option<&serde_json::Value> {
    self.resolve(lang, DEFAULT_LANGUAGE)
  }

  pub fn resolve(
    &self,
    lang: &str,
    fallback: &str,
  ) -> Option<&serde_json::Value> {
    [lang, fallback]
      .into_iter()
      .filter_map(|l| self.0.get(l))
      .find(|v| !is_blank(v))
  }

  pub fn set(&mut self, lang: impl Into<String>, value: serde_json::Value) {
    self.0.insert(lang.into(), value);
  }
}

impl<K: Into<String>> FromIterator<(K, serde_json::Value)> for LocalizedValue {
  fn from_iter<I: IntoIterator<Item = (K, serde_json::Value)>>(
    iter: I,
  ) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
  }
}

fn is_blank(value: &serde_json::Value) -> bool {
  match value {
    serde_json::Value::Null => true,
    serde_json::Value::String(s) => s.is_empty(),
    _ => false,
  }
}
