//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are RFC 3339 UTC strings with a fixed nanosecond precision, so
//! they sort lexically and survive a round trip unchanged. Enums use their
//! canonical string form from `quire_core::enums`. Localized maps and the
//! respondent are compact JSON. Embeddings are little-endian `f32` blobs
//! stored next to their dimension.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use quire_core::{
  field::FormField,
  form::Form,
  response::{AnswerVector, Response, ResponseAnswer},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Parse a canonical enum string read back from a column.
pub fn decode_enum<T: FromStr>(what: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
  embedding.iter().flat_map(|x| x.to_le_bytes()).collect()
}

pub fn decode_embedding(blob: &[u8], dimension: i64) -> Result<Vec<f32>> {
  let expected = usize::try_from(dimension)
    .ok()
    .and_then(|d| d.checked_mul(4))
    .filter(|&len| len == blob.len());
  if expected.is_none() {
    return Err(Error::Decode(format!(
      "embedding of {} bytes does not hold {dimension} f32 values",
      blob.len()
    )));
  }

  Ok(
    blob
      .chunks_exact(4)
      .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
      .collect(),
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Each `Raw*` type mirrors one table row column for column. `encode` builds
// it from a domain value for a write, `from_row` reads it in column order
// for a query, and `decode` turns it back into the domain value.

/// Column list matching [`RawForm::from_row`].
pub const FORM_COLUMNS: &str =
  "form_id, title, description, status, created_at, version";

#[derive(Debug, Clone)]
pub struct RawForm {
  pub form_id:     String,
  pub title:       String,
  pub description: String,
  pub status:      String,
  pub created_at:  String,
  pub version:     i64,
}

impl RawForm {
  pub fn encode(form: &Form) -> Self {
    Self {
      form_id:     encode_uuid(form.form_id),
      title:       form.title.clone(),
      description: form.description.clone(),
      status:      form.status.as_str().to_owned(),
      created_at:  encode_dt(form.created_at),
      version:     form.version,
    }
  }

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      form_id:     row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      status:      row.get(3)?,
      created_at:  row.get(4)?,
      version:     row.get(5)?,
    })
  }

  pub fn decode(self) -> Result<Form> {
    Ok(Form {
      form_id:     decode_uuid(&self.form_id)?,
      title:       self.title,
      description: self.description,
      status:      decode_enum("form status", &self.status)?,
      created_at:  decode_dt(&self.created_at)?,
      version:     self.version,
    })
  }
}

/// Column list matching [`RawField::from_row`].
pub const FIELD_COLUMNS: &str = "field_id, form_id, label, placeholder, \
                                 help_text, field_type, field_order, \
                                 required, options, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct RawField {
  pub field_id:    String,
  pub form_id:     String,
  pub label:       String,
  pub placeholder: String,
  pub help_text:   String,
  pub field_type:  String,
  pub field_order: i32,
  pub required:    bool,
  pub options:     Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawField {
  pub fn encode(field: &FormField) -> Result<Self> {
    Ok(Self {
      field_id:    encode_uuid(field.field_id),
      form_id:     encode_uuid(field.form_id),
      label:       serde_json::to_string(&field.label)?,
      placeholder: serde_json::to_string(&field.placeholder)?,
      help_text:   serde_json::to_string(&field.help_text)?,
      field_type:  field.field_type.as_str().to_owned(),
      field_order: field.field_order,
      required:    field.required,
      options:     field
        .options
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?,
      created_at:  encode_dt(field.created_at),
      updated_at:  encode_dt(field.updated_at),
    })
  }

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      field_id:    row.get(0)?,
      form_id:     row.get(1)?,
      label:       row.get(2)?,
      placeholder: row.get(3)?,
      help_text:   row.get(4)?,
      field_type:  row.get(5)?,
      field_order: row.get(6)?,
      required:    row.get(7)?,
      options:     row.get(8)?,
      created_at:  row.get(9)?,
      updated_at:  row.get(10)?,
    })
  }

  pub fn decode(self) -> Result<FormField> {
    Ok(FormField {
      field_id:    decode_uuid(&self.field_id)?,
      form_id:     decode_uuid(&self.form_id)?,
      label:       serde_json::from_str(&self.label)?,
      placeholder: serde_json::from_str(&self.placeholder)?,
      help_text:   serde_json::from_str(&self.help_text)?,
      field_type:  decode_enum("field type", &self.field_type)?,
      field_order: self.field_order,
      required:    self.required,
      options:     self
        .options
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawResponse::from_row`].
pub const RESPONSE_COLUMNS: &str =
  "response_id, form_id, respondent, status, submitted_at";

#[derive(Debug, Clone)]
pub struct RawResponse {
  pub response_id:  String,
  pub form_id:      String,
  pub respondent:   String,
  pub status:       String,
  pub submitted_at: String,
}

impl RawResponse {
  pub fn encode(response: &Response) -> Result<Self> {
    Ok(Self {
      response_id:  encode_uuid(response.response_id),
      form_id:      encode_uuid(response.form_id),
      respondent:   serde_json::to_string(&response.respondent)?,
      status:       response.status.as_str().to_owned(),
      submitted_at: encode_dt(response.submitted_at),
    })
  }

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      response_id:  row.get(0)?,
      form_id:      row.get(1)?,
      respondent:   row.get(2)?,
      status:       row.get(3)?,
      submitted_at: row.get(4)?,
    })
  }

  pub fn decode(self) -> Result<Response> {
    Ok(Response {
      response_id:  decode_uuid(&self.response_id)?,
      form_id:      decode_uuid(&self.form_id)?,
      respondent:   serde_json::from_str(&self.respondent)?,
      status:       decode_enum("response status", &self.status)?,
      submitted_at: decode_dt(&self.submitted_at)?,
    })
  }
}

/// Column list matching [`RawAnswer::from_row`].
pub const ANSWER_COLUMNS: &str = "answer_id, response_id, field_id, \
                                  field_type, value, position, created_at";

#[derive(Debug, Clone)]
pub struct RawAnswer {
  pub answer_id:   String,
  pub response_id: String,
  pub field_id:    String,
  pub field_type:  String,
  pub value:       String,
  pub position:    u32,
  pub created_at:  String,
}

impl RawAnswer {
  pub fn encode(answer: &ResponseAnswer) -> Result<Self> {
    Ok(Self {
      answer_id:   encode_uuid(answer.answer_id),
      response_id: encode_uuid(answer.response_id),
      field_id:    encode_uuid(answer.field_id),
      field_type:  answer.field_type.as_str().to_owned(),
      value:       serde_json::to_string(&answer.value)?,
      position:    answer.position,
      created_at:  encode_dt(answer.created_at),
    })
  }

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      answer_id:   row.get(0)?,
      response_id: row.get(1)?,
      field_id:    row.get(2)?,
      field_type:  row.get(3)?,
      value:       row.get(4)?,
      position:    row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn decode(self) -> Result<ResponseAnswer> {
    Ok(ResponseAnswer {
      answer_id:   decode_uuid(&self.answer_id)?,
      response_id: decode_uuid(&self.response_id)?,
      field_id:    decode_uuid(&self.field_id)?,
      field_type:  decode_enum("field type", &self.field_type)?,
      value:       serde_json::from_str(&self.value)?,
      position:    self.position,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawVector::from_row`].
pub const VECTOR_COLUMNS: &str =
  "vector_id, answer_id, embedding, dimension, model, created_at";

#[derive(Debug, Clone)]
pub struct RawVector {
  pub vector_id:  String,
  pub answer_id:  String,
  pub embedding:  Vec<u8>,
  pub dimension:  i64,
  pub model:      String,
  pub created_at: String,
}

impl RawVector {
  pub fn encode(vector: &AnswerVector) -> Self {
    Self {
      vector_id:  encode_uuid(vector.vector_id),
      answer_id:  encode_uuid(vector.answer_id),
      embedding:  encode_embedding(&vector.embedding),
      dimension:  vector.embedding.len() as i64,
      model:      vector.model.as_str().to_owned(),
      created_at: encode_dt(vector.created_at),
    }
  }

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vector_id:  row.get(0)?,
      answer_id:  row.get(1)?,
      embedding:  row.get(2)?,
      dimension:  row.get(3)?,
      model:      row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn decode(self) -> Result<AnswerVector> {
    Ok(AnswerVector {
      vector_id:  decode_uuid(&self.vector_id)?,
      answer_id:  decode_uuid(&self.answer_id)?,
      embedding:  decode_embedding(&self.embedding, self.dimension)?,
      model:      decode_enum("embedding model", &self.model)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
