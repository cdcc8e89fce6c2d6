//! [`SqliteStore`], the SQLite implementation of [`FormStore`].

use std::{path::Path, sync::Arc, time::Duration};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior, params};
use tracing::warn;
use uuid::Uuid;

use quire_core::{
  ValidationError,
  enums::FormStatus,
  field::FormField,
  form::Form,
  response::{AnswerVector, Response, ResponseAnswer},
  store::FormStore,
  submission::{ValidatedSubmission, ValidatedVectors},
};

use crate::{
  Error, Result,
  encode::{
    ANSWER_COLUMNS, FIELD_COLUMNS, FORM_COLUMNS, RESPONSE_COLUMNS, RawAnswer,
    RawField, RawForm, RawResponse, RawVector, VECTOR_COLUMNS, encode_uuid,
  },
  metrics::{MetricsSink, NoopMetrics},
  retry::RetryPolicy,
  schema::SCHEMA,
};

/// What a closure run on the database thread hands back: either a value or
/// a domain rejection. A rejection drops any open transaction, rolling it
/// back.
type Outcome<T> = std::result::Result<T, quire_core::Error>;

// ─── Options ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct StoreOptions {
  pub retry:        RetryPolicy,
  pub metrics:      Arc<dyn MetricsSink>,
  /// How long SQLite itself waits on a lock before reporting `SQLITE_BUSY`.
  pub busy_timeout: Duration,
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self {
      retry:        RetryPolicy::default(),
      metrics:      Arc::new(NoopMetrics),
      busy_timeout: Duration::from_millis(5000),
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quire store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection and metrics sink are shared.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  retry:           RetryPolicy,
  metrics:         Arc<dyn MetricsSink>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with default options.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  pub async fn open_with(
    path: impl AsRef<Path>,
    options: StoreOptions,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, options).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, StoreOptions::default()).await
  }

  async fn init(
    conn: tokio_rusqlite::Connection,
    options: StoreOptions,
  ) -> Result<Self> {
    let busy_timeout = options.busy_timeout;
    conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    Ok(Self {
      conn,
      retry: options.retry,
      metrics: options.metrics,
    })
  }

  /// Run `f` on the database thread, retrying transient lock contention per
  /// the store's [`RetryPolicy`]. `f` is cloned for each attempt.
  async fn call<T, F>(&self, op: &'static str, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<T>
      + Clone
      + Send
      + 'static,
    T: Send + 'static,
  {
    let mut attempt = 1;
    loop {
      let f = f.clone();
      let result = self
        .conn
        .call(move |conn| f(conn).map_err(tokio_rusqlite::Error::from))
        .await
        .map_err(Error::from);

      match result {
        Ok(value) => {
          self.metrics.record_call(op, true);
          return Ok(value);
        }
        Err(e) if e.is_transient() && self.retry.allows_retry(attempt) => {
          let delay = self.retry.delay_for(attempt);
          warn!(op, attempt, ?delay, error = %e, "database busy, retrying");
          self.metrics.record_retry(op);
          tokio::time::sleep(delay).await;
          attempt += 1;
        }
        Err(e) => {
          self.metrics.record_call(op, false);
          return Err(e);
        }
      }
    }
  }
}

/// Read a form's status inside the current connection or transaction.
fn form_status(
  conn: &rusqlite::Connection,
  form_id: &str,
) -> rusqlite::Result<Option<FormStatus>> {
  conn
    .query_row(
      "SELECT status FROM forms WHERE form_id = ?1",
      params![form_id],
      |row| {
        let status: String = row.get(0)?;
        status.parse().map_err(|e| {
          rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(e),
          )
        })
      },
    )
    .optional()
}

/// Refuse field writes on a missing or closed form.
fn check_fields_mutable(
  conn: &rusqlite::Connection,
  form_id: Uuid,
  action: &'static str,
) -> rusqlite::Result<Outcome<()>> {
  Ok(match form_status(conn, &encode_uuid(form_id))? {
    None => Err(quire_core::Error::FormNotFound(form_id)),
    Some(FormStatus::Closed) => Err(quire_core::Error::IllegalTransition {
      form_id,
      from: FormStatus::Closed,
      action,
    }),
    Some(_) => Ok(()),
  })
}

fn exists(
  conn: &rusqlite::Connection,
  sql: &str,
  id: &str,
) -> rusqlite::Result<bool> {
  conn.query_row(sql, params![id], |row| row.get(0))
}

// ─── FormStore impl ──────────────────────────────────────────────────────────

impl FormStore for SqliteStore {
  type Error = Error;

  // ── Forms ─────────────────────────────────────────────────────────────────

  async fn insert_form(&self, form: Form) -> Result<Form> {
    let raw = RawForm::encode(&form);

    self
      .call("insert_form", move |conn| {
        conn.execute(
          "INSERT INTO forms (form_id, title, description, status, created_at, version)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            raw.form_id,
            raw.title,
            raw.description,
            raw.status,
            raw.created_at,
            raw.version,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(form)
  }

  async fn get_form(&self, id: Uuid) -> Result<Option<Form>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawForm> = self
      .call("get_form", move |conn| {
        conn
          .query_row(
            &format!("SELECT {FORM_COLUMNS} FROM forms WHERE form_id = ?1"),
            params![id_str],
            RawForm::from_row,
          )
          .optional()
      })
      .await?;

    raw.map(RawForm::decode).transpose()
  }

  async fn list_forms(&self, status: Option<FormStatus>) -> Result<Vec<Form>> {
    let status_str = status.map(FormStatus::as_str);

    let raws: Vec<RawForm> = self
      .call("list_forms", move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FORM_COLUMNS} FROM forms
           WHERE ?1 IS NULL OR status = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        stmt
          .query_map(params![status_str], RawForm::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()
      })
      .await?;

    raws.into_iter().map(RawForm::decode).collect()
  }

  async fn update_form(&self, form: Form) -> Result<Form> {
    let raw = RawForm::encode(&form);
    let form_id = form.form_id;
    let expected = form.version;

    self
      .call("update_form", move |conn| {
        let n = conn.execute(
          "UPDATE forms
           SET title = ?2, description = ?3, status = ?4, version = version + 1
           WHERE form_id = ?1 AND version = ?5",
          params![raw.form_id, raw.title, raw.description, raw.status, expected],
        )?;
        if n == 1 {
          return Ok(Ok(()));
        }

        let found = exists(
          conn,
          "SELECT EXISTS(SELECT 1 FROM forms WHERE form_id = ?1)",
          &raw.form_id,
        )?;
        Ok(Err(if found {
          quire_core::Error::StaleForm { form_id, expected }
        } else {
          quire_core::Error::FormNotFound(form_id)
        }))
      })
      .await??;

    Ok(Form {
      version: expected + 1,
      ..form
    })
  }

  async fn delete_form(&self, id: Uuid, cascade: bool) -> Result<()> {
    let id_str = encode_uuid(id);

    self
      .call("delete_form", move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if form_status(&tx, &id_str)?.is_none() {
          return Ok(Err(quire_core::Error::FormNotFound(id)));
        }
        if !cascade
          && exists(
            &tx,
            "SELECT EXISTS(SELECT 1 FROM responses WHERE form_id = ?1)",
            &id_str,
          )?
        {
          return Ok(Err(quire_core::Error::FormHasResponses(id)));
        }

        tx.execute("DELETE FROM forms WHERE form_id = ?1", params![id_str])?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(())
  }

  // ── Fields ────────────────────────────────────────────────────────────────

  async fn insert_field(&self, field: FormField) -> Result<FormField> {
    let raw = RawField::encode(&field)?;
    let form_id = field.form_id;

    self
      .call("insert_field", move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Err(e) = check_fields_mutable(&tx, form_id, "add a field to")? {
          return Ok(Err(e));
        }

        tx.execute(
          "INSERT INTO form_fields (
             field_id, form_id, label, placeholder, help_text, field_type,
             field_order, required, options, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          params![
            raw.field_id,
            raw.form_id,
            raw.label,
            raw.placeholder,
            raw.help_text,
            raw.field_type,
            raw.field_order,
            raw.required,
            raw.options,
            raw.created_at,
            raw.updated_at,
          ],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(field)
  }

  async fn get_field(&self, id: Uuid) -> Result<Option<FormField>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawField> = self
      .call("get_field", move |conn| {
        conn
          .query_row(
            &format!("SELECT {FIELD_COLUMNS} FROM form_fields WHERE field_id = ?1"),
            params![id_str],
            RawField::from_row,
          )
          .optional()
      })
      .await?;

    raw.map(RawField::decode).transpose()
  }

  async fn update_field(&self, field: FormField) -> Result<FormField> {
    let raw = RawField::encode(&field)?;
    let field_id = field.field_id;
    let form_id = field.form_id;

    self
      .call("update_field", move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Err(e) = check_fields_mutable(&tx, form_id, "update a field of")? {
          return Ok(Err(e));
        }

        let n = tx.execute(
          "UPDATE form_fields
           SET label = ?2, placeholder = ?3, help_text = ?4, field_type = ?5,
               field_order = ?6, required = ?7, options = ?8, updated_at = ?9
           WHERE field_id = ?1",
          params![
            raw.field_id,
            raw.label,
            raw.placeholder,
            raw.help_text,
            raw.field_type,
            raw.field_order,
            raw.required,
            raw.options,
            raw.updated_at,
          ],
        )?;
        if n == 0 {
          return Ok(Err(quire_core::Error::FieldNotFound(field_id)));
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(field)
  }

  async fn delete_field(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let n = self
      .call("delete_field", move |conn| {
        conn.execute("DELETE FROM form_fields WHERE field_id = ?1", params![id_str])
      })
      .await?;

    if n == 0 {
      return Err(quire_core::Error::FieldNotFound(id).into());
    }
    Ok(())
  }

  async fn list_fields(&self, form_id: Uuid) -> Result<Vec<FormField>> {
    let id_str = encode_uuid(form_id);

    let raws: Vec<RawField> = self
      .call("list_fields", move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FIELD_COLUMNS} FROM form_fields
           WHERE form_id = ?1
           ORDER BY field_order, rowid"
        ))?;
        stmt
          .query_map(params![id_str], RawField::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()
      })
      .await?;

    raws.into_iter().map(RawField::decode).collect()
  }

  // ── Responses ─────────────────────────────────────────────────────────────

  async fn submit(&self, submission: ValidatedSubmission) -> Result<Response> {
    let record = submission.into_record(Utc::now());
    let form_id = record.response.form_id;
    let response_id = record.response.response_id;

    let response = RawResponse::encode(&record.response)?;
    let answers = record
      .answers
      .iter()
      .map(|a| Ok((a.answer_id, RawAnswer::encode(a)?)))
      .collect::<Result<Vec<_>>>()?;
    let vectors: Vec<RawVector> =
      record.vectors.iter().map(RawVector::encode).collect();

    self
      .call("submit", move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // The form may have been closed or deleted since validation.
        match form_status(&tx, &response.form_id)? {
          None => return Ok(Err(quire_core::Error::FormNotFound(form_id))),
          Some(FormStatus::Published) => {}
          Some(status) => {
            return Ok(Err(quire_core::Error::FormNotAcceptingResponses {
              form_id,
              status,
            }));
          }
        }

        // Fields may have been deleted since validation too.
        if !exists(
          &tx,
          "SELECT EXISTS(SELECT 1 FROM form_fields WHERE form_id = ?1)",
          &response.form_id,
        )? {
          return Ok(Err(quire_core::Error::from(ValidationError::NoFields)));
        }

        if exists(
          &tx,
          "SELECT EXISTS(SELECT 1 FROM responses WHERE response_id = ?1)",
          &response.response_id,
        )? {
          return Ok(Err(quire_core::Error::IdTaken(response_id)));
        }

        tx.execute(
          "INSERT INTO responses (response_id, form_id, respondent, status, submitted_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![
            response.response_id,
            response.form_id,
            response.respondent,
            response.status,
            response.submitted_at,
          ],
        )?;

        {
          let mut taken = tx.prepare(
            "SELECT EXISTS(SELECT 1 FROM response_answers WHERE answer_id = ?1)",
          )?;
          let mut insert = tx.prepare(
            "INSERT INTO response_answers (
               answer_id, response_id, field_id, field_type, value, position, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for (answer_id, a) in &answers {
            if taken.query_row(params![a.answer_id], |row| row.get(0))? {
              return Ok(Err(quire_core::Error::IdTaken(*answer_id)));
            }
            insert.execute(params![
              a.answer_id,
              a.response_id,
              a.field_id,
              a.field_type,
              a.value,
              a.position,
              a.created_at,
            ])?;
          }
        }

        if !vectors.is_empty() {
          let mut insert = tx.prepare(
            "INSERT INTO answer_vectors (
               vector_id, answer_id, embedding, dimension, model, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for v in &vectors {
            insert.execute(params![
              v.vector_id,
              v.answer_id,
              v.embedding,
              v.dimension,
              v.model,
              v.created_at,
            ])?;
          }
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(record.response)
  }

  async fn get_response(&self, id: Uuid) -> Result<Option<Response>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawResponse> = self
      .call("get_response", move |conn| {
        conn
          .query_row(
            &format!(
              "SELECT {RESPONSE_COLUMNS} FROM responses WHERE response_id = ?1"
            ),
            params![id_str],
            RawResponse::from_row,
          )
          .optional()
      })
      .await?;

    raw.map(RawResponse::decode).transpose()
  }

  async fn list_responses(&self, form_id: Uuid) -> Result<Vec<Response>> {
    let id_str = encode_uuid(form_id);

    let raws: Vec<RawResponse> = self
      .call("list_responses", move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RESPONSE_COLUMNS} FROM responses
           WHERE form_id = ?1
           ORDER BY submitted_at, rowid"
        ))?;
        stmt
          .query_map(params![id_str], RawResponse::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()
      })
      .await?;

    raws.into_iter().map(RawResponse::decode).collect()
  }

  async fn list_answers(&self, response_id: Uuid) -> Result<Vec<ResponseAnswer>> {
    let id_str = encode_uuid(response_id);

    let raws: Vec<RawAnswer> = self
      .call("list_answers", move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ANSWER_COLUMNS} FROM response_answers
           WHERE response_id = ?1
           ORDER BY position"
        ))?;
        stmt
          .query_map(params![id_str], RawAnswer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()
      })
      .await?;

    raws.into_iter().map(RawAnswer::decode).collect()
  }

  async fn delete_response(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let n = self
      .call("delete_response", move |conn| {
        conn.execute(
          "DELETE FROM responses WHERE response_id = ?1",
          params![id_str],
        )
      })
      .await?;

    if n == 0 {
      return Err(quire_core::Error::ResponseNotFound(id).into());
    }
    Ok(())
  }

  // ── Vectors ───────────────────────────────────────────────────────────────

  async fn attach_vectors(
    &self,
    vectors: ValidatedVectors,
  ) -> Result<Vec<AnswerVector>> {
    let vectors = vectors.into_vectors(Utc::now());
    let raws: Vec<(Uuid, RawVector)> = vectors
      .iter()
      .map(|v| (v.answer_id, RawVector::encode(v)))
      .collect();

    self
      .call("attach_vectors", move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        {
          let mut answer_exists = tx.prepare(
            "SELECT EXISTS(SELECT 1 FROM response_answers WHERE answer_id = ?1)",
          )?;
          let mut has_vector = tx.prepare(
            "SELECT EXISTS(SELECT 1 FROM answer_vectors WHERE answer_id = ?1)",
          )?;
          for (answer_id, v) in &raws {
            if !answer_exists.query_row(params![v.answer_id], |row| row.get(0))? {
              return Ok(Err(quire_core::Error::AnswerNotFound(*answer_id)));
            }
            if has_vector.query_row(params![v.answer_id], |row| row.get(0))? {
              return Ok(Err(quire_core::Error::VectorAlreadyAttached(*answer_id)));
            }
          }

          let mut insert = tx.prepare(
            "INSERT INTO answer_vectors (
               vector_id, answer_id, embedding, dimension, model, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (_, v) in &raws {
            insert.execute(params![
              v.vector_id,
              v.answer_id,
              v.embedding,
              v.dimension,
              v.model,
              v.created_at,
            ])?;
          }
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(vectors)
  }

  async fn get_vector_for_answer(
    &self,
    answer_id: Uuid,
  ) -> Result<Option<AnswerVector>> {
    let id_str = encode_uuid(answer_id);

    let raw: Option<RawVector> = self
      .call("get_vector_for_answer", move |conn| {
        conn
          .query_row(
            &format!(
              "SELECT {VECTOR_COLUMNS} FROM answer_vectors WHERE answer_id = ?1"
            ),
            params![id_str],
            RawVector::from_row,
          )
          .optional()
      })
      .await?;

    raw.map(RawVector::decode).transpose()
  }

  async fn delete_vector(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let n = self
      .call("delete_vector", move |conn| {
        conn.execute(
          "DELETE FROM answer_vectors WHERE vector_id = ?1",
          params![id_str],
        )
      })
      .await?;

    if n == 0 {
      return Err(quire_core::Error::VectorNotFound(id).into());
    }
    Ok(())
  }
}
