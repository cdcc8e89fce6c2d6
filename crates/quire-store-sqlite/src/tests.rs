//! Integration tests for `SqliteStore` against an in-memory database.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use quire_core::{
  Classify as _, Error as CoreError, ErrorKind, ValidationError,
  enums::{EmbeddingModel, FieldType, FormStatus, ResponseStatus},
  field::{FieldOptions, FieldSpec, FormField},
  form::{Form, NewForm},
  response::Respondent,
  service::FormService,
  store::FormStore,
  submission::{AnswerInput, Submission, VectorInput},
  validate::{SubmissionPolicy, validate_submission, validate_vectors},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
  CountingMetrics, Error, RetryPolicy, SqliteStore, StoreOptions,
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn service() -> FormService<SqliteStore> { FormService::new(store().await) }

async fn count(store: &SqliteStore, table: &'static str) -> i64 {
  store
    .conn
    .call(move |conn| {
      Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
        r.get(0)
      })?)
    })
    .await
    .unwrap()
}

fn core_err(err: Error) -> CoreError {
  match err {
    Error::Core(e) => e,
    other => panic!("expected a core error, got {other:?}"),
  }
}

fn new_form(title: &str) -> NewForm {
  NewForm {
    title:       title.into(),
    description: String::new(),
  }
}

fn choices() -> FieldOptions {
  [("1", "A"), ("2", "B")]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect()
}

fn select_spec(order: i32) -> FieldSpec {
  FieldSpec {
    label: [("en", "Pick one"), ("fr", "Choisissez")]
      .into_iter()
      .collect(),
    field_type: "select".into(),
    field_order: order,
    options: Some(choices()),
    ..FieldSpec::default()
  }
}

fn text_spec(order: i32) -> FieldSpec {
  FieldSpec {
    label: [("en", "Comment")].into_iter().collect(),
    field_type: "text".into(),
    field_order: order,
    ..FieldSpec::default()
  }
}

fn respondent() -> Respondent {
  let mut r = Respondent::new();
  r.set("email", json!("a@b.com"));
  r
}

fn answer(field: &FormField, value: serde_json::Value) -> AnswerInput {
  AnswerInput {
    id:         None,
    field_id:   field.field_id,
    field_type: field.field_type.as_str().to_owned(),
    value:      [("en", value)].into_iter().collect(),
  }
}

fn submission(form: &Form, answers: Vec<AnswerInput>) -> Submission {
  Submission {
    form_id: form.form_id,
    respondent: respondent(),
    answers,
    ..Submission::default()
  }
}

fn vector(answer_id: Uuid) -> VectorInput {
  VectorInput {
    answer_id,
    embedding: vec![0.5, -0.25, 1.0],
    model_name: "text-embedding-3-small".into(),
  }
}

/// A published form with one select field and one text field.
async fn published(svc: &FormService<SqliteStore>) -> (Form, Vec<FormField>) {
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let select = svc.create_field(form.form_id, select_spec(1)).await.unwrap();
  let text = svc.create_field(form.form_id, text_spec(2)).await.unwrap();
  let form = svc.publish(form.form_id).await.unwrap();
  (form, vec![select, text])
}

// ─── Forms ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_form() {
  let s = store().await;
  let form = Form::create("Feedback", "Tell us").unwrap();
  s.insert_form(form.clone()).await.unwrap();

  let fetched = s.get_form(form.form_id).await.unwrap().unwrap();
  assert_eq!(fetched, form);
  assert!(s.get_form(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_forms_filters_by_status() {
  let svc = service().await;
  let a = svc.create_form(new_form("A")).await.unwrap();
  svc.create_form(new_form("B")).await.unwrap();
  svc.publish(a.form_id).await.unwrap();

  assert_eq!(svc.list_forms(None).await.unwrap().len(), 2);
  let published = svc.list_forms(Some(FormStatus::Published)).await.unwrap();
  assert_eq!(published.len(), 1);
  assert_eq!(published[0].form_id, a.form_id);
}

#[tokio::test]
async fn update_form_bumps_version_and_rejects_stale_writes() {
  let s = store().await;
  let form = s.insert_form(Form::create("Survey", "").unwrap()).await.unwrap();

  let mut first = form.clone();
  first.publish().unwrap();
  let stored = s.update_form(first).await.unwrap();
  assert_eq!(stored.version, 2);

  // A writer holding the old snapshot loses.
  let mut stale = form.clone();
  stale.close();
  let err = core_err(s.update_form(stale).await.unwrap_err());
  assert!(matches!(err, CoreError::StaleForm { expected: 1, .. }));
  assert_eq!(err.kind(), ErrorKind::IllegalTransition);

  let current = s.get_form(form.form_id).await.unwrap().unwrap();
  assert_eq!(current.status, FormStatus::Published);
  assert_eq!(current.version, 2);
}

#[tokio::test]
async fn update_missing_form_is_not_found() {
  let s = store().await;
  let err = s
    .update_form(Form::create("Ghost", "").unwrap())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn publish_then_close_is_idempotent() {
  let svc = service().await;
  let (form, _) = published(&svc).await;
  assert_eq!(form.status, FormStatus::Published);

  let closed = svc.close(form.form_id).await.unwrap();
  assert_eq!(closed.status, FormStatus::Closed);
  let again = svc.close(form.form_id).await.unwrap();
  assert_eq!(again.status, FormStatus::Closed);
  assert_eq!(again.version, closed.version);

  let err = svc.publish(form.form_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::IllegalTransition);
}

#[tokio::test]
async fn closed_form_cannot_be_edited() {
  let svc = service().await;
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let edited = svc.edit_form(form.form_id, new_form("Renamed")).await.unwrap();
  assert_eq!(edited.title, "Renamed");

  svc.close(form.form_id).await.unwrap();
  let err = svc
    .edit_form(form.form_id, new_form("Again"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::IllegalTransition);
}

#[tokio::test]
async fn delete_form_without_cascade_keeps_responses() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;
  svc
    .submit(submission(&form, vec![answer(&fields[0], json!("1"))]))
    .await
    .unwrap();

  let err = core_err(svc.delete_form(form.form_id, false).await.unwrap_err());
  assert!(matches!(err, CoreError::FormHasResponses(_)));
  assert_eq!(err.kind(), ErrorKind::Conflict);

  svc.delete_form(form.form_id, true).await.unwrap();
  let s = svc.store();
  assert_eq!(count(s, "forms").await, 0);
  assert_eq!(count(s, "form_fields").await, 0);
  assert_eq!(count(s, "responses").await, 0);
  assert_eq!(count(s, "response_answers").await, 0);
}

// ─── Fields ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fields_are_listed_by_order_then_insertion() {
  let svc = service().await;
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let late = svc.create_field(form.form_id, text_spec(3)).await.unwrap();
  let tie_a = svc.create_field(form.form_id, text_spec(1)).await.unwrap();
  let tie_b = svc.create_field(form.form_id, select_spec(1)).await.unwrap();

  let ids: Vec<_> = svc
    .list_fields(form.form_id)
    .await
    .unwrap()
    .into_iter()
    .map(|f| f.field_id)
    .collect();
  assert_eq!(ids, [tie_a.field_id, tie_b.field_id, late.field_id]);
}

#[tokio::test]
async fn field_round_trips_through_store() {
  let svc = service().await;
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let field = svc.create_field(form.form_id, select_spec(1)).await.unwrap();

  let fetched = svc.store().get_field(field.field_id).await.unwrap().unwrap();
  assert_eq!(fetched, field);
  assert_eq!(fetched.field_type, FieldType::Select);
  assert_eq!(fetched.label("fr"), "Choisissez");
  assert_eq!(fetched.label("de"), "Pick one");
}

#[tokio::test]
async fn select_without_options_is_missing_options() {
  let svc = service().await;
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let err = svc
    .create_field(form.form_id, FieldSpec {
      options: None,
      ..select_spec(1)
    })
    .await
    .unwrap_err();

  assert!(matches!(
    core_err(err),
    CoreError::Validation(ValidationError::MissingOptions)
  ));
  assert!(svc.list_fields(form.form_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn field_writes_on_closed_form_are_rejected_by_store() {
  let svc = service().await;
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let field = svc.create_field(form.form_id, text_spec(1)).await.unwrap();

  // Validate against the open snapshot, then close underneath.
  let stale_new = quire_core::catalog::create_field(&form, text_spec(2)).unwrap();
  let stale_edit =
    quire_core::catalog::update_field(&form, field.clone(), select_spec(1))
      .unwrap();
  svc.close(form.form_id).await.unwrap();

  let s = svc.store();
  let err = s.insert_field(stale_new).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::IllegalTransition);
  let err = s.update_field(stale_edit).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::IllegalTransition);

  let stored = s.get_field(field.field_id).await.unwrap().unwrap();
  assert_eq!(stored.field_type, FieldType::Text);
}

#[tokio::test]
async fn update_and_delete_field() {
  let svc = service().await;
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let field = svc.create_field(form.form_id, text_spec(1)).await.unwrap();

  let updated = svc
    .update_field(field.field_id, FieldSpec {
      required: true,
      ..text_spec(5)
    })
    .await
    .unwrap();
  assert_eq!(updated.field_order, 5);
  assert!(updated.required);
  assert_eq!(updated.created_at, field.created_at);

  svc.delete_field(field.field_id).await.unwrap();
  let err = svc.delete_field(field.field_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn select_scenario_end_to_end() {
  let svc = service().await;
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let field = svc.create_field(form.form_id, select_spec(1)).await.unwrap();
  svc.publish(form.form_id).await.unwrap();

  let issued = Utc::now();
  let response = svc
    .submit(submission(&form, vec![answer(&field, json!("1"))]))
    .await
    .unwrap();

  assert!(!response.response_id.is_nil());
  assert!(response.submitted_at >= issued);
  assert_eq!(response.status, ResponseStatus::Submitted);

  let detail = svc.get_response(response.response_id).await.unwrap();
  assert_eq!(detail.response, response);
  assert_eq!(detail.answers.len(), 1);
  assert_eq!(detail.answers[0].response_id, response.response_id);
  assert_eq!(detail.answers[0].field_id, field.field_id);
  assert_eq!(detail.answers[0].value.get("en"), Some(&json!("1")));
}

#[tokio::test]
async fn draft_form_rejects_submission_without_rows() {
  let svc = service().await;
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let field = svc.create_field(form.form_id, select_spec(1)).await.unwrap();

  let err = svc
    .submit(submission(&form, vec![answer(&field, json!("1"))]))
    .await
    .unwrap_err();
  assert!(matches!(
    core_err(err),
    CoreError::FormNotAcceptingResponses {
      status: FormStatus::Draft,
      ..
    }
  ));
  assert_eq!(count(svc.store(), "responses").await, 0);
}

#[tokio::test]
async fn closed_form_rejects_submission_without_rows() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;
  svc.close(form.form_id).await.unwrap();

  let err = svc
    .submit(submission(&form, vec![answer(&fields[0], json!("2"))]))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotAcceptingResponses);
  assert_eq!(count(svc.store(), "responses").await, 0);
}

#[tokio::test]
async fn published_form_without_fields_rejects_submission() {
  let svc = service().await;
  let form = svc.create_form(new_form("Empty")).await.unwrap();
  svc.publish(form.form_id).await.unwrap();

  let err = svc.submit(submission(&form, Vec::new())).await.unwrap_err();
  assert!(matches!(
    core_err(err),
    CoreError::Validation(ValidationError::NoFields)
  ));
  assert_eq!(count(svc.store(), "responses").await, 0);
}

#[tokio::test]
async fn unknown_form_is_not_found() {
  let svc = service().await;
  let ghost = Form::create("Ghost", "").unwrap();
  let err = svc.submit(submission(&ghost, Vec::new())).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn answers_come_back_in_submitted_order() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;

  let answers = vec![
    answer(&fields[1], json!("first")),
    answer(&fields[0], json!("2")),
    answer(&fields[1], json!("third")),
  ];
  let response = svc.submit(submission(&form, answers)).await.unwrap();

  let stored = svc
    .store()
    .list_answers(response.response_id)
    .await
    .unwrap();
  let values: Vec<_> = stored
    .iter()
    .map(|a| a.value.get("en").cloned())
    .collect();
  assert_eq!(values, [
    Some(json!("first")),
    Some(json!("2")),
    Some(json!("third"))
  ]);
  let positions: Vec<_> = stored.iter().map(|a| a.position).collect();
  assert_eq!(positions, [0, 1, 2]);
}

#[tokio::test]
async fn required_fields_follow_policy() {
  let svc = service().await;
  let form = svc.create_form(new_form("Survey")).await.unwrap();
  let required = svc
    .create_field(form.form_id, FieldSpec {
      required: true,
      ..text_spec(1)
    })
    .await
    .unwrap();
  let optional = svc.create_field(form.form_id, text_spec(2)).await.unwrap();
  svc.publish(form.form_id).await.unwrap();

  let partial = || submission(&form, vec![answer(&optional, json!("x"))]);
  svc.submit(partial()).await.unwrap();

  let strict = FormService::new(svc.store().clone()).with_policy(SubmissionPolicy {
    enforce_required_fields: true,
  });
  let err = strict.submit(partial()).await.unwrap_err();
  assert!(matches!(
    core_err(err),
    CoreError::Validation(ValidationError::MissingRequiredAnswer(id))
      if id == required.field_id
  ));
  assert_eq!(count(svc.store(), "responses").await, 1);
}

#[tokio::test]
async fn close_between_validation_and_write_is_caught() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;

  let validated = validate_submission(
    submission(&form, vec![answer(&fields[0], json!("1"))]),
    Some(&form),
    &fields,
    &SubmissionPolicy::default(),
  )
  .unwrap();
  svc.close(form.form_id).await.unwrap();

  let err = core_err(svc.store().submit(validated).await.unwrap_err());
  assert!(matches!(err, CoreError::FormNotAcceptingResponses {
    status: FormStatus::Closed,
    ..
  }));
  assert_eq!(count(svc.store(), "responses").await, 0);
}

#[tokio::test]
async fn field_deletion_between_validation_and_write_is_caught() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;

  let validated = validate_submission(
    submission(&form, vec![answer(&fields[0], json!("1"))]),
    Some(&form),
    &fields,
    &SubmissionPolicy::default(),
  )
  .unwrap();
  for field in &fields {
    svc.delete_field(field.field_id).await.unwrap();
  }

  let err = core_err(svc.store().submit(validated).await.unwrap_err());
  assert!(matches!(
    err,
    CoreError::Validation(ValidationError::NoFields)
  ));
  assert_eq!(count(svc.store(), "responses").await, 0);
  assert_eq!(count(svc.store(), "response_answers").await, 0);
}

#[tokio::test]
async fn failing_answer_write_rolls_back_whole_submission() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;

  svc
    .store()
    .conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER fail_second_answer
         BEFORE INSERT ON response_answers
         WHEN NEW.position = 1
         BEGIN SELECT RAISE(ABORT, 'boom'); END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let answers = vec![
    answer(&fields[0], json!("1")),
    answer(&fields[1], json!("never stored")),
  ];
  let err = svc.submit(submission(&form, answers)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Store);
  assert!(!err.is_transient());

  assert_eq!(count(svc.store(), "responses").await, 0);
  assert_eq!(count(svc.store(), "response_answers").await, 0);
}

#[tokio::test]
async fn reused_answer_id_is_a_conflict() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;
  let id = Uuid::new_v4();
  let with_id = || {
    let mut a = answer(&fields[1], json!("hi"));
    a.id = Some(id);
    submission(&form, vec![a])
  };

  svc.submit(with_id()).await.unwrap();
  let err = svc.submit(with_id()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert_eq!(count(svc.store(), "responses").await, 1);
}

#[tokio::test]
async fn delete_response_cascades() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;
  let answer_id = Uuid::new_v4();
  let mut a = answer(&fields[1], json!("embed me"));
  a.id = Some(answer_id);
  let response = svc
    .submit(Submission {
      vectors: vec![vector(answer_id)],
      ..submission(&form, vec![a, answer(&fields[0], json!("1"))])
    })
    .await
    .unwrap();
  assert_eq!(count(svc.store(), "answer_vectors").await, 1);

  svc.delete_response(response.response_id).await.unwrap();
  assert_eq!(count(svc.store(), "response_answers").await, 0);
  assert_eq!(count(svc.store(), "answer_vectors").await, 0);

  let err = svc.get_response(response.response_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Vectors ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn vectors_submitted_with_answers_are_stored() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;
  let answer_id = Uuid::new_v4();
  let mut a = answer(&fields[1], json!("hello"));
  a.id = Some(answer_id);

  svc
    .submit(Submission {
      vectors: vec![vector(answer_id)],
      ..submission(&form, vec![a])
    })
    .await
    .unwrap();

  let v = svc.get_vector_for_answer(answer_id).await.unwrap();
  assert_eq!(v.answer_id, answer_id);
  assert_eq!(v.embedding, vec![0.5, -0.25, 1.0]);
  assert_eq!(v.dimension(), 3);
  assert_eq!(v.model, EmbeddingModel::TextEmbedding3Small);
}

#[tokio::test]
async fn attach_vectors_to_existing_answers() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;
  let response = svc
    .submit(submission(&form, vec![
      answer(&fields[0], json!("1")),
      answer(&fields[1], json!("text")),
    ]))
    .await
    .unwrap();
  let answers = svc.store().list_answers(response.response_id).await.unwrap();

  let attached = svc
    .attach_vectors(answers.iter().map(|a| vector(a.answer_id)).collect())
    .await
    .unwrap();
  assert_eq!(attached.len(), 2);
  assert_eq!(count(svc.store(), "answer_vectors").await, 2);

  // One vector per answer.
  let err = svc
    .attach_vectors(vec![vector(answers[0].answer_id)])
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::VectorAlreadyAttached(_)));

  svc.delete_vector(attached[0].vector_id).await.unwrap();
  svc
    .attach_vectors(vec![vector(answers[0].answer_id)])
    .await
    .unwrap();
}

#[tokio::test]
async fn attach_is_all_or_nothing() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;
  let response = svc
    .submit(submission(&form, vec![answer(&fields[0], json!("1"))]))
    .await
    .unwrap();
  let answers = svc.store().list_answers(response.response_id).await.unwrap();

  let err = svc
    .attach_vectors(vec![vector(answers[0].answer_id), vector(Uuid::new_v4())])
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::AnswerNotFound(_)));
  assert_eq!(count(svc.store(), "answer_vectors").await, 0);
}

#[tokio::test]
async fn empty_embedding_is_rejected_before_store() {
  let svc = service().await;
  let err = svc
    .attach_vectors(vec![VectorInput {
      embedding: Vec::new(),
      ..vector(Uuid::new_v4())
    }])
    .await
    .unwrap_err();
  assert_eq!(err.to_string(), "validation error: missing embedding");
}

#[tokio::test]
async fn store_enforces_one_vector_per_answer() {
  let svc = service().await;
  let (form, fields) = published(&svc).await;
  let response = svc
    .submit(submission(&form, vec![answer(&fields[0], json!("1"))]))
    .await
    .unwrap();
  let answer_id = svc.store().list_answers(response.response_id).await.unwrap()
    [0]
  .answer_id;

  let s = svc.store();
  s.attach_vectors(validate_vectors(vec![vector(answer_id)]).unwrap())
    .await
    .unwrap();
  let err = s
    .attach_vectors(validate_vectors(vec![vector(answer_id)]).unwrap())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

// ─── Retry & metrics ─────────────────────────────────────────────────────────

fn temp_db() -> std::path::PathBuf {
  std::env::temp_dir().join(format!("quire-test-{}.db", Uuid::new_v4()))
}

async fn contended_store(
  path: &std::path::Path,
  retry: RetryPolicy,
) -> (SqliteStore, Arc<CountingMetrics>) {
  let metrics = Arc::new(CountingMetrics::new());
  let store = SqliteStore::open_with(path, StoreOptions {
    retry,
    metrics: metrics.clone(),
    busy_timeout: Duration::ZERO,
  })
  .await
  .unwrap();
  (store, metrics)
}

#[tokio::test]
async fn busy_database_is_retried_then_reported() {
  let path = temp_db();
  let (s, metrics) = contended_store(&path, RetryPolicy {
    max_attempts: 3,
    base_delay:   Duration::from_millis(1),
  })
  .await;

  let blocker = rusqlite::Connection::open(&path).unwrap();
  blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

  let err = s
    .insert_form(Form::create("Blocked", "").unwrap())
    .await
    .unwrap_err();
  assert!(err.is_transient());
  assert_eq!(err.kind(), ErrorKind::Store);

  let snap = metrics.snapshot();
  assert_eq!(snap.calls, 1);
  assert_eq!(snap.failures, 1);
  assert_eq!(snap.retries, 2);

  blocker.execute_batch("COMMIT").unwrap();
  s.insert_form(Form::create("Free", "").unwrap()).await.unwrap();
  assert_eq!(metrics.snapshot().calls, 2);
  assert_eq!(metrics.snapshot().failures, 1);

  drop(blocker);
  let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn busy_database_recovers_within_retry_budget() {
  let path = temp_db();
  let (s, metrics) = contended_store(&path, RetryPolicy {
    max_attempts: 10,
    base_delay:   Duration::from_millis(20),
  })
  .await;

  let blocker = rusqlite::Connection::open(&path).unwrap();
  blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

  let writer = {
    let s = s.clone();
    tokio::spawn(async move {
      s.insert_form(Form::create("Eventually", "").unwrap()).await
    })
  };
  tokio::time::sleep(Duration::from_millis(50)).await;
  blocker.execute_batch("COMMIT").unwrap();

  writer.await.unwrap().unwrap();
  let snap = metrics.snapshot();
  assert_eq!(snap.failures, 0);
  assert!(snap.retries >= 1);

  drop(blocker);
  let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn domain_rejections_are_not_retried() {
  let metrics = Arc::new(CountingMetrics::new());
  let path = temp_db();
  let s = SqliteStore::open_with(&path, StoreOptions {
    metrics: metrics.clone(),
    ..StoreOptions::default()
  })
  .await
  .unwrap();

  let err = s.delete_form(Uuid::new_v4(), false).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert_eq!(metrics.snapshot().retries, 0);

  let _ = std::fs::remove_file(&path);
}
