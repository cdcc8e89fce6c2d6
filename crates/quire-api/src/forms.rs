//! Handlers for `/forms` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/forms` | optional `?status=draft\|published\|closed` |
//! | `POST`   | `/forms` | Body: [`NewForm`]; returns 201 + the draft form |
//! | `GET`    | `/forms/{id}` | Single form |
//! | `PUT`    | `/forms/{id}` | Body: [`NewForm`]; closed forms are frozen |
//! | `DELETE` | `/forms/{id}` | `?cascade=true` also deletes responses |
//! | `POST`   | `/forms/{id}/publish` | Draft → Published |
//! | `POST`   | `/forms/{id}/close` | Idempotent |
//! | `GET`    | `/forms/{id}/render` | `?lang=fr`; fields resolved for one language |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use quire_core::{
  enums::FormStatus,
  form::{Form, NewForm},
  service::RenderedForm,
  store::FormStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status: Option<FormStatus>,
}

/// `GET /forms[?status=...]`
pub async fn list<S: FormStore>(
  State(service): State<AppState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Form>>, ApiError> {
  let Query(params) = params?;
  let forms = service
    .list_forms(params.status)
    .await
    .map_err(ApiError::from_service)?;
  Ok(Json(forms))
}

// ─── Create / read / edit ─────────────────────────────────────────────────────

/// `POST /forms`: returns 201 + the new draft form.
pub async fn create<S: FormStore>(
  State(service): State<AppState<S>>,
  body: Result<Json<NewForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let form = service
    .create_form(body)
    .await
    .map_err(ApiError::from_service)?;
  Ok((StatusCode::CREATED, Json(form)))
}

/// `GET /forms/{id}`
pub async fn get_one<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Form>, ApiError> {
  let Path(id) = path?;
  let form = service.get_form(id).await.map_err(ApiError::from_service)?;
  Ok(Json(form))
}

/// `PUT /forms/{id}`
pub async fn edit<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<NewForm>, JsonRejection>,
) -> Result<Json<Form>, ApiError> {
  let Path(id) = path?;
  let Json(body) = body?;
  let form = service
    .edit_form(id, body)
    .await
    .map_err(ApiError::from_service)?;
  Ok(Json(form))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
  #[serde(default)]
  pub cascade: bool,
}

/// `DELETE /forms/{id}[?cascade=true]`
pub async fn delete_one<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
  let Path(id) = path?;
  let Query(params) = params?;
  service
    .delete_form(id, params.cascade)
    .await
    .map_err(ApiError::from_service)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /forms/{id}/publish`
pub async fn publish<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Form>, ApiError> {
  let Path(id) = path?;
  let form = service.publish(id).await.map_err(ApiError::from_service)?;
  Ok(Json(form))
}

/// `POST /forms/{id}/close`
pub async fn close<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Form>, ApiError> {
  let Path(id) = path?;
  let form = service.close(id).await.map_err(ApiError::from_service)?;
  Ok(Json(form))
}

// ─── Render ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RenderParams {
  pub lang: Option<String>,
}

/// `GET /forms/{id}/render[?lang=...]`
pub async fn render<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<RenderParams>, QueryRejection>,
) -> Result<Json<RenderedForm>, ApiError> {
  let Path(id) = path?;
  let Query(params) = params?;
  let rendered = service
    .render_form(id, params.lang.as_deref())
    .await
    .map_err(ApiError::from_service)?;
  Ok(Json(rendered))
}
