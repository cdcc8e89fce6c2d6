//! Handlers for form fields.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/forms/{id}/fields` | Ordered by `field_order` |
//! | `POST`   | `/fields` | Body: [`NewFieldBody`]; returns 201 + stored field |
//! | `PUT`    | `/fields/{id}` | Body: [`FieldSpec`] |
//! | `DELETE` | `/fields/{id}` | |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use quire_core::{
  field::{FieldSpec, FormField},
  store::FormStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /forms/{id}/fields`
pub async fn list<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<FormField>>, ApiError> {
  let Path(form_id) = path?;
  let fields = service
    .list_fields(form_id)
    .await
    .map_err(ApiError::from_service)?;
  Ok(Json(fields))
}

/// JSON body accepted by `POST /fields`.
#[derive(Debug, Deserialize)]
pub struct NewFieldBody {
  pub form_id: Uuid,
  #[serde(flatten)]
  pub spec:    FieldSpec,
}

/// `POST /fields`
pub async fn create<S: FormStore>(
  State(service): State<AppState<S>>,
  body: Result<Json<NewFieldBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let field = service
    .create_field(body.form_id, body.spec)
    .await
    .map_err(ApiError::from_service)?;
  Ok((StatusCode::CREATED, Json(field)))
}

/// `PUT /fields/{id}`
pub async fn update<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<FieldSpec>, JsonRejection>,
) -> Result<Json<FormField>, ApiError> {
  let Path(id) = path?;
  let Json(spec) = body?;
  let field = service
    .update_field(id, spec)
    .await
    .map_err(ApiError::from_service)?;
  Ok(Json(field))
}

/// `DELETE /fields/{id}`
pub async fn delete_one<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
  let Path(id) = path?;
  service
    .delete_field(id)
    .await
    .map_err(ApiError::from_service)?;
  Ok(StatusCode::NO_CONTENT)
}
