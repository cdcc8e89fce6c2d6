//! Handlers for responses.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/forms/{id}/responses` | Oldest first |
//! | `POST`   | `/responses` | Body: [`Submission`]; returns 201 + the response |
//! | `GET`    | `/responses/{id}` | Response with answers in submitted order |
//! | `DELETE` | `/responses/{id}` | Cascades to answers and vectors |

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
  response::{Response, ResponseDetail},
  store::FormStore,
  submission::Submission,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /forms/{id}/responses`
pub async fn list<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<Response>>, ApiError> {
  let Path(form_id) = path?;
  let responses = service
    .list_responses(form_id)
    .await
    .map_err(ApiError::from_service)?;
  Ok(Json(responses))
}

/// `POST /responses`
pub async fn submit<S: FormStore>(
  State(service): State<AppState<S>>,
  body: Result<Json<Submission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(submission) = body?;
  let response = service
    .submit(submission)
    .await
    .map_err(ApiError::from_service)?;
  Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /responses/{id}`
pub async fn get_one<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ResponseDetail>, ApiError> {
  let Path(id) = path?;
  let detail = service
    .get_response(id)
    .await
    .map_err(ApiError::from_service)?;
  Ok(Json(detail))
}

/// `DELETE /responses/{id}`
pub async fn delete_one<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
  let Path(id) = path?;
  service
    .delete_response(id)
    .await
    .map_err(ApiError::from_service)?;
  Ok(StatusCode::NO_CONTENT)
}
