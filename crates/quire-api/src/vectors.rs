//! Handlers for answer vectors.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/vectors` | Body: `[VectorInput]`; all or nothing; returns 201 |
//! | `GET`    | `/answers/{id}/vector` | The vector attached to an answer |
//! | `DELETE` | `/vectors/{id}` | |

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
  response::AnswerVector,
  store::FormStore,
  submission::VectorInput,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `POST /vectors`
pub async fn attach<S: FormStore>(
  State(service): State<AppState<S>>,
  body: Result<Json<Vec<VectorInput>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(inputs) = body?;
  let vectors = service
    .attach_vectors(inputs)
    .await
    .map_err(ApiError::from_service)?;
  Ok((StatusCode::CREATED, Json(vectors)))
}

/// `GET /answers/{id}/vector`
pub async fn for_answer<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AnswerVector>, ApiError> {
  let Path(answer_id) = path?;
  let vector = service
    .get_vector_for_answer(answer_id)
    .await
    .map_err(ApiError::from_service)?;
  Ok(Json(vector))
}

/// `DELETE /vectors/{id}`
pub async fn delete_one<S: FormStore>(
  State(service): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
  let Path(id) = path?;
  service
    .delete_vector(id)
    .await
    .map_err(ApiError::from_service)?;
  Ok(StatusCode::NO_CONTENT)
}
