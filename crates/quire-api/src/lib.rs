//! JSON REST API for Quire.
//!
//! Exposes an axum [`Router`] backed by a [`FormService`] over any
//! [`quire_core::store::FormStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", quire_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod fields;
pub mod forms;
pub mod responses;
pub mod vectors;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use quire_core::{service::FormService, store::FormStore};

pub use error::ApiError;

/// Shared handler state.
pub type AppState<S> = Arc<FormService<S>>;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: AppState<S>) -> Router<()>
where
  S: FormStore + 'static,
{
  Router::new()
    // Forms
    .route("/forms", get(forms::list::<S>).post(forms::create::<S>))
    .route(
      "/forms/{id}",
      get(forms::get_one::<S>)
        .put(forms::edit::<S>)
        .delete(forms::delete_one::<S>),
    )
    .route("/forms/{id}/publish", post(forms::publish::<S>))
    .route("/forms/{id}/close", post(forms::close::<S>))
    .route("/forms/{id}/render", get(forms::render::<S>))
    .route("/forms/{id}/fields", get(fields::list::<S>))
    .route("/forms/{id}/responses", get(responses::list::<S>))
    // Fields
    .route("/fields", post(fields::create::<S>))
    .route(
      "/fields/{id}",
      put(fields::update::<S>).delete(fields::delete_one::<S>),
    )
    // Responses
    .route("/responses", post(responses::submit::<S>))
    .route(
      "/responses/{id}",
      get(responses::get_one::<S>).delete(responses::delete_one::<S>),
    )
    // Vectors
    .route("/vectors", post(vectors::attach::<S>))
    .route("/vectors/{id}", delete(vectors::delete_one::<S>))
    .route("/answers/{id}/vector", get(vectors::for_answer::<S>))
    .with_state(service)
}
