//! JSON REST API for the persons index.
//!
//! Exposes an axum [`Router`] backed by any
//! [`persons_core::repository::PersonRepository`], reached through a
//! [`PersonService`]. TLS and tracing layers are the caller's
//! responsibility.

pub mod error;
pub mod persons;

use axum::{Router, routing::get};
use persons_core::{repository::PersonRepository, service::PersonService};

pub use error::ApiError;

/// Build the API router for `service`.
///
/// | Method | Path | Notes |
/// |--------|------|-------|
/// | `GET`  | `/api/v1/allpersons` | JSON array, streamed |
/// | `GET`  | `/api/v1/person/{firstName}` | 404 if nobody matches |
pub fn api_router<R>(service: PersonService<R>) -> Router<()>
where
  R: PersonRepository + 'static,
{
  Router::new()
    .route("/api/v1/allpersons", get(persons::all::<R>))
    .route("/api/v1/person/{first_name}", get(persons::by_name::<R>))
    .with_state(service)
}
