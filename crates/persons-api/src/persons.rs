//! Handlers for the `/api/v1` person endpoints.

use std::future::ready;

use axum::{
  BoxError, Json,
  body::Body,
  extract::{Path, State},
  http::header,
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::{Stream, StreamExt as _, TryStreamExt as _, stream};
use persons_core::{
  person::Person, repository::PersonRepository, service::PersonService,
};

use crate::error::ApiError;

// ─── All ──────────────────────────────────────────────────────────────────────

/// `GET /api/v1/allpersons`
///
/// The first document is awaited before the response starts, so an
/// unreachable index is reported as a 500. A failure after that point can
/// only abort the body.
pub async fn all<R>(
  State(service): State<PersonService<R>>,
) -> Result<Response, ApiError>
where
  R: PersonRepository + 'static,
{
  let mut persons = Box::pin(service.get_all_persons());
  let first = persons.try_next().await.map_err(ApiError::store)?;

  let body = Body::from_stream(json_array(first, persons));
  Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Encode `first` followed by `rest` as the chunks of one JSON array.
fn json_array<S, E>(
  first: Option<Person>,
  rest: S,
) -> impl Stream<Item = Result<Bytes, BoxError>> + Send + 'static
where
  S: Stream<Item = Result<Person, E>> + Send + 'static,
  E: std::error::Error + Send + Sync + 'static,
{
  let Some(first) = first else {
    return stream::once(ready(Ok(Bytes::from_static(b"[]")))).left_stream();
  };

  let head = stream::once(ready(element(b'[', &first)));
  let tail = rest.map(|item| {
    let person = item.map_err(|e| {
      tracing::error!(error = %e, "person stream failed mid-response");
      BoxError::from(e)
    })?;
    element(b',', &person)
  });
  let close = stream::once(ready(Ok(Bytes::from_static(b"]"))));

  head.chain(tail).chain(close).right_stream()
}

fn element(separator: u8, person: &Person) -> Result<Bytes, BoxError> {
  let mut buf = vec![separator];
  serde_json::to_writer(&mut buf, person)?;
  Ok(Bytes::from(buf))
}

// ─── By name ──────────────────────────────────────────────────────────────────

/// `GET /api/v1/person/{firstName}`
pub async fn by_name<R>(
  State(service): State<PersonService<R>>,
  Path(first_name): Path<String>,
) -> Result<Json<Person>, ApiError>
where
  R: PersonRepository + 'static,
{
  service
    .get_person_by_name(&first_name)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("person named {first_name} not found")))
}
