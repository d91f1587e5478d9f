//! Server wiring for the persons service: configuration, demo seed, and the
//! HTTP application.

use std::{path::Path, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use persons_core::{
  codec::{DateTimeCodec, IsoLocalDateTime},
  person::Person,
  repository::PersonRepository,
  service::PersonService,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, read once at startup.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// The index cluster endpoint, e.g. `http://localhost:9200` or
  /// `localhost:9200`.
  pub index_url:  String,
  pub index_name: String,
  /// Insert the demo persons before serving.
  pub seed:       bool,
}

/// Load configuration from the TOML file at `path` (if it exists), then
/// `PERSONS_*` environment variables, over built-in defaults.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 8080)?
    .set_default("index_url", "http://localhost:9200")?
    .set_default("index_name", persons_core::mapping::INDEX_NAME)?
    .set_default("seed", true)?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("PERSONS"))
    .build()?
    .try_deserialize()
}

// ─── Seed ─────────────────────────────────────────────────────────────────────

/// The two demo records inserted at startup.
pub fn demo_persons() -> persons_core::Result<Vec<Person>> {
  let codec = IsoLocalDateTime;
  Ok(vec![
    Person::new("John", "Wick", codec.decode("1969-10-01T11:30")?),
    Person::new("Antonio", "Banderas", codec.decode("1980-10-02T12:30")?),
  ])
}

/// Save the demo records one after another, waiting for each.
pub async fn seed<R: PersonRepository>(repository: &R) -> anyhow::Result<Vec<Person>> {
  let mut saved = Vec::new();
  for person in demo_persons()? {
    let person = repository
      .save(person)
      .await
      .context("failed to save demo person")?;
    tracing::info!(id = %person.id, first_name = %person.first_name, "seeded person");
    saved.push(person);
  }
  Ok(saved)
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The API router wrapped in request tracing.
pub fn app<R>(service: PersonService<R>) -> Router
where
  R: PersonRepository + 'static,
{
  persons_api::api_router(service).layer(TraceLayer::new_for_http())
}

/// Prepare the index, optionally seed it, and serve until the process ends.
pub async fn serve<R>(repository: R, config: &ServerConfig) -> anyhow::Result<()>
where
  R: PersonRepository + 'static,
{
  repository
    .ensure_index()
    .await
    .context("failed to prepare index")?;

  if config.seed {
    seed(&repository).await?;
  }

  let app = app(PersonService::new(Arc::new(repository)));
  let address = format!("{}:{}", config.host, config.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
