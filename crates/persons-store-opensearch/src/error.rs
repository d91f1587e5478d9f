//! Error type for `persons-store-opensearch`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] persons_core::Error),

  #[error("invalid endpoint: {0}")]
  Endpoint(#[from] url::ParseError),

  #[error("transport error: {0}")]
  Transport(#[from] opensearch::Error),

  #[error("transport setup error: {0}")]
  TransportSetup(#[from] opensearch::http::transport::BuildError),

  /// The cluster answered with a non-success status.
  #[error("{op} failed with status {status}: {body}")]
  Status {
    op:     &'static str,
    status: u16,
    body:   String,
  },

  /// A scroll page arrived without a scroll id to continue from.
  #[error("scroll response is missing its scroll id")]
  MissingScrollId,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
