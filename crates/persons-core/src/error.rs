//! Error types for `persons-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("person has no id; assign one before saving")]
  MissingId,

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("document {id} is missing field {field:?}")]
  MissingField { id: String, field: &'static str },

  #[error("document {id} field {field:?} is not a string")]
  FieldType { id: String, field: &'static str },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("runtime error: {0}")]
  Runtime(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
