//! Person — the single document type held by the index.
//!
//! The id is the document key. It is generated by the caller (usually via
//! [`Person::new`]) before the first save and never changes afterwards.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A person record.
///
/// `birth_date` is a local date-time with no offset or zone attached; it is
/// stored and served exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub id:         String,
  pub first_name: String,
  pub last_name:  String,
  #[serde(with = "crate::codec::iso_local")]
  pub birth_date: NaiveDateTime,
}

impl Person {
  /// Build a person with a fresh random UUID as its id.
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    birth_date: NaiveDateTime,
  ) -> Self {
    Self::with_id(Uuid::new_v4().to_string(), first_name, last_name, birth_date)
  }

  /// Build a person with a caller-supplied id.
  pub fn with_id(
    id: impl Into<String>,
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    birth_date: NaiveDateTime,
  ) -> Self {
    Self {
      id: id.into(),
      first_name: first_name.into(),
      last_name: last_name.into(),
      birth_date,
    }
  }

  /// Fail with [`Error::MissingId`] unless the id is set.
  pub fn ensure_persistable(&self) -> Result<()> {
    if self.id.trim().is_empty() {
      return Err(Error::MissingId);
    }
    Ok(())
  }
}
