//! The `PersonRepository` trait.
//!
//! The trait is implemented by index backends (e.g.
//! `persons-store-opensearch`, or the in-process [`MemoryIndex`]). Higher
//! layers (`persons-api`, `persons-server`) depend on this abstraction, not
//! on any concrete backend.
//!
//! [`MemoryIndex`]: crate::memory::MemoryIndex

use std::future::Future;

use futures::Stream;

use crate::{
  mapping::PersonField,
  person::Person,
  query::FieldQuery,
};

/// Abstraction over an index holding [`Person`] documents.
///
/// Every read and write is non-blocking. Failures reaching the index are
/// returned as `Err` through the operation's own future or stream; nothing
/// is retried. A lookup that finds nothing yields `None`, not an error.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PersonRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create the index with its field mapping if it does not exist yet.
  /// Called once at startup.
  fn ensure_index(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Create or replace the document keyed by `person.id`. Last write wins.
  ///
  /// Fails without touching the index if the id is empty.
  fn save(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Fetch a document by key. Returns `None` if absent.
  fn find_by_id<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Every document in the index, in index-defined order.
  ///
  /// The stream is lazy, finite, and owns everything it needs, so it can
  /// outlive the borrow of `self`.
  fn find_all(
    &self,
  ) -> impl Stream<Item = Result<Person, Self::Error>> + Send + 'static;

  /// The best match for `query`, if any.
  fn find_one(
    &self,
    query: FieldQuery,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// At most one document whose first name matches `first_name` under
  /// analyzed text matching.
  fn find_by_first_name(
    &self,
    first_name: &str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_ {
    self.find_one(FieldQuery::analyzed(PersonField::FirstName, first_name))
  }

  /// Number of documents in the index.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Remove one document. Returns `false` if it did not exist.
  fn delete_by_id<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove every document. Irreversible; meant for test teardown.
  fn delete_all(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
