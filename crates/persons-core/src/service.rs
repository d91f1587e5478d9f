//! `PersonService` — the read facade the HTTP layer talks to.

use std::sync::Arc;

use futures::Stream;

use crate::{person::Person, repository::PersonRepository};

/// Thin pass-through over a [`PersonRepository`].
pub struct PersonService<R> {
  repository: Arc<R>,
}

impl<R> Clone for PersonService<R> {
  fn clone(&self) -> Self {
    Self {
      repository: Arc::clone(&self.repository),
    }
  }
}

impl<R: PersonRepository> PersonService<R> {
  pub fn new(repository: Arc<R>) -> Self { Self { repository } }

  pub fn repository(&self) -> &Arc<R> { &self.repository }

  /// All persons in the index, streamed.
  pub fn get_all_persons(
    &self,
  ) -> impl Stream<Item = Result<Person, R::Error>> + Send + 'static {
    self.repository.find_all()
  }

  /// The person whose first name matches `first_name`, if any.
  pub async fn get_person_by_name(
    &self,
    first_name: &str,
  ) -> Result<Option<Person>, R::Error> {
    self.repository.find_by_first_name(first_name).await
  }
}
