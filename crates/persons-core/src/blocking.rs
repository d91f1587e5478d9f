//! Synchronous wrapper for setup and teardown code.
//!
//! [`BlockingRepository`] drives a [`PersonRepository`] on its own
//! current-thread runtime. It must not be used from inside an async context
//! (tokio panics when a runtime is blocked on from within another), and it
//! has no place on the request path.

use futures::TryStreamExt as _;
use tokio::runtime::{Builder, Runtime};

use crate::{Result, person::Person, repository::PersonRepository};

pub struct BlockingRepository<R> {
  inner:   R,
  runtime: Runtime,
}

impl<R: PersonRepository> BlockingRepository<R> {
  pub fn new(inner: R) -> Result<Self> {
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(Self { inner, runtime })
  }

  pub fn inner(&self) -> &R { &self.inner }

  pub fn ensure_index(&self) -> Result<(), R::Error> {
    self.runtime.block_on(self.inner.ensure_index())
  }

  pub fn save(&self, person: Person) -> Result<Person, R::Error> {
    self.runtime.block_on(self.inner.save(person))
  }

  /// Drain the whole index into a `Vec`.
  pub fn find_all(&self) -> Result<Vec<Person>, R::Error> {
    self.runtime.block_on(self.inner.find_all().try_collect())
  }

  pub fn find_by_first_name(
    &self,
    first_name: &str,
  ) -> Result<Option<Person>, R::Error> {
    self.runtime.block_on(self.inner.find_by_first_name(first_name))
  }

  pub fn count(&self) -> Result<u64, R::Error> {
    self.runtime.block_on(self.inner.count())
  }

  pub fn delete_all(&self) -> Result<(), R::Error> {
    self.runtime.block_on(self.inner.delete_all())
  }
}
