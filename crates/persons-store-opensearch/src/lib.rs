//! OpenSearch backend for the persons index.
//!
//! Talks to a single cluster endpoint over HTTP through the [`opensearch`]
//! client. Works against Elasticsearch 7.x as well, since only the common
//! document, search, scroll and delete-by-query APIs are used.

mod request;
mod response;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_PAGE_SIZE, OpenSearchStore, normalize_endpoint};

#[cfg(test)]
mod tests;
