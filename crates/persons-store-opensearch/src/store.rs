//! [`OpenSearchStore`] — the OpenSearch implementation of
//! [`PersonRepository`].

use futures::{Stream, TryStreamExt as _, stream};
use opensearch::{
  ClearScrollParts, CountParts, DeleteByQueryParts, DeleteParts, GetParts,
  IndexParts, OpenSearch, ScrollParts, SearchParts,
  http::{
    response::Response,
    transport::{SingleNodeConnectionPool, TransportBuilder},
  },
  indices::{IndicesCreateParts, IndicesExistsParts},
  params::Refresh,
};
use persons_core::{
  mapping::PersonMapping, person::Person, query::FieldQuery,
  repository::PersonRepository,
};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
  Error, Result, request,
  response::{
    CountResponse, DeleteByQueryResponse, GetResponse, SearchResponse,
  },
};

/// Documents fetched per scroll page by [`PersonRepository::find_all`].
pub const DEFAULT_PAGE_SIZE: i64 = 500;

/// Turn a configured endpoint into a URL. A bare `host:port` is taken to
/// mean plain HTTP.
pub fn normalize_endpoint(endpoint: &str) -> Result<Url> {
  let endpoint = endpoint.trim();
  if endpoint.contains("://") {
    Ok(Url::parse(endpoint)?)
  } else {
    Ok(Url::parse(&format!("http://{endpoint}"))?)
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A persons index held by an OpenSearch (or Elasticsearch) cluster.
///
/// Cloning is cheap — the client shares its connection pool.
#[derive(Clone)]
pub struct OpenSearchStore {
  client:    OpenSearch,
  mapping:   PersonMapping,
  page_size: i64,
}

impl OpenSearchStore {
  /// Build a store talking to the single node at `endpoint`. No request is
  /// made until the first operation.
  pub fn connect(endpoint: &str, mapping: PersonMapping) -> Result<Self> {
    let url = normalize_endpoint(endpoint)?;
    let pool = SingleNodeConnectionPool::new(url.clone());
    let transport = TransportBuilder::new(pool).disable_proxy().build()?;

    info!(url = %url, index = %mapping.index(), "created OpenSearch store");

    Ok(Self {
      client: OpenSearch::new(transport),
      mapping,
      page_size: DEFAULT_PAGE_SIZE,
    })
  }

  pub fn with_page_size(mut self, page_size: i64) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  pub fn mapping(&self) -> &PersonMapping { &self.mapping }

  #[cfg(test)]
  pub(crate) fn client(&self) -> &OpenSearch { &self.client }

  /// Fetch the page after `cursor`, or `None` once the scroll is exhausted.
  ///
  /// Any open scroll context is held by an [`OpenScroll`], so an error on
  /// the way out (or the caller dropping the stream) releases it.
  async fn next_page(
    &self,
    cursor: Cursor,
  ) -> Result<Option<(Vec<Person>, Cursor)>> {
    let response = match &cursor {
      Cursor::Done => return Ok(None),
      Cursor::Start => {
        self
          .client
          .search(SearchParts::Index(&[self.mapping.index()]))
          .scroll(request::SCROLL_KEEP_ALIVE)
          .size(self.page_size)
          .body(request::match_all())
          .send()
          .await?
      }
      Cursor::Next(scroll) => {
        self
          .client
          .scroll(ScrollParts::None)
          .body(request::scroll_next(scroll.id()))
          .send()
          .await?
      }
    };

    let page: SearchResponse =
      ensure_success(response, "scroll").await?.json().await?;
    // The response names the context to continue from; the old id is done.
    if let Cursor::Next(mut previous) = cursor {
      previous.disarm();
    }
    let scroll = page
      .scroll_id
      .clone()
      .map(|id| OpenScroll::new(self.client.clone(), id));
    let full_page = page.hits.hits.len() as i64 >= self.page_size;
    let persons = page.into_persons(&self.mapping)?;

    let next = match scroll {
      Some(scroll) if full_page => Cursor::Next(scroll),
      Some(mut scroll) => {
        clear_scroll(&self.client, &scroll.disarm()).await;
        Cursor::Done
      }
      None if full_page => return Err(Error::MissingScrollId),
      None => Cursor::Done,
    };

    if persons.is_empty() {
      return Ok(None);
    }
    debug!(count = persons.len(), "scroll page fetched");
    Ok(Some((persons, next)))
  }
}

/// Position within a `find_all` scroll.
enum Cursor {
  Start,
  Next(OpenScroll),
  Done,
}

/// A scroll context still open on the cluster.
///
/// Dropping it while armed spawns a clear-scroll request on the current
/// tokio runtime. Outside a runtime the context is left to expire after
/// [`request::SCROLL_KEEP_ALIVE`].
struct OpenScroll {
  client: OpenSearch,
  id:     Option<String>,
}

impl OpenScroll {
  fn new(client: OpenSearch, id: String) -> Self {
    Self {
      client,
      id: Some(id),
    }
  }

  fn id(&self) -> &str { self.id.as_deref().unwrap_or_default() }

  /// Stop tracking the context and hand back its id.
  fn disarm(&mut self) -> String { self.id.take().unwrap_or_default() }
}

impl Drop for OpenScroll {
  fn drop(&mut self) {
    let Some(id) = self.id.take() else { return };
    match Handle::try_current() {
      Ok(handle) => {
        let client = self.client.clone();
        handle.spawn(async move { clear_scroll(&client, &id).await });
      }
      Err(_) => debug!("no runtime to clear abandoned scroll; left to expire"),
    }
  }
}

/// Release a scroll context. Failure only costs the cluster a context
/// until it times out, so it is logged rather than returned.
async fn clear_scroll(client: &OpenSearch, scroll_id: &str) {
  let result = client
    .clear_scroll(ClearScrollParts::None)
    .body(request::clear_scroll(scroll_id))
    .send()
    .await;
  if let Err(e) = result {
    warn!(error = %e, "failed to clear scroll");
  }
}

/// Pass successful responses through; turn anything else into
/// [`Error::Status`] carrying the response body.
async fn ensure_success(response: Response, op: &'static str) -> Result<Response> {
  let status = response.status_code();
  if status.is_success() {
    return Ok(response);
  }
  let body = response.text().await.unwrap_or_default();
  error!(op, status = %status, body = %body, "index request failed");
  Err(Error::Status {
    op,
    status: status.as_u16(),
    body,
  })
}

// ─── PersonRepository ────────────────────────────────────────────────────────

impl PersonRepository for OpenSearchStore {
  type Error = Error;

  async fn ensure_index(&self) -> Result<()> {
    let index = self.mapping.index();
    let exists = self
      .client
      .indices()
      .exists(IndicesExistsParts::Index(&[index]))
      .send()
      .await?;

    if exists.status_code().is_success() {
      debug!(index, "index already exists");
      return Ok(());
    }
    if exists.status_code().as_u16() != 404 {
      ensure_success(exists, "index exists").await?;
    }

    let response = self
      .client
      .indices()
      .create(IndicesCreateParts::Index(index))
      .body(self.mapping.index_settings())
      .send()
      .await?;
    ensure_success(response, "create index").await?;

    info!(index, "created index");
    Ok(())
  }

  async fn save(&self, person: Person) -> Result<Person> {
    person.ensure_persistable()?;

    let response = self
      .client
      .index(IndexParts::IndexId(self.mapping.index(), &person.id))
      .refresh(Refresh::WaitFor)
      .body(self.mapping.to_source(&person))
      .send()
      .await?;
    ensure_success(response, "index document").await?;

    debug!(id = %person.id, "document saved");
    Ok(person)
  }

  async fn find_by_id(&self, id: &str) -> Result<Option<Person>> {
    let response = self
      .client
      .get(GetParts::IndexId(self.mapping.index(), id))
      .send()
      .await?;

    if response.status_code().as_u16() == 404 {
      return Ok(None);
    }
    let doc: GetResponse =
      ensure_success(response, "get document").await?.json().await?;
    doc.into_person(&self.mapping)
  }

  fn find_all(&self) -> impl Stream<Item = Result<Person>> + Send + 'static {
    let store = self.clone();
    stream::try_unfold(Cursor::Start, move |cursor| {
      let store = store.clone();
      async move { store.next_page(cursor).await }
    })
    .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, Error>)))
    .try_flatten()
  }

  async fn find_one(&self, query: FieldQuery) -> Result<Option<Person>> {
    let response = self
      .client
      .search(SearchParts::Index(&[self.mapping.index()]))
      .size(1)
      .body(request::field_query(&query))
      .send()
      .await?;

    let page: SearchResponse =
      ensure_success(response, "search").await?.json().await?;
    let hit = page.hits.hits.into_iter().next();
    debug!(field = query.field.stored_name(), found = hit.is_some(), "field query");
    hit.map(|hit| hit.into_person(&self.mapping)).transpose()
  }

  async fn count(&self) -> Result<u64> {
    let response = self
      .client
      .count(CountParts::Index(&[self.mapping.index()]))
      .send()
      .await?;
    let count: CountResponse =
      ensure_success(response, "count").await?.json().await?;
    Ok(count.count)
  }

  async fn delete_by_id(&self, id: &str) -> Result<bool> {
    let response = self
      .client
      .delete(DeleteParts::IndexId(self.mapping.index(), id))
      .refresh(Refresh::WaitFor)
      .send()
      .await?;

    if response.status_code().as_u16() == 404 {
      return Ok(false);
    }
    ensure_success(response, "delete document").await?;
    debug!(id, "document deleted");
    Ok(true)
  }

  async fn delete_all(&self) -> Result<()> {
    let response = self
      .client
      .delete_by_query(DeleteByQueryParts::Index(&[self.mapping.index()]))
      .refresh(true)
      .body(request::match_all())
      .send()
      .await?;
    let summary: DeleteByQueryResponse =
      ensure_success(response, "delete by query").await?.json().await?;

    info!(index = %self.mapping.index(), deleted = summary.deleted, "all documents deleted");
    Ok(())
  }
}
