//! Integration tests for `OpenSearchStore` against a live cluster.
//!
//! Each test starts a single-node Elasticsearch container and needs Docker,
//! so they are ignored by default; run them with `cargo test -- --ignored`.
//! Setting `PERSONS_TEST_INDEX_URL` (e.g. `localhost:9200`) points them at an
//! existing node instead. Every test works in its own throwaway index.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use futures::{StreamExt as _, TryStreamExt as _};
use opensearch::indices::{IndicesDeleteParts, IndicesStatsParts};
use persons_core::{
  mapping::{PersonField, PersonMapping},
  person::Person,
  query::FieldQuery,
  repository::PersonRepository,
};
use testcontainers_modules::{
  elastic_search::ElasticSearch,
  testcontainers::{ContainerAsync, runners::AsyncRunner as _},
};
use uuid::Uuid;

use crate::OpenSearchStore;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
  NaiveDate::from_ymd_opt(y, mo, d)
    .unwrap()
    .and_hms_opt(h, mi, 0)
    .unwrap()
}

fn lara() -> Person { Person::new("Lara", "Croft", at(1980, 10, 1, 10, 30)) }

fn bruce() -> Person { Person::new("Bruce", "Wayne", at(1975, 11, 2, 10, 45)) }

/// A store on a fresh index seeded with Lara and Bruce. Holds the container
/// (when one was started) so the node lives as long as the test.
struct Fixture {
  store:      OpenSearchStore,
  _container: Option<ContainerAsync<ElasticSearch>>,
}

impl Fixture {
  async fn seeded() -> Self {
    let (endpoint, container) = match std::env::var("PERSONS_TEST_INDEX_URL") {
      Ok(endpoint) => (endpoint, None),
      Err(_) => {
        let node = ElasticSearch::default()
          .start()
          .await
          .expect("start elasticsearch container");
        let host = node.get_host().await.expect("container host");
        let port = node.get_host_port_ipv4(9200).await.expect("container port");
        (format!("http://{host}:{port}"), Some(node))
      }
    };

    let index = format!("persons_test_{}", Uuid::new_v4().simple());
    let mapping =
      PersonMapping::new(index, PersonMapping::default().codec().clone());
    let store = OpenSearchStore::connect(&endpoint, mapping)
      .expect("store")
      .with_page_size(1);

    store.ensure_index().await.expect("ensure index");
    store.save(lara()).await.unwrap();
    store.save(bruce()).await.unwrap();

    Self {
      store,
      _container: container,
    }
  }

  async fn open_scroll_contexts(&self) -> u64 {
    let stats: serde_json::Value = self
      .store
      .client()
      .indices()
      .stats(IndicesStatsParts::IndexMetric(
        &[self.store.mapping().index()],
        &["search"],
      ))
      .send()
      .await
      .unwrap()
      .json()
      .await
      .unwrap();
    stats["_all"]["total"]["search"]["scroll_current"]
      .as_u64()
      .unwrap_or_default()
  }

  async fn drop_index(self) {
    self
      .store
      .client()
      .indices()
      .delete(IndicesDeleteParts::Index(&[self.store.mapping().index()]))
      .send()
      .await
      .unwrap();
  }
}

#[tokio::test]
#[ignore = "starts an Elasticsearch container; needs Docker"]
async fn find_all_pages_through_every_document() {
  let fx = Fixture::seeded().await;

  let all: Vec<Person> = fx.store.find_all().try_collect().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(fx.open_scroll_contexts().await, 0);

  fx.drop_index().await;
}

#[tokio::test]
#[ignore = "starts an Elasticsearch container; needs Docker"]
async fn abandoned_find_all_releases_its_scroll() {
  let fx = Fixture::seeded().await;

  let mut all = Box::pin(fx.store.find_all());
  assert!(all.next().await.unwrap().is_ok());
  assert_eq!(fx.open_scroll_contexts().await, 1);
  drop(all);

  let mut open = 1;
  for _ in 0..50 {
    open = fx.open_scroll_contexts().await;
    if open == 0 {
      break;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
  }
  assert_eq!(open, 0);

  fx.drop_index().await;
}

#[tokio::test]
#[ignore = "starts an Elasticsearch container; needs Docker"]
async fn save_then_fetch_by_id() {
  let fx = Fixture::seeded().await;

  let person = Person::new("Antonio", "Banderas", at(1980, 10, 2, 12, 30));
  fx.store.save(person.clone()).await.unwrap();
  let fetched = fx.store.find_by_id(&person.id).await.unwrap();
  assert_eq!(fetched, Some(person));
  assert!(fx.store.find_by_id("missing").await.unwrap().is_none());

  fx.drop_index().await;
}

#[tokio::test]
#[ignore = "starts an Elasticsearch container; needs Docker"]
async fn find_by_first_name_uses_analyzed_matching() {
  let fx = Fixture::seeded().await;

  let person = fx.store.find_by_first_name("lara").await.unwrap().unwrap();
  assert_eq!(person.first_name, "Lara");
  assert_eq!(person.last_name, "Croft");
  assert_eq!(person.birth_date, at(1980, 10, 1, 10, 30));

  assert!(fx.store.find_by_first_name("Selina").await.unwrap().is_none());

  let q = FieldQuery::exact(PersonField::LastName, "wayne");
  assert_eq!(fx.store.find_one(q).await.unwrap().unwrap().first_name, "Bruce");

  fx.drop_index().await;
}

#[tokio::test]
#[ignore = "starts an Elasticsearch container; needs Docker"]
async fn deletes_remove_documents() {
  let fx = Fixture::seeded().await;

  let extra = lara();
  fx.store.save(extra.clone()).await.unwrap();
  assert!(fx.store.delete_by_id(&extra.id).await.unwrap());
  assert!(!fx.store.delete_by_id(&extra.id).await.unwrap());
  assert_eq!(fx.store.count().await.unwrap(), 2);

  fx.store.delete_all().await.unwrap();
  let all: Vec<Person> = fx.store.find_all().try_collect().await.unwrap();
  assert!(all.is_empty());

  fx.drop_index().await;
}
