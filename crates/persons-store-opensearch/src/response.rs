//! Response shapes read back from the cluster.

use persons_core::{mapping::PersonMapping, person::Person};
use serde::Deserialize;
use serde_json::Value;

use crate::Result;

/// A search or scroll page.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
  #[serde(rename = "_scroll_id")]
  pub scroll_id: Option<String>,
  pub hits:      Hits,
}

#[derive(Debug, Deserialize)]
pub struct Hits {
  pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
  #[serde(rename = "_id")]
  pub id:     String,
  #[serde(rename = "_source")]
  pub source: Value,
}

/// A single-document GET.
#[derive(Debug, Deserialize)]
pub struct GetResponse {
  #[serde(rename = "_id")]
  pub id:     String,
  pub found:  bool,
  #[serde(rename = "_source", default)]
  pub source: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CountResponse {
  pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteByQueryResponse {
  #[serde(default)]
  pub deleted: u64,
}

impl Hit {
  pub fn into_person(self, mapping: &PersonMapping) -> Result<Person> {
    Ok(mapping.from_source(&self.id, &self.source)?)
  }
}

impl GetResponse {
  pub fn into_person(self, mapping: &PersonMapping) -> Result<Option<Person>> {
    match self.source {
      Some(source) if self.found => Ok(Some(mapping.from_source(&self.id, &source)?)),
      _ => Ok(None),
    }
  }
}

impl SearchResponse {
  pub fn into_persons(self, mapping: &PersonMapping) -> Result<Vec<Person>> {
    self
      .hits
      .hits
      .into_iter()
      .map(|hit| hit.into_person(mapping))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use serde_json::json;

  use super::*;
  use crate::Error;

  fn page() -> Value {
    json!({
      "_scroll_id": "scroll-1",
      "took": 3,
      "timed_out": false,
      "hits": {
        "total": { "value": 2, "relation": "eq" },
        "max_score": 1.0,
        "hits": [
          {
            "_index": "persons",
            "_id": "a",
            "_score": 1.0,
            "_source": {
              "firstName": "Lara",
              "lastName": "Croft",
              "birthDate": "1980-10-01T10:30:00"
            }
          },
          {
            "_index": "persons",
            "_id": "b",
            "_score": 1.0,
            "_source": {
              "firstName": "Bruce",
              "lastName": "Wayne",
              "birthDate": "1975-11-02T10:45:00"
            }
          }
        ]
      }
    })
  }

  #[test]
  fn parses_a_scroll_page() {
    let resp: SearchResponse = serde_json::from_value(page()).unwrap();
    assert_eq!(resp.scroll_id.as_deref(), Some("scroll-1"));

    let persons = resp.into_persons(&PersonMapping::default()).unwrap();
    assert_eq!(persons.len(), 2);
    assert_eq!(persons[0].id, "a");
    assert_eq!(
      persons[1].birth_date,
      NaiveDate::from_ymd_opt(1975, 11, 2)
        .unwrap()
        .and_hms_opt(10, 45, 0)
        .unwrap()
    );
  }

  #[test]
  fn get_not_found_is_none() {
    let resp: GetResponse = serde_json::from_value(json!({
      "_index": "persons",
      "_id": "missing",
      "found": false
    }))
    .unwrap();
    assert!(resp.into_person(&PersonMapping::default()).unwrap().is_none());
  }

  #[test]
  fn bad_stored_date_is_a_core_error() {
    let mut body = page();
    body["hits"]["hits"][0]["_source"]["birthDate"] = json!("1980-10-01T10:30:00Z");
    let resp: SearchResponse = serde_json::from_value(body).unwrap();
    let err = resp.into_persons(&PersonMapping::default()).unwrap_err();
    assert!(matches!(err, Error::Core(persons_core::Error::DateParse(_))));
  }

  #[test]
  fn parses_count_and_delete_by_query() {
    let count: CountResponse =
      serde_json::from_value(json!({ "count": 2, "_shards": {} })).unwrap();
    assert_eq!(count.count, 2);

    let deleted: DeleteByQueryResponse =
      serde_json::from_value(json!({ "took": 5, "deleted": 2, "failures": [] }))
        .unwrap();
    assert_eq!(deleted.deleted, 2);
  }
}
