//! [`MemoryIndex`] — an in-process [`PersonRepository`].
//!
//! Documents are held in their encoded `_source` form, so every write and
//! read goes through the [`PersonMapping`] and its codec exactly as with a
//! real cluster. Text matching follows the policy documented on
//! [`MatchKind`].

use std::sync::Arc;

use futures::{Stream, StreamExt as _, stream};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
  Error, Result,
  mapping::{FieldKind, PersonMapping},
  person::Person,
  query::{FieldQuery, MatchKind, analyze},
  repository::PersonRepository,
};

type Documents = Vec<(String, Value)>;

/// An index living in process memory. Insertion order is the index order.
///
/// Cloning is cheap — clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
  mapping: PersonMapping,
  docs:    Arc<RwLock<Documents>>,
}

impl MemoryIndex {
  pub fn new(mapping: PersonMapping) -> Self {
    Self {
      mapping,
      docs: Arc::default(),
    }
  }

  pub fn mapping(&self) -> &PersonMapping { &self.mapping }

  /// Score `source` against `query`; `None` means no match.
  fn score(&self, source: &Value, query: &FieldQuery) -> Result<Option<usize>> {
    let Some(stored) = source
      .get(query.field.stored_name())
      .and_then(Value::as_str)
    else {
      return Ok(None);
    };

    if query.field.kind() == FieldKind::Date {
      let codec = self.mapping.codec();
      let wanted = codec.decode(&query.text)?;
      return Ok((codec.decode(stored)? == wanted).then_some(1));
    }

    let terms = analyze(&query.text);
    if terms.is_empty() {
      return Ok(None);
    }
    let tokens = analyze(stored);

    let score = match query.kind {
      MatchKind::Analyzed => {
        let mut shared = terms.clone();
        shared.sort();
        shared.dedup();
        shared.retain(|t| tokens.contains(t));
        shared.len()
      }
      MatchKind::Exact => tokens
        .windows(terms.len())
        .any(|w| w == terms.as_slice())
        .into(),
    };
    Ok((score > 0).then_some(score))
  }
}

impl PersonRepository for MemoryIndex {
  type Error = Error;

  async fn ensure_index(&self) -> Result<()> { Ok(()) }

  async fn save(&self, person: Person) -> Result<Person> {
    person.ensure_persistable()?;
    let source = self.mapping.to_source(&person);

    let mut docs = self.docs.write().await;
    match docs.iter_mut().find(|(id, _)| *id == person.id) {
      Some((_, existing)) => *existing = source,
      None => docs.push((person.id.clone(), source)),
    }
    debug!(id = %person.id, index = %self.mapping.index(), "document saved");
    Ok(person)
  }

  async fn find_by_id(&self, id: &str) -> Result<Option<Person>> {
    let docs = self.docs.read().await;
    docs
      .iter()
      .find(|(doc_id, _)| doc_id == id)
      .map(|(doc_id, source)| self.mapping.from_source(doc_id, source))
      .transpose()
  }

  fn find_all(&self) -> impl Stream<Item = Result<Person>> + Send + 'static {
    let docs = Arc::clone(&self.docs);
    let mapping = self.mapping.clone();
    stream::once(async move { docs.read().await.clone() }).flat_map(
      move |snapshot| {
        let mapping = mapping.clone();
        stream::iter(
          snapshot
            .into_iter()
            .map(move |(id, source)| mapping.from_source(&id, &source)),
        )
      },
    )
  }

  async fn find_one(&self, query: FieldQuery) -> Result<Option<Person>> {
    let docs = self.docs.read().await;
    let mut best: Option<(usize, &(String, Value))> = None;
    for doc in docs.iter() {
      if let Some(score) = self.score(&doc.1, &query)?
        && best.is_none_or(|(top, _)| score > top)
      {
        best = Some((score, doc));
      }
    }
    best
      .map(|(_, (id, source))| self.mapping.from_source(id, source))
      .transpose()
  }

  async fn count(&self) -> Result<u64> { Ok(self.docs.read().await.len() as u64) }

  async fn delete_by_id(&self, id: &str) -> Result<bool> {
    let mut docs = self.docs.write().await;
    let before = docs.len();
    docs.retain(|(doc_id, _)| doc_id != id);
    Ok(docs.len() != before)
  }

  async fn delete_all(&self) -> Result<()> {
    self.docs.write().await.clear();
    debug!(index = %self.mapping.index(), "all documents deleted");
    Ok(())
  }
}
