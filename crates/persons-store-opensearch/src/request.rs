//! Request bodies sent to the cluster.

use persons_core::query::{FieldQuery, MatchKind};
use serde_json::{Value, json};

/// How long the cluster keeps a scroll context alive between pages.
pub const SCROLL_KEEP_ALIVE: &str = "1m";

pub fn match_all() -> Value { json!({ "query": { "match_all": {} } }) }

/// Render a [`FieldQuery`] as a search body.
pub fn field_query(query: &FieldQuery) -> Value {
  let clause = match query.kind {
    MatchKind::Analyzed => "match",
    MatchKind::Exact => "match_phrase",
  };
  json!({
    "query": {
      clause: {
        query.field.stored_name(): { "query": query.text }
      }
    }
  })
}

pub fn scroll_next(scroll_id: &str) -> Value {
  json!({ "scroll": SCROLL_KEEP_ALIVE, "scroll_id": scroll_id })
}

pub fn clear_scroll(scroll_id: &str) -> Value {
  json!({ "scroll_id": [scroll_id] })
}
