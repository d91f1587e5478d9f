//! Explicit query specifications for single-field lookups.

use crate::mapping::{FieldKind, PersonField};

/// How the query text is compared with a field's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchKind {
  /// Run both sides through the index analyzer; any shared term matches.
  /// Case-insensitive, so `lara` finds `Lara`.
  #[default]
  Analyzed,
  /// The analyzed terms must appear contiguously and in order (a phrase).
  Exact,
}

/// A lookup against one mapped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldQuery {
  pub field: PersonField,
  pub text:  String,
  pub kind:  MatchKind,
}

impl FieldQuery {
  pub fn analyzed(field: PersonField, text: impl Into<String>) -> Self {
    Self {
      field,
      text: text.into(),
      kind: MatchKind::Analyzed,
    }
  }

  pub fn exact(field: PersonField, text: impl Into<String>) -> Self {
    Self {
      field,
      text: text.into(),
      kind: MatchKind::Exact,
    }
  }

  /// `true` if the target is an analyzed text field.
  pub fn targets_text(&self) -> bool { self.field.kind() == FieldKind::Text }
}

/// Split `text` into lowercase alphanumeric terms, the way the index's
/// standard analyzer does for the fields this crate maps.
pub fn analyze(text: &str) -> Vec<String> {
  text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|t| !t.is_empty())
    .map(str::to_lowercase)
    .collect()
}
