//! Index mapping for [`Person`] documents.
//!
//! Declares which stored field each attribute lands in, how the index should
//! type it, and converts between a [`Person`] and its `_source` JSON.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::{
  Error, Result,
  codec::{DateTimeCodec, IsoLocalDateTime},
  person::Person,
};

/// The default index name.
pub const INDEX_NAME: &str = "persons";

/// Accepted formats for the `birthDate` date field, in index notation.
pub const DATE_FORMATS: &str =
  "date_hour_minute_second_fraction||date_hour_minute_second||date_hour_minute";

// ─── Fields ──────────────────────────────────────────────────────────────────

/// How a field is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  /// Analyzed full text.
  Text,
  /// Date, stored in the codec's string form.
  Date,
}

/// The mapped, non-key fields of a [`Person`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonField {
  FirstName,
  LastName,
  BirthDate,
}

impl PersonField {
  pub const ALL: [PersonField; 3] =
    [PersonField::FirstName, PersonField::LastName, PersonField::BirthDate];

  /// The field name inside the stored document.
  pub fn stored_name(self) -> &'static str {
    match self {
      PersonField::FirstName => "firstName",
      PersonField::LastName => "lastName",
      PersonField::BirthDate => "birthDate",
    }
  }

  pub fn kind(self) -> FieldKind {
    match self {
      PersonField::FirstName | PersonField::LastName => FieldKind::Text,
      PersonField::BirthDate => FieldKind::Date,
    }
  }
}

// ─── Mapping ─────────────────────────────────────────────────────────────────

/// Index name plus the codec used for date fields.
///
/// Cloning is cheap; the codec is reference-counted.
#[derive(Debug, Clone)]
pub struct PersonMapping {
  index: String,
  codec: Arc<dyn DateTimeCodec>,
}

impl Default for PersonMapping {
  fn default() -> Self { Self::new(INDEX_NAME, Arc::new(IsoLocalDateTime)) }
}

impl PersonMapping {
  pub fn new(index: impl Into<String>, codec: Arc<dyn DateTimeCodec>) -> Self {
    Self {
      index: index.into(),
      codec,
    }
  }

  pub fn index(&self) -> &str { &self.index }

  pub fn codec(&self) -> &Arc<dyn DateTimeCodec> { &self.codec }

  /// Body for the index-creation request.
  pub fn index_settings(&self) -> Value {
    let mut properties = Map::new();
    for field in PersonField::ALL {
      let spec = match field.kind() {
        FieldKind::Text => json!({ "type": "text" }),
        FieldKind::Date => json!({ "type": "date", "format": DATE_FORMATS }),
      };
      properties.insert(field.stored_name().to_owned(), spec);
    }
    json!({ "mappings": { "properties": properties } })
  }

  /// Write path: the `_source` document for `person`. The id is the document
  /// key and is not repeated in the source.
  pub fn to_source(&self, person: &Person) -> Value {
    let mut source = Map::new();
    for field in PersonField::ALL {
      let value = match field {
        PersonField::FirstName => person.first_name.clone(),
        PersonField::LastName => person.last_name.clone(),
        PersonField::BirthDate => self.codec.encode(person.birth_date),
      };
      source.insert(field.stored_name().to_owned(), Value::String(value));
    }
    Value::Object(source)
  }

  /// Read path: hydrate a [`Person`] from a document key and its `_source`.
  pub fn from_source(&self, id: &str, source: &Value) -> Result<Person> {
    let birth_raw = string_field(id, source, PersonField::BirthDate)?;
    Ok(Person {
      id:         id.to_owned(),
      first_name: string_field(id, source, PersonField::FirstName)?.to_owned(),
      last_name:  string_field(id, source, PersonField::LastName)?.to_owned(),
      birth_date: self.codec.decode(birth_raw)?,
    })
  }
}

fn string_field<'a>(
  id: &str,
  source: &'a Value,
  field: PersonField,
) -> Result<&'a str> {
  let name = field.stored_name();
  match source.get(name) {
    None | Some(Value::Null) => Err(Error::MissingField {
      id:    id.to_owned(),
      field: name,
    }),
    Some(Value::String(s)) => Ok(s),
    Some(_) => Err(Error::FieldType {
      id:    id.to_owned(),
      field: name,
    }),
  }
}
