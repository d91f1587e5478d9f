//! Conversion between in-memory local date-times and their stored string
//! form.
//!
//! The codec is an explicit value handed to [`PersonMapping`] and to each
//! repository backend; there is no process-wide registration.
//!
//! [`PersonMapping`]: crate::mapping::PersonMapping

use std::fmt::Debug;

use chrono::{NaiveDateTime, Timelike as _};

use crate::{Error, Result};

/// Strategy for writing and reading a [`NaiveDateTime`] as a string.
pub trait DateTimeCodec: Send + Sync + Debug {
  /// Format `value` for storage. Never fails.
  fn encode(&self, value: NaiveDateTime) -> String;

  /// Parse a stored string back into a local date-time.
  fn decode(&self, raw: &str) -> Result<NaiveDateTime>;
}

/// ISO-8601 local date-time: `YYYY-MM-DDTHH:MM:SS[.fraction]`, no offset.
///
/// Seconds are always written. A fraction is written only when the value
/// has sub-second precision, with trailing zeros dropped. Reading also
/// accepts the minute-precision form `YYYY-MM-DDTHH:MM`; every other field
/// must be zero-padded to its full width and a fraction has 1 to 9 digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoLocalDateTime;

const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const MINUTES_FORMAT: &str = "%Y-%m-%dT%H:%M";

impl DateTimeCodec for IsoLocalDateTime {
  fn encode(&self, value: NaiveDateTime) -> String {
    let mut out = value.format("%Y-%m-%dT%H:%M:%S").to_string();
    // Leap seconds carry nanos >= 1e9; %S already printed them as :60.
    let nanos = value.nanosecond() % 1_000_000_000;
    if nanos != 0 {
      let digits = format!("{nanos:09}");
      out.push('.');
      out.push_str(digits.trim_end_matches('0'));
    }
    out
  }

  fn decode(&self, raw: &str) -> Result<NaiveDateTime> {
    // chrono accepts unpadded fields and drops fraction digits past the
    // ninth, so the layout is checked before handing over.
    if !has_local_shape(raw) {
      return Err(Error::DateParse(format!(
        "{raw:?}: expected YYYY-MM-DDTHH:MM[:SS[.fffffffff]]"
      )));
    }
    NaiveDateTime::parse_from_str(raw, SECONDS_FORMAT)
      .or_else(|_| NaiveDateTime::parse_from_str(raw, MINUTES_FORMAT))
      .map_err(|e| Error::DateParse(format!("{raw:?}: {e}")))
  }
}

fn all_digits(s: &str, len: usize) -> bool {
  s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// `[±]YYYY-MM-DDTHH:MM[:SS[.f{1,9}]]`. A year outside 0000..=9999 carries
/// a sign and at least four digits, as `%Y` writes it.
fn has_local_shape(raw: &str) -> bool {
  if !raw.is_ascii() {
    return false;
  }
  let Some((date, time)) = raw.split_once('T') else {
    return false;
  };
  if date.len() < 10 {
    return false;
  }

  let (year, month_day) = date.split_at(date.len() - 6);
  let month_day = month_day.as_bytes();
  let year_ok = match year.strip_prefix(['+', '-']) {
    Some(digits) => digits.len() >= 4 && digits.bytes().all(|b| b.is_ascii_digit()),
    None => all_digits(year, 4),
  };
  if !year_ok
    || month_day[0] != b'-'
    || month_day[3] != b'-'
    || !all_digits(&date[date.len() - 5..date.len() - 3], 2)
    || !all_digits(&date[date.len() - 2..], 2)
  {
    return false;
  }

  let (hm, rest) = time.split_at(time.len().min(5));
  if hm.len() != 5
    || hm.as_bytes()[2] != b':'
    || !all_digits(&hm[..2], 2)
    || !all_digits(&hm[3..], 2)
  {
    return false;
  }
  if rest.is_empty() {
    return true;
  }
  let Some(rest) = rest.strip_prefix(':') else {
    return false;
  };
  let (seconds, fraction) = rest.split_at(rest.len().min(2));
  if !all_digits(seconds, 2) {
    return false;
  }
  match fraction.strip_prefix('.') {
    None => fraction.is_empty(),
    Some(digits) => {
      (1..=9).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
    }
  }
}

/// Serde adapter writing and reading a [`NaiveDateTime`] through
/// [`IsoLocalDateTime`], for use with `#[serde(with = "...")]`.
pub mod iso_local {
  use chrono::NaiveDateTime;
  use serde::{Deserialize as _, Deserializer, Serializer};

  use super::{DateTimeCodec as _, IsoLocalDateTime};

  pub fn serialize<S: Serializer>(
    value: &NaiveDateTime,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&IsoLocalDateTime.encode(*value))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    IsoLocalDateTime.decode(&raw).map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, Timelike as _};

  use super::*;

  fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
      .unwrap()
      .and_hms_opt(h, mi, s)
      .unwrap()
  }

  fn is_local_iso(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 19
      && b[4] == b'-'
      && b[7] == b'-'
      && b[10] == b'T'
      && b[13] == b':'
      && b[16] == b':'
      && !s.ends_with('Z')
      && !s[19..].contains(['+', '-'])
  }

  #[test]
  fn encodes_whole_seconds_without_fraction() {
    let s = IsoLocalDateTime.encode(dt(1980, 10, 1, 10, 30, 0));
    assert_eq!(s, "1980-10-01T10:30:00");
  }

  #[test]
  fn encodes_minimal_fraction() {
    let v = NaiveDate::from_ymd_opt(1975, 11, 2)
      .unwrap()
      .and_hms_milli_opt(10, 45, 7, 500)
      .unwrap();
    assert_eq!(IsoLocalDateTime.encode(v), "1975-11-02T10:45:07.5");

    let v = NaiveDate::from_ymd_opt(2001, 1, 1)
      .unwrap()
      .and_hms_nano_opt(0, 0, 0, 1)
      .unwrap();
    assert_eq!(IsoLocalDateTime.encode(v), "2001-01-01T00:00:00.000000001");
  }

  #[test]
  fn round_trips_assorted_values() {
    let values = [
      dt(1969, 10, 1, 11, 30, 0),
      dt(1980, 10, 2, 12, 30, 0),
      dt(2000, 2, 29, 23, 59, 59),
      dt(1, 1, 1, 0, 0, 0),
      dt(9999, 12, 31, 23, 59, 59),
      NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_micro_opt(8, 5, 3, 123_456)
        .unwrap(),
    ];
    for v in values {
      let s = IsoLocalDateTime.encode(v);
      assert!(is_local_iso(&s), "not a local ISO date-time: {s}");
      assert_eq!(IsoLocalDateTime.decode(&s).unwrap(), v, "via {s}");
    }
  }

  #[test]
  fn round_trips_extreme_years_and_leap_seconds() {
    let leap = NaiveDate::from_ymd_opt(2016, 12, 31)
      .unwrap()
      .and_hms_milli_opt(23, 59, 59, 1_500)
      .unwrap();
    let values = [
      NaiveDateTime::MIN,
      NaiveDateTime::MAX,
      dt(10000, 1, 1, 0, 0, 0),
      dt(-1, 6, 1, 12, 0, 0),
      leap,
    ];
    for v in values {
      let s = IsoLocalDateTime.encode(v);
      assert_eq!(IsoLocalDateTime.decode(&s).unwrap(), v, "via {s}");
    }
    assert_eq!(IsoLocalDateTime.encode(leap), "2016-12-31T23:59:60.5");
  }

  #[test]
  fn decodes_nine_fraction_digits() {
    let v = IsoLocalDateTime.decode("1980-10-01T10:30:00.123456789").unwrap();
    assert_eq!(v.nanosecond(), 123_456_789);
  }

  #[test]
  fn decodes_minute_precision() {
    let v = IsoLocalDateTime.decode("1969-10-01T11:30").unwrap();
    assert_eq!(v, dt(1969, 10, 1, 11, 30, 0));
  }

  #[test]
  fn rejects_offsets_and_zones() {
    for raw in [
      "1980-10-01T10:30:00Z",
      "1980-10-01T10:30:00+02:00",
      "1980-10-01T10:30:00.5-05:00",
      "1980-10-01T10:30:00[Europe/Paris]",
    ] {
      assert!(
        matches!(IsoLocalDateTime.decode(raw), Err(Error::DateParse(_))),
        "accepted {raw}"
      );
    }
  }

  #[test]
  fn rejects_other_shapes() {
    for raw in [
      "",
      "1980-10-01",
      "1980-10-01 10:30:00",
      " 1980-10-01T10:30:00",
      "1980-10-01T10:30:00 ",
      "01/10/1980 10:30",
      "1980-13-01T10:30:00",
      "1980-1-1T1:2:3",
      "1980-10-1T10:30:00",
      "1980-10-01T9:30:00",
      "1980-10-01T10:3:00",
      "1980-10-01T10:30:5",
      "80-10-01T10:30:00",
      "01980-10-01T10:30:00",
      "1980-10-01T10:30:00.",
      "1980-10-01T10:30:00.1234567891",
      "1980-10-01T10:30.5",
      "1980-10-01T10:30:00:00",
      "1980-10-01T10:30:00,5",
      "1980-10-01T",
      "１９８０-10-01T10:30:00",
    ] {
      assert!(IsoLocalDateTime.decode(raw).is_err(), "accepted {raw:?}");
    }
  }
}
