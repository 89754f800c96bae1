//! Timestamp round-trip helpers.
//!
//! Timestamps are stored as RFC-3339 text. The read side is deliberately
//! lenient: a stored value that cannot be decoded (invalid format, non-UTF-8
//! bytes, out-of-range component) reads back as `None` instead of failing the
//! whole row — a one-off bad value should degrade, not crash the read path.

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Format a timestamp for storage.
pub fn format_timestamp(value: OffsetDateTime) -> String {
   value
      .format(&Rfc3339)
      .unwrap_or_else(|_| value.to_string())
}

/// Decode a stored timestamp, returning `None` on any failure.
///
/// Accepts RFC-3339, ISO-8601 without an offset (assumed UTC), and the
/// space-separated variant SQLite's own datetime functions emit.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
   if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
      return Some(parsed);
   }
   if let Ok(parsed) = PrimitiveDateTime::parse(value, &Iso8601::DEFAULT) {
      return Some(parsed.assume_utc());
   }
   // "2026-01-02 03:04:05" → "2026-01-02T03:04:05"
   let normalized = value.replacen(' ', "T", 1);
   PrimitiveDateTime::parse(&normalized, &Iso8601::DEFAULT)
      .ok()
      .map(PrimitiveDateTime::assume_utc)
}

/// Decode a stored timestamp that arrived as raw bytes.
///
/// SQLite can hand back either text or blobs for the same column; corrupted
/// byte content decodes to `None` like any other malformed value.
pub fn parse_timestamp_bytes(value: &[u8]) -> Option<OffsetDateTime> {
   std::str::from_utf8(value).ok().and_then(parse_timestamp)
}

#[cfg(test)]
mod tests {
   use super::*;
   use time::macros::datetime;

   #[test]
   fn rfc3339_round_trip() {
      let value = datetime!(2026-02-03 10:20:30 UTC);
      let text = format_timestamp(value);
      assert_eq!(parse_timestamp(&text), Some(value));
   }

   #[test]
   fn parses_without_offset_as_utc() {
      let parsed = parse_timestamp("2026-02-03T10:20:30").unwrap();
      assert_eq!(parsed, datetime!(2026-02-03 10:20:30 UTC));
   }

   #[test]
   fn parses_space_separated_variant() {
      let parsed = parse_timestamp("2026-02-03 10:20:30").unwrap();
      assert_eq!(parsed, datetime!(2026-02-03 10:20:30 UTC));
   }

   #[test]
   fn malformed_values_decode_to_none() {
      assert_eq!(parse_timestamp(""), None);
      assert_eq!(parse_timestamp("not-a-timestamp"), None);
      assert_eq!(parse_timestamp("2026-13-45T99:99:99Z"), None);
   }

   #[test]
   fn invalid_bytes_decode_to_none() {
      assert_eq!(parse_timestamp_bytes(&[0xff, 0xfe, 0x00]), None);
      assert_eq!(
         parse_timestamp_bytes(b"2026-02-03T10:20:30Z"),
         Some(datetime!(2026-02-03 10:20:30 UTC))
      );
   }
}
