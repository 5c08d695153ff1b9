// ── Session timestamps ──
//
// The store keeps times as free-form strings. A `Timestamp` remembers the
// string exactly as received and, alongside it, the wall-clock value it
// parsed to (if any). Arithmetic uses the parsed value; anything written
// back to the store uses the raw string.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Layout produced for client-computed times (`datetime-local` form).
pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Layout used when showing a timestamp to an operator.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A date-time string from the store plus its parsed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    raw: String,
    parsed: Option<NaiveDateTime>,
}

impl Timestamp {
    /// Wrap a raw string. Empty or whitespace-only input yields `None`;
    /// unparseable input is kept with no parsed value.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_owned(),
            parsed: parse_datetime(raw),
        })
    }

    /// Build from a wall-clock value, rendered in `INPUT_FORMAT`.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self {
            raw: dt.format(INPUT_FORMAT).to_string(),
            parsed: Some(dt),
        }
    }

    /// The string exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed wall-clock value, `None` if the raw string was not understood.
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        self.parsed
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parsed {
            Some(dt) => write!(f, "{}", dt.format(DISPLAY_FORMAT)),
            None => f.write_str(&self.raw),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Parse the date-time shapes the store and operators produce.
///
/// Accepts `YYYY-MM-DDTHH:MM` with optional seconds and fraction, the same
/// with a space separator, RFC 3339 and RFC 2822. Zoned inputs are
/// shifted into the local zone so they compare with unzoned ones, which
/// are already local wall-clock time.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(to_local))
        .or_else(|| DateTime::parse_from_rfc2822(s).ok().map(to_local))
}

fn to_local(dt: DateTime<FixedOffset>) -> NaiveDateTime {
    dt.with_timezone(&Local).naive_local()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    #[test]
    fn accepts_datetime_local_and_variants() {
        assert_eq!(parse_datetime("2024-01-01T08:00"), Some(at(8, 0)));
        assert_eq!(parse_datetime("2024-01-01T08:00:00"), Some(at(8, 0)));
        assert_eq!(parse_datetime("2024-01-01 08:00"), Some(at(8, 0)));

        let frac = parse_datetime("2024-01-01 08:00:00.250").unwrap();
        assert_eq!(frac.format("%H:%M:%S%.3f").to_string(), "08:00:00.250");
    }

    fn local_of_utc(h: u32, m: u32) -> NaiveDateTime {
        Utc.from_utc_datetime(&at(h, m))
            .with_timezone(&Local)
            .naive_local()
    }

    #[test]
    fn zoned_inputs_become_local_wall_clock() {
        assert_eq!(parse_datetime("2024-01-01T10:00:00+02:00"), Some(local_of_utc(8, 0)));
        assert_eq!(parse_datetime("2024-01-01T08:00:00Z"), Some(local_of_utc(8, 0)));
        assert_eq!(
            parse_datetime("Mon, 01 Jan 2024 08:00:00 GMT"),
            Some(local_of_utc(8, 0))
        );
    }

    #[test]
    fn unzoned_entry_and_zoned_exit_share_a_clock() {
        let entry = parse_datetime("2024-01-01T08:00").unwrap();
        let exit_raw = Local
            .from_local_datetime(&at(10, 30))
            .single()
            .unwrap()
            .to_rfc3339();
        let exit = parse_datetime(&exit_raw).unwrap();

        assert_eq!(exit, at(10, 30));
        assert_eq!((exit - entry).num_minutes(), 150);
    }

    #[test]
    fn empty_is_absent_and_garbage_is_kept() {
        assert!(Timestamp::parse("").is_none());
        assert!(Timestamp::parse("   ").is_none());

        let ts = Timestamp::parse("yesterday-ish").unwrap();
        assert!(!ts.is_valid());
        assert_eq!(ts.to_string(), "yesterday-ish");
    }

    #[test]
    fn raw_string_is_preserved() {
        let ts = Timestamp::parse("2024-01-01T08:00:00.000").unwrap();
        assert_eq!(ts.raw(), "2024-01-01T08:00:00.000");
        assert_eq!(ts.to_string(), "2024-01-01 08:00");
        assert_eq!(Timestamp::from_datetime(at(10, 30)).raw(), "2024-01-01T10:30");
    }
}
