//! Time related utils.

use crate::{Error, Result};
use chrono::format::{Item, Numeric, Pad};
use chrono::{NaiveDate, NaiveDateTime, Utc};

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// DATE is a time format like `20220301`.
const DATE: &[Item<'static>] = &[
    Item::Numeric(Numeric::Year, Pad::Zero),
    Item::Numeric(Numeric::Month, Pad::Zero),
    Item::Numeric(Numeric::Day, Pad::Zero),
];

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format_with_items(DATE.iter()).to_string()
}

/// ISO8601 is a time format like `20220313T072004Z`.
const ISO8601: &[Item<'static>] = &[
    Item::Numeric(Numeric::Year, Pad::Zero),
    Item::Numeric(Numeric::Month, Pad::Zero),
    Item::Numeric(Numeric::Day, Pad::Zero),
    Item::Literal("T"),
    Item::Numeric(Numeric::Hour, Pad::Zero),
    Item::Numeric(Numeric::Minute, Pad::Zero),
    Item::Numeric(Numeric::Second, Pad::Zero),
    Item::Literal("Z"),
];

/// Format time into ISO8601 basic format: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format_with_items(ISO8601.iter()).to_string()
}

/// Parse a strict ISO8601 basic timestamp like `20220313T072004Z`.
///
/// The input must be exactly `YYYYMMDD'T'HHMMSS'Z'`.
pub fn parse_iso8601(s: &str) -> Result<DateTime> {
    let bs = s.as_bytes();
    let shaped = bs.len() == 16
        && bs[8] == b'T'
        && bs[15] == b'Z'
        && bs[..8].iter().all(u8::is_ascii_digit)
        && bs[9..15].iter().all(u8::is_ascii_digit);
    if !shaped {
        return Err(Error::invalid_input(format!(
            "time {s:?} is not in YYYYMMDDTHHMMSSZ format"
        )));
    }

    NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%SZ")
        .map(|t| t.and_utc())
        .map_err(|e| {
            Error::invalid_input(format!("time {s:?} is not a valid instant")).with_source(e)
        })
}

/// Parse a strict basic date like `20220313`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_input(format!(
            "date {s:?} is not in YYYYMMDD format"
        )));
    }

    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|e| Error::invalid_input(format!("date {s:?} is not a valid day")).with_source(e))
}

/// Parse time from rfc3339 like `2019-03-01T22:08:55.000000Z`.
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::unexpected(format!("time {s:?} is not rfc3339")).with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn test_time() -> DateTime {
        Utc.with_ymd_and_hms(2019, 3, 1, 22, 8, 55)
            .single()
            .expect("time must be valid")
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(test_time()), "20190301");
    }

    #[test]
    fn test_format_iso8601() {
        assert_eq!(format_iso8601(test_time()), "20190301T220855Z");
    }

    #[test]
    fn test_parse_iso8601() {
        assert_eq!(
            parse_iso8601("20190301T220855Z").expect("must parse"),
            test_time()
        );
    }

    #[test_case("2019-03-01T22:08:55Z"; "with separators")]
    #[test_case("20190301T220855"; "missing zone")]
    #[test_case("20190301 220855Z"; "missing T")]
    #[test_case("20191301T220855Z"; "month out of range")]
    #[test_case(""; "empty")]
    fn test_parse_iso8601_rejects(input: &str) {
        assert!(parse_iso8601(input).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("20190301").expect("must parse"),
            NaiveDate::from_ymd_opt(2019, 3, 1).expect("date must be valid")
        );
        assert!(parse_date("2019031").is_err());
        assert!(parse_date("20190230").is_err());
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(
            parse_rfc3339("2019-03-01T22:08:55.000000Z").expect("must parse"),
            test_time()
        );
    }
}
