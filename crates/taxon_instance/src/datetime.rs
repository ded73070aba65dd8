//! Date-time parsing and RFC 3339 rendering.
//!
//! Two input modes are supported. Strict mode accepts `YYYY-MM-DD` and
//! `YYYY-MM-DDTHH:mm:ss[.SSS](Z|±HH:MM)` only. Legacy mode additionally
//! accepts any RFC 3339 fraction length, offset-less date-times, bare years
//! and year-months; offset-less values are read at the configured UTC offset.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat, TimeZone,
    Utc,
};
use taxon_foundation::{Error, ErrorKind, Result};

/// Matches `value` against a shape where `d` is a digit and `S` a sign.
fn has_shape(value: &str, shape: &str) -> bool {
    value.len() == shape.len()
        && value.bytes().zip(shape.bytes()).all(|(v, s)| match s {
            b'd' => v.is_ascii_digit(),
            b'S' => v == b'+' || v == b'-',
            _ => v == s,
        })
}

fn is_strict(value: &str) -> bool {
    if has_shape(value, "dddd-dd-dd") {
        return true;
    }
    let (main, zone) = match value.strip_suffix('Z') {
        Some(main) => (main, "Z"),
        None if value.len() > 6 && value.is_char_boundary(value.len() - 6) => {
            value.split_at(value.len() - 6)
        }
        None => return false,
    };
    (zone == "Z" || has_shape(zone, "Sdd:dd"))
        && (has_shape(main, "dddd-dd-ddTdd:dd:dd") || has_shape(main, "dddd-dd-ddTdd:dd:dd.ddd"))
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

fn invalid(value: &str, reason: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidDateTime {
        value: value.to_string(),
        reason: reason.into(),
    })
}

/// Converts an offset in minutes east of UTC.
///
/// # Errors
///
/// Returns `InvalidArgument` for offsets of a day or more.
pub fn utc_offset(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| Error::invalid_argument(format!("UTC offset {minutes} minutes is out of range")))
}

fn midnight(value: &str, date: NaiveDate, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    at_offset(value, date.and_time(NaiveTime::MIN), offset)
}

fn at_offset(
    value: &str,
    naive: NaiveDateTime,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| invalid(value, "local time is ambiguous"))
}

/// Parses a date-time.
///
/// # Errors
///
/// Returns `InvalidDateTime` if the text is not accepted by the selected
/// mode.
pub fn parse_date_time(
    value: &str,
    strict: bool,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>> {
    if strict {
        if !is_strict(value) {
            return Err(invalid(
                value,
                "expected YYYY-MM-DD or YYYY-MM-DDTHH:mm:ss[.SSS] with Z or an offset",
            ));
        }
        if value.len() == 10 {
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|e| invalid(value, e.to_string()))?;
            return midnight(value, date, Utc.fix());
        }
        return DateTime::parse_from_rfc3339(value).map_err(|e| invalid(value, e.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return at_offset(value, naive, offset);
        }
    }
    let date = match value.len() {
        4 => value
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        7 => NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok(),
        10 => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
        _ => None,
    };
    match date {
        Some(date) => midnight(value, date, offset),
        None => Err(invalid(value, "unrecognized date-time format")),
    }
}

/// Renders a date-time as RFC 3339 with millisecond precision.
///
/// With no offset the value is rendered in UTC with a `Z` suffix.
#[must_use]
pub fn format_date_time(value: &DateTime<FixedOffset>, offset: Option<FixedOffset>) -> String {
    match offset {
        Some(offset) => value
            .with_timezone(&offset)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        None => value
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// The current time in UTC.
#[must_use]
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}
