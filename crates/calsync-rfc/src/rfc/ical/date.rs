//! Date normalization between wall-clock timestamps and absolute UTC instants.
//!
//! Event dates are stored internally as ISO 8601 UTC strings
//! (`2014-09-03T09:00:00.000Z`) and written on the wire in the compact form
//! (`20140903T090000Z`). Every function here is pure.

use std::str::FromStr;

use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, SubsecRound, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;

/// Error during date normalization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// The value is not a recognizable timestamp, or names a local time that
    /// does not exist in its timezone.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

pub type DateResult<T> = std::result::Result<T, DateError>;

const COMPACT_DATETIME: &str = "%Y%m%dT%H%M%S";
const COMPACT_DATE: &str = "%Y%m%d";
const COMPACT_UTC_OUTPUT: &str = "%Y%m%dT%H%M%SZ";
const ISO_LOCAL_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%.f";
const ISO_LOCAL_DATE: &str = "%Y-%m-%d";

/// ## Summary
/// Converts a compact timestamp (`YYYYMMDDTHHMMSS[Z]` or `YYYYMMDD`) to a UTC
/// instant.
///
/// With a `tzid` the wall-clock value is read in that timezone; without one it
/// is taken as UTC, and a trailing `Z` is accepted and ignored.
///
/// ## Errors
/// Returns `InvalidTimestamp` for unparsable or non-existent local times and
/// `UnknownTimezone` when `tzid` cannot be resolved.
pub fn from_local(compact: &str, tzid: Option<&str>) -> DateResult<DateTime<Utc>> {
    let local = parse_compact(compact)?;

    match tzid {
        Some(tzid) => local_to_utc(local, tzid),
        None => Ok(Utc.from_utc_datetime(&local)),
    }
}

/// ## Summary
/// Re-derives an instant from an ISO 8601 value, truncated to whole minutes.
///
/// A value with an offset or `Z` already names an instant and keeps it;
/// `tzid` only gives the zone of an offset-less value, which is otherwise
/// assumed UTC. Re-deriving a normalized date in its original zone is
/// therefore a no-op.
///
/// ## Errors
/// Returns `InvalidTimestamp` for unparsable values and `UnknownTimezone` when
/// `tzid` cannot be resolved.
pub fn from_iso_with_zone(iso: &str, tzid: Option<&str>) -> DateResult<DateTime<Utc>> {
    let trimmed = iso.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        let utc = truncate_to_minute(dt.naive_utc(), iso)?;
        return Ok(Utc.from_utc_datetime(&utc));
    }

    let local = truncate_to_minute(parse_naive_iso(trimmed, iso)?, iso)?;
    match tzid {
        Some(tzid) => local_to_utc(local, tzid),
        None => Ok(Utc.from_utc_datetime(&local)),
    }
}

/// ## Summary
/// Converts any ISO 8601 value to the same instant in UTC, dropping
/// sub-second precision the compact wire form cannot carry.
///
/// ## Errors
/// Returns `InvalidTimestamp` if the value cannot be parsed.
pub fn to_utc(iso: &str) -> DateResult<DateTime<Utc>> {
    parse_iso(iso).map(|instant| instant.trunc_subsecs(0))
}

/// ## Summary
/// Parses an ISO 8601 value. Values without an offset are taken as UTC and a
/// bare date is taken as midnight.
///
/// ## Errors
/// Returns `InvalidTimestamp` if the value cannot be parsed.
pub fn parse_iso(iso: &str) -> DateResult<DateTime<Utc>> {
    let trimmed = iso.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    parse_naive_iso(trimmed, iso).map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_naive_iso(trimmed: &str, original: &str) -> DateResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(trimmed, ISO_LOCAL_DATETIME)
        .or_else(|_| {
            NaiveDate::parse_from_str(trimmed, ISO_LOCAL_DATE).map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|_e| DateError::InvalidTimestamp(original.to_string()))
}

fn truncate_to_minute(naive: NaiveDateTime, original: &str) -> DateResult<NaiveDateTime> {
    naive
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .ok_or_else(|| DateError::InvalidTimestamp(original.to_string()))
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.sssZ`.
#[must_use]
pub fn to_iso(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats an instant as `YYYYMMDDTHHMMSSZ`.
#[must_use]
pub fn to_compact(instant: &DateTime<Utc>) -> String {
    instant.format(COMPACT_UTC_OUTPUT).to_string()
}

fn parse_compact(compact: &str) -> DateResult<NaiveDateTime> {
    let trimmed = compact.trim();
    let local = trimmed
        .strip_suffix(['Z', 'z'])
        .unwrap_or(trimmed);

    NaiveDateTime::parse_from_str(local, COMPACT_DATETIME)
        .or_else(|_| NaiveDate::parse_from_str(local, COMPACT_DATE).map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_e| DateError::InvalidTimestamp(compact.to_string()))
}

/// ## Summary
/// Resolves a timezone identifier to a `chrono_tz::Tz`.
///
/// Common calendar-client prefixes are stripped, Windows zone names and IANA
/// aliases are canonicalized, then the name is looked up in the IANA database.
///
/// ## Errors
/// Returns `UnknownTimezone` if the identifier cannot be resolved.
pub fn resolve_timezone(tzid: &str) -> DateResult<Tz> {
    let normalized = normalize_tzid(tzid);

    Tz::from_str(&normalized).map_err(|_e| DateError::UnknownTimezone(tzid.to_string()))
}

/// Normalizes calendar-client timezone identifiers to IANA names.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    let iana_parser = IanaParserExtended::new();

    if let Some(tz) = WindowsParser::new().parse(stripped, None) {
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}

/// Reads `local` as wall-clock time in `tzid`. A repeated local time (DST
/// fold) resolves to its first occurrence; a skipped one (DST gap) is an error.
fn local_to_utc(local: NaiveDateTime, tzid: &str) -> DateResult<DateTime<Utc>> {
    let tz = resolve_timezone(tzid)?;

    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => Err(DateError::InvalidTimestamp(format!(
            "{local} does not exist in timezone {tzid}"
        ))),
    }
}
