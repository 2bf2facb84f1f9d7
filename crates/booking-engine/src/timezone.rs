//! Local-to-UTC conversion for booking times.
//!
//! A guest picks a calendar date and a time of day in some IANA timezone; the
//! backend stores `YYYY-MM-DD HH:MM:SS` UTC strings. Conversion goes through a
//! real zoned datetime (`chrono-tz`), so DST offsets come from the tz database
//! rather than from string formatting.

use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::dst::DstPolicy;
use crate::error::{BookingError, Result};

/// Wire format of every UTC instant exchanged with the backend.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timezone used when neither the input nor the environment names one.
pub const FALLBACK_TIMEZONE: &str = "UTC";

/// Parse an IANA timezone name (e.g. `"America/New_York"`).
///
/// # Errors
/// Returns `BookingError::InvalidTimezone` if the name is not in the tz database.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| BookingError::InvalidTimezone(name.to_string()))
}

/// The host's timezone name.
///
/// Asks the operating system first (`/etc/localtime`, the Windows registry,
/// the browser's `Intl` API), then `TZ`, then falls back to `UTC`. Names the
/// tz database does not know are skipped.
pub fn local_timezone() -> String {
    let known = |name: &String| name.parse::<Tz>().is_ok();

    iana_time_zone::get_timezone()
        .ok()
        .filter(known)
        .or_else(|| std::env::var("TZ").ok().filter(known))
        .unwrap_or_else(|| FALLBACK_TIMEZONE.to_string())
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
/// Returns `BookingError::InvalidDate` for any other shape or an impossible date.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::InvalidDate(date.to_string()))
}

/// Parse an `"HH:MM"` time of day. Seconds, when present, are accepted and dropped.
///
/// # Errors
/// Returns `BookingError::InvalidTime` unless hour is 0-23 and minute 0-59.
pub fn parse_time_of_day(time: &str) -> Result<NaiveTime> {
    let invalid = || BookingError::InvalidTime(time.to_string());

    let mut parts = time.trim().split(':');
    let hour = parts.next().and_then(|h| h.parse::<u32>().ok());
    let minute = parts.next().and_then(|m| m.parse::<u32>().ok());
    let seconds_ok = parts.next().is_none_or(|s| s.parse::<u32>().is_ok_and(|s| s < 60));

    match (hour, minute) {
        (Some(hour), Some(minute)) if seconds_ok && parts.next().is_none() => {
            NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

/// Convert a local date and time of day to a UTC string.
///
/// Without a timezone the local timestamp is taken as UTC. Uses
/// [`DstPolicy::Compatible`] for gaps and overlaps.
///
/// # Errors
/// Returns `BookingError::InvalidTime` or `BookingError::InvalidTimezone` for bad input.
pub fn to_utc(date: NaiveDate, time: &str, timezone: Option<&str>) -> Result<String> {
    to_utc_with_policy(date, time, timezone, DstPolicy::default())
}

/// [`to_utc`] with an explicit DST policy.
///
/// # Errors
/// Also returns `BookingError::NonexistentLocalTime` or
/// `BookingError::AmbiguousLocalTime` under [`DstPolicy::Reject`].
pub fn to_utc_with_policy(
    date: NaiveDate,
    time: &str,
    timezone: Option<&str>,
    policy: DstPolicy,
) -> Result<String> {
    let local = date.and_time(parse_time_of_day(time)?);
    let utc = zoned_to_utc(local, timezone, policy)?;
    Ok(format_utc(&utc))
}

/// UTC string of `date time + minutes` in the given zone.
///
/// The duration is added to the local wall-clock time before the zone is
/// applied, so a slot that spans a DST change ends at the wall-clock time the
/// guest expects.
///
/// # Errors
/// Same as [`to_utc`].
pub fn add_duration_utc(
    date: NaiveDate,
    time: &str,
    minutes: i64,
    timezone: Option<&str>,
) -> Result<String> {
    add_duration_utc_with_policy(date, time, minutes, timezone, DstPolicy::default())
}

/// [`add_duration_utc`] with an explicit DST policy.
///
/// # Errors
/// Same as [`to_utc_with_policy`].
pub fn add_duration_utc_with_policy(
    date: NaiveDate,
    time: &str,
    minutes: i64,
    timezone: Option<&str>,
    policy: DstPolicy,
) -> Result<String> {
    let start = date.and_time(parse_time_of_day(time)?);
    let end = start
        .checked_add_signed(TimeDelta::minutes(minutes))
        .ok_or_else(|| BookingError::InvalidTime(format!("{} + {} minutes", time, minutes)))?;
    let utc = zoned_to_utc(end, timezone, policy)?;
    Ok(format_utc(&utc))
}

/// Convert a backend UTC string back to wall-clock time in `timezone`.
///
/// Accepts the `YYYY-MM-DD HH:MM:SS` wire format and RFC 3339.
///
/// # Errors
/// Returns `BookingError::InvalidUtc` if the string parses as neither, or
/// `BookingError::InvalidTimezone` for an unknown zone.
pub fn to_local(utc: &str, timezone: &str) -> Result<NaiveDateTime> {
    let tz = parse_timezone(timezone)?;
    let instant = parse_utc(utc)?;
    Ok(instant.with_timezone(&tz).naive_local())
}

/// Parse a UTC instant in wire or RFC 3339 form.
///
/// # Errors
/// Returns `BookingError::InvalidUtc` if the string is neither.
pub fn parse_utc(utc: &str) -> Result<DateTime<Utc>> {
    let trimmed = utc.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| BookingError::InvalidUtc(utc.to_string()))
}

/// Resolve a wall-clock time in `tz` to a UTC instant.
///
/// # Errors
/// Under [`DstPolicy::Reject`], returns `BookingError::NonexistentLocalTime`
/// for times inside a spring-forward gap and `BookingError::AmbiguousLocalTime`
/// for repeated fall-back times.
pub fn resolve_local(local: NaiveDateTime, tz: Tz, policy: DstPolicy) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => match policy {
            DstPolicy::Compatible => Ok(earliest.with_timezone(&Utc)),
            DstPolicy::Reject => Err(BookingError::AmbiguousLocalTime {
                time: local.to_string(),
                timezone: tz.name().to_string(),
            }),
        },
        LocalResult::None => match policy {
            DstPolicy::Compatible => Ok(shift_across_gap(local, tz)),
            DstPolicy::Reject => Err(BookingError::NonexistentLocalTime {
                time: local.to_string(),
                timezone: tz.name().to_string(),
            }),
        },
    }
}

fn zoned_to_utc(
    local: NaiveDateTime,
    timezone: Option<&str>,
    policy: DstPolicy,
) -> Result<DateTime<Utc>> {
    match timezone.filter(|name| !name.is_empty()) {
        Some(name) => resolve_local(local, parse_timezone(name)?, policy),
        None => Ok(local.and_utc()),
    }
}

/// Interpret a gap time with the offset in force just before the gap.
fn shift_across_gap(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    // Gaps in the tz database are at most a few hours; step back until a valid
    // wall-clock time is found and borrow its offset.
    let offset_seconds = (1..=24)
        .filter_map(|hours| local.checked_sub_signed(TimeDelta::hours(hours)))
        .find_map(|probe| tz.from_local_datetime(&probe).latest())
        .map(|before| before.offset().fix().local_minus_utc())
        .unwrap_or(0);

    (local - TimeDelta::seconds(i64::from(offset_seconds))).and_utc()
}

fn format_utc(utc: &DateTime<Utc>) -> String {
    utc.format(DATETIME_FORMAT).to_string()
}
