//! Tests for local date/time to UTC conversion, including DST transitions.

use booking_engine::timezone::{parse_time_of_day, parse_utc};
use booking_engine::{
    add_duration_utc, add_duration_utc_with_policy, local_timezone, parse_date, parse_timezone,
    to_local, to_utc, to_utc_with_policy, BookingError, DstPolicy,
};
use chrono::{NaiveDate, NaiveDateTime};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn local(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

// ── to_utc ──────────────────────────────────────────────────────────────────

#[test]
fn summer_time_in_new_york() {
    // EDT is UTC-4.
    let utc = to_utc(date(2024, 7, 1), "09:00", Some("America/New_York")).unwrap();
    assert_eq!(utc, "2024-07-01 13:00:00");
}

#[test]
fn winter_time_in_new_york() {
    // EST is UTC-5.
    let utc = to_utc(date(2024, 1, 15), "09:00", Some("America/New_York")).unwrap();
    assert_eq!(utc, "2024-01-15 14:00:00");
}

#[test]
fn east_of_utc_rolls_back_a_day() {
    let utc = to_utc(date(2024, 5, 1), "00:30", Some("Asia/Tokyo")).unwrap();
    assert_eq!(utc, "2024-04-30 15:30:00");
}

#[test]
fn without_timezone_local_time_is_taken_as_utc() {
    assert_eq!(to_utc(date(2024, 5, 1), "14:05", None).unwrap(), "2024-05-01 14:05:00");
    assert_eq!(to_utc(date(2024, 5, 1), "14:05", Some("")).unwrap(), "2024-05-01 14:05:00");
}

#[test]
fn seconds_in_time_of_day_are_dropped() {
    let utc = to_utc(date(2024, 7, 1), "09:00:45", Some("UTC")).unwrap();
    assert_eq!(utc, "2024-07-01 09:00:00");
}

#[test]
fn single_digit_hour_is_accepted() {
    assert_eq!(to_utc(date(2024, 7, 1), "9:05", None).unwrap(), "2024-07-01 09:05:00");
}

// ── DST transitions ─────────────────────────────────────────────────────────

#[test]
fn spring_forward_gap_moves_forward_by_default() {
    // 02:30 does not exist on 2024-03-10 in New York; it is read with the
    // pre-gap offset (UTC-5), i.e. 03:30 EDT.
    let utc = to_utc(date(2024, 3, 10), "02:30", Some("America/New_York")).unwrap();
    assert_eq!(utc, "2024-03-10 07:30:00");
    assert_eq!(
        to_local(&utc, "America/New_York").unwrap(),
        local("2024-03-10 03:30:00")
    );
}

#[test]
fn spring_forward_gap_is_rejected_when_asked() {
    let err = to_utc_with_policy(
        date(2024, 3, 10),
        "02:30",
        Some("America/New_York"),
        DstPolicy::Reject,
    )
    .unwrap_err();
    assert!(matches!(err, BookingError::NonexistentLocalTime { .. }));
}

#[test]
fn fall_back_overlap_takes_the_earlier_instant() {
    // 01:30 happens twice on 2024-11-03; the first is still EDT (UTC-4).
    let utc = to_utc(date(2024, 11, 3), "01:30", Some("America/New_York")).unwrap();
    assert_eq!(utc, "2024-11-03 05:30:00");

    let err = to_utc_with_policy(
        date(2024, 11, 3),
        "01:30",
        Some("America/New_York"),
        DstPolicy::Reject,
    )
    .unwrap_err();
    assert!(matches!(err, BookingError::AmbiguousLocalTime { .. }));
}

#[test]
fn europe_spring_forward_gap() {
    // Berlin skips 02:00-03:00 on 2024-03-31; pre-gap offset is UTC+1.
    let utc = to_utc(date(2024, 3, 31), "02:15", Some("Europe/Berlin")).unwrap();
    assert_eq!(utc, "2024-03-31 01:15:00");
}

// ── add_duration_utc ────────────────────────────────────────────────────────

#[test]
fn duration_is_added_to_the_start() {
    let end = add_duration_utc(date(2024, 7, 1), "09:00", 45, Some("America/New_York")).unwrap();
    assert_eq!(end, "2024-07-01 13:45:00");
}

#[test]
fn duration_can_cross_midnight() {
    let end = add_duration_utc(date(2024, 5, 1), "23:45", 30, None).unwrap();
    assert_eq!(end, "2024-05-02 00:15:00");
}

#[test]
fn duration_is_wall_clock_across_fall_back() {
    // 00:30 EDT + 120 wall-clock minutes = 02:30 EST (UTC-5).
    let end = add_duration_utc(date(2024, 11, 3), "00:30", 120, Some("America/New_York")).unwrap();
    assert_eq!(end, "2024-11-03 07:30:00");
}

#[test]
fn duration_ending_in_gap_follows_the_policy() {
    let tz = Some("America/New_York");
    assert_eq!(
        add_duration_utc(date(2024, 3, 10), "01:30", 60, tz).unwrap(),
        "2024-03-10 07:30:00"
    );
    let strict =
        add_duration_utc_with_policy(date(2024, 3, 10), "01:30", 60, tz, DstPolicy::Reject);
    assert!(strict.is_err());
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn malformed_times_are_rejected() {
    for bad in ["25:00", "09:60", "9", "ab:cd", "", "09:00:00:00", "09:00:75"] {
        let err = to_utc(date(2024, 5, 1), bad, None).unwrap_err();
        assert!(
            matches!(err, BookingError::InvalidTime(_)),
            "{:?} should be an invalid time",
            bad
        );
    }
}

#[test]
fn unknown_timezone_is_rejected() {
    let err = to_utc(date(2024, 5, 1), "09:00", Some("Mars/Olympus_Mons")).unwrap_err();
    assert!(matches!(err, BookingError::InvalidTimezone(ref tz) if tz == "Mars/Olympus_Mons"));
    assert!(parse_timezone("America/New_York").is_ok());
}

// ── to_local / parsing ──────────────────────────────────────────────────────

#[test]
fn to_local_accepts_wire_and_rfc3339() {
    let expected = local("2024-07-01 09:00:00");
    assert_eq!(to_local("2024-07-01 13:00:00", "America/New_York").unwrap(), expected);
    assert_eq!(to_local("2024-07-01T13:00:00Z", "America/New_York").unwrap(), expected);
    assert_eq!(
        to_local("2024-07-01T15:00:00+02:00", "America/New_York").unwrap(),
        expected
    );
}

#[test]
fn to_local_rejects_garbage() {
    let err = to_local("yesterday", "UTC").unwrap_err();
    assert!(matches!(err, BookingError::InvalidUtc(_)));
    assert!(parse_utc("2024-13-01 00:00:00").is_err());
}

#[test]
fn parse_time_of_day_bounds() {
    assert!(parse_time_of_day("00:00").is_ok());
    assert!(parse_time_of_day("23:59").is_ok());
    assert!(parse_time_of_day("24:00").is_err());
}

#[test]
fn local_timezone_is_always_a_known_zone() {
    assert!(parse_timezone(&local_timezone()).is_ok());
}

#[test]
fn local_timezone_without_tz_variable_is_still_known() {
    std::env::remove_var("TZ");
    let name = local_timezone();
    assert!(!name.is_empty());
    assert!(parse_timezone(&name).is_ok(), "unknown zone {name}");
}

#[test]
fn parse_date_accepts_iso_dates_only() {
    assert_eq!(parse_date("2024-02-29").unwrap(), date(2024, 2, 29));
    assert!(matches!(
        parse_date("2023-02-29"),
        Err(BookingError::InvalidDate(d)) if d == "2023-02-29"
    ));
    assert!(matches!(parse_date("07/01/2024"), Err(BookingError::InvalidDate(_))));
}
