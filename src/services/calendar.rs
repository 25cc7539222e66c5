//! Date and duration arithmetic shared by attendance and leave accounting.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::model::time_entry::TimeEntry;

/// Monday 00:00 (UTC) of the week containing `now`.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    Utc.from_utc_datetime(&monday.and_time(NaiveTime::MIN))
}

/// Whole seconds between two instants, never negative.
pub fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds().max(0)
}

/// Calendar days covered by a leave, both ends included.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i32 {
    let span = (end - start).num_days().abs() + 1;
    i32::try_from(span).unwrap_or(i32::MAX)
}

/// Worked seconds since `week_start`: stored durations of closed entries
/// plus the live elapsed time of an open one.
pub fn weekly_seconds(entries: &[TimeEntry], week_start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    entries
        .iter()
        .filter(|e| e.clock_in >= week_start)
        .map(|e| match (e.clock_out, e.duration_seconds) {
            (Some(_), Some(stored)) => stored.max(0),
            (Some(out), None) => elapsed_seconds(e.clock_in, out),
            (None, _) => elapsed_seconds(e.clock_in, now),
        })
        .sum()
}

/// Seconds as hours, rounded to two decimals.
pub fn to_hours(seconds: i64) -> f64 {
    (seconds as f64 / 36.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(clock_in: &str, clock_out: Option<&str>) -> TimeEntry {
        let clock_in = at(clock_in);
        let clock_out = clock_out.map(at);
        TimeEntry {
            id: 1,
            user_id: 7,
            clock_in,
            clock_out,
            duration_seconds: clock_out.map(|out| elapsed_seconds(clock_in, out)),
            location_in: None,
            location_out: None,
        }
    }

    #[test]
    fn week_starts_on_monday_midnight() {
        // 2026-03-05 is a Thursday
        assert_eq!(week_start(at("2026-03-05T15:42:00Z")), at("2026-03-02T00:00:00Z"));
        assert_eq!(week_start(at("2026-03-02T00:00:00Z")), at("2026-03-02T00:00:00Z"));
        // Sunday belongs to the week that started six days earlier
        assert_eq!(week_start(at("2026-03-08T23:59:59Z")), at("2026-03-02T00:00:00Z"));
    }

    #[test]
    fn shift_from_nine_to_half_past_five() {
        let seconds = elapsed_seconds(at("2026-03-02T09:00:00Z"), at("2026-03-02T17:30:00Z"));
        assert_eq!(seconds, 30_600);
    }

    #[test]
    fn elapsed_is_clamped_at_zero() {
        assert_eq!(elapsed_seconds(at("2026-03-02T10:00:00Z"), at("2026-03-02T09:00:00Z")), 0);
    }

    #[test]
    fn leave_days_include_both_ends() {
        assert_eq!(inclusive_days(date("2026-03-02"), date("2026-03-04")), 3);
        assert_eq!(inclusive_days(date("2026-03-02"), date("2026-03-02")), 1);
        assert_eq!(inclusive_days(date("2026-02-27"), date("2026-03-02")), 4);
    }

    #[test]
    fn weekly_total_adds_live_time_of_open_entry() {
        let week = at("2026-03-02T00:00:00Z");
        let now = at("2026-03-03T11:00:00Z");
        let entries = vec![
            // previous week, ignored
            entry("2026-03-01T09:00:00Z", Some("2026-03-01T17:00:00Z")),
            entry("2026-03-02T09:00:00Z", Some("2026-03-02T17:30:00Z")),
            entry("2026-03-03T09:00:00Z", None),
        ];

        assert_eq!(weekly_seconds(&entries, week, now), 30_600 + 7_200);
    }

    #[test]
    fn hours_are_rounded_to_two_decimals() {
        assert_eq!(to_hours(30_600), 8.5);
        assert_eq!(to_hours(37_800), 10.5);
        assert_eq!(to_hours(100), 0.03);
        assert_eq!(to_hours(0), 0.0);
    }
}
