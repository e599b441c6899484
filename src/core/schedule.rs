//! Weekly usage window boundaries (Monday 00:00 UTC)

use chrono::{DateTime, Datelike, NaiveTime, TimeDelta, Utc};

fn start_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Most recent Monday 00:00 UTC at or before `now` (today when `now` is a Monday).
pub(crate) fn week_start_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_since_monday = i64::from(now.weekday().num_days_from_monday());
    start_of_day(now - TimeDelta::days(days_since_monday))
}

/// Next weekly reset. Always strictly after `now`: on a Monday this is a week away.
pub(crate) fn next_monday_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    let weekday = i64::from(now.weekday().num_days_from_monday());
    let days = match (7 - weekday) % 7 {
        0 => 7,
        d => d,
    };
    start_of_day(now + TimeDelta::days(days))
}
