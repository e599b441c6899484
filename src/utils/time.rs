use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// A log timestamp that remembers whether the source string carried a UTC offset.
///
/// Claude Code writes `...Z` timestamps, but hand-written or older logs may be
/// naive. Comparisons against the wall clock differ per variant, see
/// [`EventTime::elapsed_since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventTime {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl EventTime {
    /// Parse an ISO-8601 timestamp. Returns `None` for anything unparseable.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(EventTime::Aware(dt));
        }
        if let Ok(dt) = DateTime::parse_from_str(raw, OFFSET_FORMAT) {
            return Some(EventTime::Aware(dt));
        }
        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(EventTime::Naive(dt));
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(EventTime::Naive)
    }

    /// The wall clock as an offset-carrying timestamp
    pub(crate) fn from_utc(now: DateTime<Utc>) -> Self {
        EventTime::Aware(now.fixed_offset())
    }

    /// UTC instant, treating a naive value as already UTC (usage windows).
    pub(crate) fn to_utc_assume_utc(self) -> DateTime<Utc> {
        match self {
            EventTime::Aware(dt) => dt.with_timezone(&Utc),
            EventTime::Naive(naive) => Utc.from_utc_datetime(&naive),
        }
    }

    /// UTC instant, treating a naive value as local wall-clock time (ordering).
    pub(crate) fn to_utc_assume_local(self) -> DateTime<Utc> {
        match self {
            EventTime::Aware(dt) => dt.with_timezone(&Utc),
            EventTime::Naive(naive) => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
        }
    }

    /// Time elapsed from this timestamp until `now`.
    ///
    /// Aware timestamps are subtracted from an aware `now`; naive ones from the
    /// naive local wall clock, so a naive log written in local time ages correctly.
    pub(crate) fn elapsed_since(self, now: DateTime<Utc>) -> TimeDelta {
        match self {
            EventTime::Aware(dt) => now - dt.with_timezone(&Utc),
            EventTime::Naive(naive) => now.with_timezone(&Local).naive_local() - naive,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Aware(dt) => write!(f, "{}", dt.to_rfc3339()),
            EventTime::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl Serialize for EventTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
