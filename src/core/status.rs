//! Agent status classification

use chrono::{DateTime, TimeDelta, Utc};

use crate::core::AgentStatus;
use crate::source::{Record, is_waiting_for_user};
use crate::utils::EventTime;

const ACTIVE_WINDOW: TimeDelta = TimeDelta::seconds(30);
const IDLE_WINDOW: TimeDelta = TimeDelta::hours(1);
/// An empty todo list only means "waiting" if the agent wrote something this recently
const TODO_RECENCY_WINDOW: TimeDelta = TimeDelta::minutes(5);

/// Classify an agent; the first matching rule wins.
///
/// `todo_list_empty` is the todo side-file signal, already resolved by the caller.
pub(crate) fn classify_status(
    records: &[Record],
    last_activity: EventTime,
    todo_list_empty: bool,
    now: DateTime<Utc>,
) -> AgentStatus {
    if is_waiting_for_user(records) || (todo_list_empty && last_record_is_recent(records, now)) {
        return AgentStatus::WaitingForUser;
    }

    let elapsed = last_activity.elapsed_since(now);
    if elapsed < ACTIVE_WINDOW {
        AgentStatus::Active
    } else if elapsed < IDLE_WINDOW {
        AgentStatus::Idle
    } else {
        AgentStatus::Stopped
    }
}

fn last_record_is_recent(records: &[Record], now: DateTime<Utc>) -> bool {
    records
        .last()
        .and_then(|record| record.timestamp.as_deref())
        .and_then(EventTime::parse)
        .is_some_and(|ts| ts.elapsed_since(now) < TODO_RECENCY_WINDOW)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-01-04T12:00:00Z".parse().unwrap()
    }

    fn ago(delta: TimeDelta) -> EventTime {
        EventTime::from_utc(now() - delta)
    }

    fn record_at(kind: &str, ts: EventTime, stop_reason: Option<&str>) -> Record {
        let message = match stop_reason {
            Some(reason) => format!(r#","message":{{"stop_reason":"{reason}"}}"#),
            None => String::new(),
        };
        Record::from_line(&format!(r#"{{"type":"{kind}","timestamp":"{ts}"{message}}}"#)).unwrap()
    }

    #[test]
    fn waiting_beats_active() {
        let ts = ago(TimeDelta::seconds(1));
        let records = [record_at("assistant", ts, Some("end_turn"))];
        assert_eq!(
            classify_status(&records, ts, false, now()),
            AgentStatus::WaitingForUser
        );
    }

    #[test]
    fn activity_windows() {
        let cases = [
            (TimeDelta::seconds(0), AgentStatus::Active),
            (TimeDelta::seconds(29), AgentStatus::Active),
            (TimeDelta::seconds(30), AgentStatus::Idle),
            (TimeDelta::minutes(59), AgentStatus::Idle),
            (TimeDelta::hours(1), AgentStatus::Stopped),
            (TimeDelta::days(3), AgentStatus::Stopped),
        ];
        for (delta, expected) in cases {
            let ts = ago(delta);
            let records = [record_at("user", ts, None)];
            assert_eq!(classify_status(&records, ts, false, now()), expected, "{delta}");
        }
    }

    #[test]
    fn empty_todo_list_needs_recent_record() {
        let recent = ago(TimeDelta::minutes(2));
        let records = [record_at("assistant", recent, Some("tool_use"))];
        assert_eq!(
            classify_status(&records, recent, true, now()),
            AgentStatus::WaitingForUser
        );
        assert_eq!(classify_status(&records, recent, false, now()), AgentStatus::Idle);

        let stale = ago(TimeDelta::minutes(5));
        let records = [record_at("assistant", stale, Some("tool_use"))];
        assert_eq!(classify_status(&records, stale, true, now()), AgentStatus::Idle);
    }

    #[test]
    fn empty_todo_list_without_timestamp_is_ignored() {
        let records = [Record::from_line(r#"{"type":"user"}"#).unwrap()];
        let ts = ago(TimeDelta::seconds(5));
        assert_eq!(classify_status(&records, ts, true, now()), AgentStatus::Active);
    }

    #[test]
    fn naive_timestamps_compare_to_local_clock() {
        let real_now = Utc::now();
        let naive = real_now.with_timezone(&chrono::Local).naive_local() - TimeDelta::seconds(10);
        let ts = EventTime::Naive(naive);
        assert_eq!(classify_status(&[], ts, false, real_now), AgentStatus::Active);
    }
}
