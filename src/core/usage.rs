//! Usage window aggregator: session-since-start and calendar-week totals

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::Path;

use crate::consts::PROJECTS_DIR;
use crate::core::UsageMetrics;
use crate::core::schedule::{next_monday_utc, week_start_utc};
use crate::source::{discover_agent_logs, extract_usage_data, load_subscription_type, parse_log_file};

#[derive(Debug, Default, Clone, Copy)]
struct WindowTotals {
    session_tokens: u64,
    session_requests: u64,
    weekly_tokens: u64,
    weekly_requests: u64,
}

impl WindowTotals {
    fn merge(mut self, other: Self) -> Self {
        self.session_tokens = self.session_tokens.saturating_add(other.session_tokens);
        self.session_requests = self.session_requests.saturating_add(other.session_requests);
        self.weekly_tokens = self.weekly_tokens.saturating_add(other.weekly_tokens);
        self.weekly_requests = self.weekly_requests.saturating_add(other.weekly_requests);
        self
    }
}

fn file_totals(
    path: &Path,
    session_start: DateTime<Utc>,
    weekly_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> WindowTotals {
    let mut totals = WindowTotals::default();
    for record in parse_log_file(path) {
        let Some(usage) = extract_usage_data(&record, now) else {
            continue;
        };
        let at = usage.timestamp.to_utc_assume_utc();
        let tokens = usage.total_tokens();
        if at >= session_start {
            totals.session_tokens = totals.session_tokens.saturating_add(tokens);
            totals.session_requests += 1;
        }
        if at >= weekly_start {
            totals.weekly_tokens = totals.weekly_tokens.saturating_add(tokens);
            totals.weekly_requests += 1;
        }
    }
    totals
}

/// Re-walk the corpus and bucket every usage-bearing record into both windows.
///
/// Independent of the scanner's agent set; naive record timestamps are taken as UTC.
pub(crate) fn calculate_usage_metrics(
    claude_home: &Path,
    session_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> UsageMetrics {
    let weekly_start = week_start_utc(now);

    let files = discover_agent_logs(&claude_home.join(PROJECTS_DIR));
    let totals = files
        .par_iter()
        .map(|path| file_totals(path, session_start, weekly_start, now))
        .reduce(WindowTotals::default, WindowTotals::merge);

    UsageMetrics {
        session_total_tokens: totals.session_tokens,
        session_request_count: totals.session_requests,
        session_start_time: Some(session_start),
        weekly_total_tokens: totals.weekly_tokens,
        weekly_request_count: totals.weekly_requests,
        weekly_start_time: Some(weekly_start),
        next_reset_time: Some(next_monday_utc(now)),
        subscription_type: load_subscription_type(claude_home),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use std::fs;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn usage_line(ts: &str, input: u64) -> String {
        format!(r#"{{"timestamp":"{ts}","message":{{"usage":{{"input_tokens":{input},"output_tokens":1}}}}}}"#)
    }

    #[test]
    fn buckets_by_window() {
        let home = tempfile::tempdir().unwrap();
        let project = home.path().join(PROJECTS_DIR).join("p");
        fs::create_dir_all(&project).unwrap();
        // now = Wednesday 2026-10-21 12:00Z, week starts Monday 2026-10-19
        let lines = [
            usage_line("2026-10-18T23:59:59Z", 99),   // last week
            usage_line("2026-10-19T00:00:00Z", 9),    // week start, inclusive
            usage_line("2026-10-21T10:00:00", 19),    // naive, read as UTC
            usage_line("2026-10-21T11:30:00+00:00", 29),
            r#"{"type":"user","timestamp":"2026-10-21T11:40:00Z"}"#.to_string(),
            usage_line("not a time", 1000),
        ];
        fs::write(project.join("agent-a.jsonl"), lines.join("\n")).unwrap();

        let now = utc("2026-10-21T12:00:00Z");
        let session_start = utc("2026-10-21T11:00:00Z");
        let metrics = calculate_usage_metrics(home.path(), session_start, now);

        assert_eq!(metrics.session_request_count, 1);
        assert_eq!(metrics.session_total_tokens, 30);
        assert_eq!(metrics.weekly_request_count, 3);
        assert_eq!(metrics.weekly_total_tokens, 10 + 20 + 30);
        assert_eq!(metrics.weekly_start_time, Some(utc("2026-10-19T00:00:00Z")));
        assert_eq!(metrics.next_reset_time, Some(utc("2026-10-26T00:00:00Z")));
        assert_eq!(metrics.session_start_time, Some(session_start));
        assert_eq!(metrics.subscription_type, "pro");
        assert_eq!(metrics.time_until_reset(now), TimeDelta::hours(4 * 24 + 12));
    }

    #[test]
    fn session_window_can_exceed_week() {
        let home = tempfile::tempdir().unwrap();
        let project = home.path().join(PROJECTS_DIR).join("p");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("agent-a.jsonl"), usage_line("2026-10-18T08:00:00Z", 4)).unwrap();

        // Session started Saturday; now is Monday
        let metrics = calculate_usage_metrics(
            home.path(),
            utc("2026-10-17T00:00:00Z"),
            utc("2026-10-19T09:00:00Z"),
        );
        assert_eq!(metrics.session_request_count, 1);
        assert_eq!(metrics.weekly_request_count, 0);
    }

    #[test]
    fn huge_counters_saturate() {
        let home = tempfile::tempdir().unwrap();
        let project = home.path().join(PROJECTS_DIR).join("p");
        fs::create_dir_all(&project).unwrap();
        let big = u64::MAX / 2 + 1;
        let lines = [
            usage_line("2026-10-21T11:10:00Z", big),
            usage_line("2026-10-21T11:20:00Z", big),
        ];
        fs::write(project.join("agent-a.jsonl"), lines.join("\n")).unwrap();
        fs::write(project.join("agent-b.jsonl"), usage_line("2026-10-21T11:30:00Z", big)).unwrap();

        let now = utc("2026-10-21T12:00:00Z");
        let metrics = calculate_usage_metrics(home.path(), utc("2026-10-21T11:00:00Z"), now);
        assert_eq!(metrics.session_request_count, 3);
        assert_eq!(metrics.session_total_tokens, u64::MAX);
        assert_eq!(metrics.weekly_total_tokens, u64::MAX);
    }

    #[test]
    fn missing_corpus_still_reports_schedule_and_tier() {
        let home = tempfile::tempdir().unwrap();
        fs::write(
            home.path().join(".credentials.json"),
            r#"{"claudeAiOauth":{"subscriptionType":"max"}}"#,
        )
        .unwrap();
        let now = utc("2026-10-19T00:00:00Z");
        let metrics = calculate_usage_metrics(home.path(), now, now);
        assert_eq!(metrics.weekly_total_tokens, 0);
        assert_eq!(metrics.session_total_tokens, 0);
        assert_eq!(metrics.subscription_type, "max");
        assert_eq!(metrics.next_reset_time, Some(utc("2026-10-26T00:00:00Z")));
    }
}
