//! Agent log parser
//!
//! Reads `agent-*.jsonl` files under `{root}/projects/` and folds their
//! records into per-agent summaries.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::consts::{AGENT_LOG_EXTENSION, AGENT_LOG_PREFIX};
use crate::core::{TokenTotals, TokenUsage};
use crate::source::Record;
use crate::utils::EventTime;

// ============================================================================
// File discovery
// ============================================================================

/// True for `agent-*.jsonl` file names
pub(crate) fn is_agent_log(path: &Path) -> bool {
    let has_prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(AGENT_LOG_PREFIX));
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == AGENT_LOG_EXTENSION);
    has_prefix && has_extension
}

/// Agent logs in the immediate subdirectories of `projects_dir`, sorted per project.
pub(crate) fn discover_agent_logs(projects_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(projects_dir) else {
        debug!(dir = %projects_dir.display(), "projects directory not readable");
        return Vec::new();
    };

    let mut projects: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    projects.sort();

    let mut files = Vec::new();
    for project in projects {
        let pattern = format!(
            "{}/{}*.{}",
            glob::Pattern::escape(&project.to_string_lossy()),
            AGENT_LOG_PREFIX,
            AGENT_LOG_EXTENSION
        );
        if let Ok(paths) = glob::glob(&pattern) {
            files.extend(paths.flatten().filter(|path| path.is_file()));
        }
    }
    files
}

// ============================================================================
// Parsing
// ============================================================================

/// Decode every JSON-object line of `path`, in file order.
///
/// Blank, malformed and non-object lines are dropped. A missing or unreadable
/// file yields an empty list.
pub(crate) fn parse_log_file(path: &Path) -> Vec<Record> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            debug!(path = %path.display(), %err, "failed to open agent log");
            return Vec::new();
        }
    };
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            // Non-UTF-8 line; the reader has already moved past it
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                debug!(path = %path.display(), line = line_no + 1, "skipping undecodable line");
                continue;
            }
            Err(err) => {
                debug!(path = %path.display(), %err, "read error, keeping lines read so far");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match Record::from_line(&line) {
            Some(record) => records.push(record),
            None => debug!(path = %path.display(), line = line_no + 1, "skipping malformed line"),
        }
    }
    records
}

fn counter(usage: &Map<String, Value>, key: &str) -> u64 {
    usage.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Token usage carried by a record, if it has a non-empty `message.usage` block.
///
/// A missing or blank timestamp is read as `now`; an unparseable one discards the usage.
pub(crate) fn extract_usage_data(record: &Record, now: DateTime<Utc>) -> Option<TokenUsage> {
    let usage = record.usage()?;

    let raw_timestamp = record.timestamp.as_deref().filter(|s| !s.trim().is_empty());
    let timestamp = match raw_timestamp {
        None => EventTime::from_utc(now),
        Some(raw) => EventTime::parse(raw)?,
    };

    Some(TokenUsage {
        input_tokens: counter(usage, "input_tokens"),
        output_tokens: counter(usage, "output_tokens"),
        cache_creation_tokens: counter(usage, "cache_creation_input_tokens"),
        cache_read_tokens: counter(usage, "cache_read_input_tokens"),
        timestamp,
        model: record.model().to_string(),
        request_id: record.request_id.clone().unwrap_or_default(),
    })
}

/// Identity, timing and accumulated usage for one agent log
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AgentInfo {
    pub(crate) agent_id: String,
    pub(crate) slug: String,
    pub(crate) session_id: String,
    /// `cwd` of the first record
    pub(crate) first_cwd: String,
    pub(crate) created_at: Option<EventTime>,
    pub(crate) last_activity: Option<EventTime>,
    pub(crate) tokens: TokenTotals,
    pub(crate) message_count: u64,
    /// Last non-empty model among usage-bearing records
    pub(crate) model: String,
}

fn record_time(record: &Record) -> Option<EventTime> {
    record.timestamp.as_deref().and_then(EventTime::parse)
}

/// Fold an agent's records into a summary. Empty input gives the default.
pub(crate) fn get_agent_info(records: &[Record], now: DateTime<Utc>) -> AgentInfo {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return AgentInfo::default();
    };

    let created_at = record_time(first).unwrap_or_else(|| EventTime::from_utc(now));
    let last_activity = record_time(last).unwrap_or(created_at);

    let mut info = AgentInfo {
        agent_id: first.agent_id.clone().unwrap_or_default(),
        slug: first.slug.clone().unwrap_or_default(),
        session_id: first.session_id.clone().unwrap_or_default(),
        first_cwd: first.cwd.clone().unwrap_or_default(),
        created_at: Some(created_at),
        last_activity: Some(last_activity),
        ..AgentInfo::default()
    };

    for record in records {
        if let Some(usage) = extract_usage_data(record, now) {
            info.tokens.add_usage(&usage);
            if !usage.model.is_empty() {
                info.model = usage.model;
            }
        }
        if record.is_message() {
            info.message_count += 1;
        }
    }
    info
}

/// Heuristic: the newest record is an assistant turn that ended normally.
pub(crate) fn is_waiting_for_user(records: &[Record]) -> bool {
    records
        .last()
        .is_some_and(|last| last.kind() == "assistant" && last.stop_reason() == Some("end_turn"))
}
