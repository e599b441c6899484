//! Core data types: per-request usage, per-agent aggregates and per-cycle metrics

use chrono::{DateTime, TimeDelta, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::consts::{DEFAULT_SUBSCRIPTION, SHORT_ID_LEN};
use crate::error::AppError;
use crate::utils::EventTime;

/// Token usage from a single API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenUsage {
    pub(crate) input_tokens: u64,
    pub(crate) output_tokens: u64,
    pub(crate) cache_creation_tokens: u64,
    pub(crate) cache_read_tokens: u64,
    pub(crate) timestamp: EventTime,
    pub(crate) model: String,
    /// Kept for parity with the log format; nothing dedups on it yet
    #[allow(dead_code)]
    pub(crate) request_id: String,
}

impl TokenUsage {
    pub(crate) fn total_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }
}

/// Running token totals across the four billing categories.
///
/// Counters saturate at `u64::MAX` instead of wrapping on corrupt logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct TokenTotals {
    pub(crate) input_tokens: u64,
    pub(crate) output_tokens: u64,
    pub(crate) cache_creation_tokens: u64,
    pub(crate) cache_read_tokens: u64,
}

impl TokenTotals {
    pub(crate) fn add_usage(&mut self, usage: &TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(usage.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(usage.output_tokens);
        self.cache_creation_tokens = self
            .cache_creation_tokens
            .saturating_add(usage.cache_creation_tokens);
        self.cache_read_tokens = self.cache_read_tokens.saturating_add(usage.cache_read_tokens);
    }

    pub(crate) fn add(&mut self, other: &TokenTotals) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.cache_creation_tokens = self
            .cache_creation_tokens
            .saturating_add(other.cache_creation_tokens);
        self.cache_read_tokens = self.cache_read_tokens.saturating_add(other.cache_read_tokens);
    }

    pub(crate) fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }

    /// Input plus output only; the "tokens" sort key ignores cache traffic
    pub(crate) fn input_output(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AgentStatus {
    /// Activity within the last 30 seconds
    Active,
    /// Activity within the last hour
    Idle,
    /// Last turn ended and the agent is waiting on the user
    WaitingForUser,
    /// No activity for over an hour
    Stopped,
}

impl AgentStatus {
    pub(crate) fn label(self) -> &'static str {
        match self {
            AgentStatus::Active => "ACTIVE",
            AgentStatus::Idle => "IDLE",
            AgentStatus::WaitingForUser => "WAITING",
            AgentStatus::Stopped => "STOPPED",
        }
    }
}

/// One monitored agent, rebuilt from its log file on every scan
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Agent {
    pub(crate) agent_id: String,
    pub(crate) slug: String,
    pub(crate) session_id: String,
    pub(crate) status: AgentStatus,
    pub(crate) project_path: PathBuf,
    pub(crate) current_cwd: String,
    pub(crate) created_at: EventTime,
    pub(crate) last_activity: EventTime,
    #[serde(flatten)]
    pub(crate) tokens: TokenTotals,
    pub(crate) message_count: u64,
    pub(crate) model: String,
    pub(crate) total_cost: Decimal,
}

impl Agent {
    pub(crate) fn short_id(&self) -> &str {
        match self.agent_id.char_indices().nth(SHORT_ID_LEN) {
            Some((idx, _)) => &self.agent_id[..idx],
            None => &self.agent_id,
        }
    }

    /// Abbreviated model family for narrow columns, e.g. `S-4.5`
    pub(crate) fn short_model(&self) -> String {
        let lower = self.model.to_lowercase();
        let is_45 = self.model.contains("4.5") || self.model.contains("4-5");
        if lower.contains("sonnet") {
            if is_45 { "S-4.5" } else { "S-3.5" }.to_string()
        } else if lower.contains("opus") {
            if is_45 { "O-4.5" } else { "O-3" }.to_string()
        } else if lower.contains("haiku") {
            "H-3.5".to_string()
        } else {
            self.model.chars().take(8).collect()
        }
    }
}

/// Agent list ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SortKey {
    /// Most recent activity first (default)
    #[value(name = "last_activity", alias = "activity")]
    LastActivity,
    /// Most expensive first
    Cost,
    /// Most input+output tokens first
    Tokens,
    /// Agent id, ascending
    #[value(name = "agent_id", alias = "id")]
    AgentId,
}

impl SortKey {
    pub(crate) fn label(self) -> &'static str {
        match self {
            SortKey::LastActivity => "Last Activity",
            SortKey::Cost => "Cost",
            SortKey::Tokens => "Tokens",
            SortKey::AgentId => "Agent ID",
        }
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_activity" | "activity" => Ok(SortKey::LastActivity),
            "cost" => Ok(SortKey::Cost),
            "tokens" => Ok(SortKey::Tokens),
            "agent_id" | "id" => Ok(SortKey::AgentId),
            _ => Err(AppError::InvalidSort {
                input: s.to_string(),
            }),
        }
    }
}

/// Session and calendar-week usage windows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct UsageMetrics {
    /// Since process start
    pub(crate) session_total_tokens: u64,
    pub(crate) session_request_count: u64,
    pub(crate) session_start_time: Option<DateTime<Utc>>,
    /// Since the most recent Monday 00:00 UTC
    pub(crate) weekly_total_tokens: u64,
    pub(crate) weekly_request_count: u64,
    pub(crate) weekly_start_time: Option<DateTime<Utc>>,
    pub(crate) next_reset_time: Option<DateTime<Utc>>,
    pub(crate) subscription_type: String,
}

impl Default for UsageMetrics {
    fn default() -> Self {
        Self {
            session_total_tokens: 0,
            session_request_count: 0,
            session_start_time: None,
            weekly_total_tokens: 0,
            weekly_request_count: 0,
            weekly_start_time: None,
            next_reset_time: None,
            subscription_type: DEFAULT_SUBSCRIPTION.to_string(),
        }
    }
}

impl UsageMetrics {
    pub(crate) fn time_until_reset(&self, now: DateTime<Utc>) -> TimeDelta {
        match self.next_reset_time {
            Some(reset) => reset - now,
            None => TimeDelta::zero(),
        }
    }
}

/// Totals across every agent for one scan cycle
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct SystemMetrics {
    pub(crate) total_agents: usize,
    pub(crate) active_agents: usize,
    pub(crate) idle_agents: usize,
    pub(crate) waiting_for_user: usize,
    pub(crate) stopped_agents: usize,
    pub(crate) total_sessions: usize,
    #[serde(flatten)]
    pub(crate) tokens: TokenTotals,
    pub(crate) total_cost: Decimal,
    #[serde(rename = "uptime_secs", serialize_with = "serialize_secs")]
    pub(crate) uptime: Duration,
    pub(crate) usage: UsageMetrics,
}

impl SystemMetrics {
    pub(crate) fn count_status(&mut self, status: AgentStatus) {
        match status {
            AgentStatus::Active => self.active_agents += 1,
            AgentStatus::Idle => self.idle_agents += 1,
            AgentStatus::WaitingForUser => self.waiting_for_user += 1,
            AgentStatus::Stopped => self.stopped_agents += 1,
        }
    }

    pub(crate) fn total_tokens(&self) -> u64 {
        self.tokens.total()
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_secs())
}
