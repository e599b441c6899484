//! Core module - agent model, status inference and corpus aggregation

mod agent;
mod scanner;
mod schedule;
mod status;
mod types;
mod usage;

pub(crate) use scanner::Scanner;
pub(crate) use types::{
    Agent, AgentStatus, SortKey, SystemMetrics, TokenTotals, TokenUsage, UsageMetrics,
};
pub(crate) use usage::calculate_usage_metrics;
