//! Rebuilds one Agent from its log file

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::consts::SHORT_ID_LEN;
use crate::core::status::classify_status;
use crate::core::Agent;
use crate::pricing::PricingDb;
use crate::source::{Record, get_agent_info, has_empty_todo_list, is_waiting_for_user, parse_log_file};
use crate::utils::EventTime;

/// Parse `log_file` and fold it into an Agent.
///
/// Returns `None` for empty logs and logs whose first record has no `agentId`.
pub(crate) fn reconstruct_agent(
    log_file: &Path,
    claude_home: &Path,
    pricing: &PricingDb,
    now: DateTime<Utc>,
) -> Option<Agent> {
    let records = parse_log_file(log_file);
    build_agent(&records, log_file, claude_home, pricing, now)
}

fn build_agent(
    records: &[Record],
    log_file: &Path,
    claude_home: &Path,
    pricing: &PricingDb,
    now: DateTime<Utc>,
) -> Option<Agent> {
    let info = get_agent_info(records, now);
    if info.agent_id.is_empty() {
        return None;
    }

    let now_event = EventTime::from_utc(now);
    let created_at = info.created_at.unwrap_or(now_event);
    let last_activity = info.last_activity.unwrap_or(created_at);

    // The side files are only consulted when the log itself is inconclusive
    let todo_list_empty = !is_waiting_for_user(records)
        && has_empty_todo_list(claude_home, &info.session_id, &info.agent_id);
    let status = classify_status(records, last_activity, todo_list_empty, now);

    let current_cwd = records
        .iter()
        .rev()
        .find_map(|record| record.cwd.as_deref().filter(|cwd| !cwd.is_empty()))
        .map_or(info.first_cwd, str::to_string);

    let slug = if info.slug.trim().is_empty() {
        info.agent_id.chars().take(SHORT_ID_LEN).collect()
    } else {
        info.slug
    };

    let total_cost = pricing.calculate_cost(&info.tokens, &info.model);

    Some(Agent {
        agent_id: info.agent_id,
        slug,
        session_id: info.session_id,
        status,
        project_path: log_file.parent().map(Path::to_path_buf).unwrap_or_default(),
        current_cwd,
        created_at,
        last_activity,
        tokens: info.tokens,
        message_count: info.message_count,
        model: info.model,
        total_cost,
    })
}
