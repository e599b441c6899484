use crate::app::Snapshot;

/// Pretty-printed snapshot: metrics, sorted agents and waiting agent ids
pub(crate) fn snapshot_json(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CostBreakdown;
    use crate::core::{Agent, AgentStatus, SystemMetrics, TokenTotals};
    use crate::pricing::PricingSource;
    use crate::utils::EventTime;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use serde_json::Value;
    use std::path::PathBuf;

    fn now() -> DateTime<Utc> {
        "2026-10-18T12:00:00Z".parse().unwrap()
    }

    fn snapshot() -> Snapshot {
        let agent = Agent {
            agent_id: "a1".to_string(),
            slug: "fix-tests".to_string(),
            session_id: "s1".to_string(),
            status: AgentStatus::WaitingForUser,
            project_path: PathBuf::from("/p"),
            current_cwd: "/w".to_string(),
            created_at: EventTime::from_utc(now()),
            last_activity: EventTime::from_utc(now()),
            tokens: TokenTotals {
                input_tokens: 10,
                output_tokens: 5,
                ..TokenTotals::default()
            },
            message_count: 2,
            model: "claude-sonnet-4-5".to_string(),
            total_cost: Decimal::new(105, 6),
        };
        Snapshot {
            generated_at: now(),
            pricing_source: PricingSource::Cache,
            metrics: SystemMetrics {
                total_agents: 1,
                waiting_for_user: 1,
                ..SystemMetrics::default()
            },
            cost_breakdown: CostBreakdown::default(),
            agents: vec![agent],
            waiting_agent_ids: vec!["a1".to_string()],
            waiting_slugs: vec!["fix-tests".to_string()],
            sort: None,
            last_change: None,
            focus: None,
            detail: None,
        }
    }

    #[test]
    fn snapshot_json_shape() {
        let json: Value = serde_json::from_str(&snapshot_json(&snapshot()).unwrap()).unwrap();

        assert_eq!(json["pricing_source"], "cache");
        assert_eq!(json["metrics"]["total_agents"], 1);
        assert_eq!(json["metrics"]["waiting_for_user"], 1);
        assert_eq!(json["waiting_agent_ids"][0], "a1");
        assert!(json.get("waiting_slugs").is_none());
        assert!(json.get("last_change").is_none());
        assert!(json.get("detail").is_none());
        assert_eq!(json["cost_breakdown"]["total"], "0");

        let agent = &json["agents"][0];
        assert_eq!(agent["agent_id"], "a1");
        assert_eq!(agent["status"], "waiting_for_user");
        assert_eq!(agent["input_tokens"], 10);
        assert_eq!(agent["message_count"], 2);
    }
}
