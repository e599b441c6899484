use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color};
use std::fmt::Write;

use crate::app::Snapshot;
use crate::core::{Agent, SystemMetrics};
use crate::utils::EventTime;
use crate::output::format::{
    create_styled_table, format_cost, format_duration, format_number, format_time_ago,
    format_tokens, header_cell, right_cell, status_style, styled_cell,
};

const SLUG_WIDTH: usize = 20;
const NOTICE_SLUG_WIDTH: usize = 15;
const NOTICE_MAX_SLUGS: usize = 3;
const CWD_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy)]
pub(crate) struct DashboardOptions {
    pub(crate) use_color: bool,
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Keep the tail of long paths, where the project name is
fn truncate_left(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - max.saturating_sub(1)).collect();
    format!("…{tail}")
}

fn paint(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn header_line(metrics: &SystemMetrics) -> String {
    [
        format!("Agents: {}", metrics.total_agents),
        format!("Active: {}", metrics.active_agents),
        format!("Waiting: {}", metrics.waiting_for_user),
        format!("Idle: {}", metrics.idle_agents),
        format!("Stopped: {}", metrics.stopped_agents),
        format!("Tokens: {}", format_tokens(metrics.total_tokens())),
        format!("Cost: {}", format_cost(metrics.total_cost)),
    ]
    .join(" │ ")
}

/// One-line banner for agents blocked on the user, or `None` when nobody waits.
pub(crate) fn waiting_notice(slugs: &[String]) -> Option<String> {
    match slugs {
        [] => None,
        [one] => Some(format!(
            "⚠ Agent '{}' is waiting for user input!",
            truncate(one, NOTICE_SLUG_WIDTH)
        )),
        many => {
            let mut names: Vec<String> = many
                .iter()
                .take(NOTICE_MAX_SLUGS)
                .map(|s| truncate(s, NOTICE_SLUG_WIDTH))
                .collect();
            if many.len() > NOTICE_MAX_SLUGS {
                names.push(format!("+{} more", many.len() - NOTICE_MAX_SLUGS));
            }
            Some(format!(
                "⚠ {} agents waiting for input: {}",
                many.len(),
                names.join(", ")
            ))
        }
    }
}

fn agent_row(agent: &Agent, now: DateTime<Utc>, use_color: bool) -> Vec<Cell> {
    let (status_color, status_bold) = if use_color {
        status_style(agent.status)
    } else {
        (None, false)
    };
    let cost_color = if use_color { Some(Color::Green) } else { None };

    vec![
        Cell::new(agent.short_id()),
        Cell::new(truncate(&agent.slug, SLUG_WIDTH)),
        styled_cell(agent.status.label(), status_color, status_bold),
        Cell::new(agent.short_model()),
        right_cell(&format_tokens(agent.tokens.input_tokens), None, false),
        right_cell(&format_tokens(agent.tokens.output_tokens), None, false),
        right_cell(&format_cost(agent.total_cost), cost_color, false),
        right_cell(&format_number(agent.message_count), None, false),
        Cell::new(format_time_ago(agent.last_activity, now)),
        Cell::new(truncate_left(&agent.current_cwd, CWD_WIDTH)),
    ]
}

fn agent_table(agents: &[Agent], now: DateTime<Utc>, use_color: bool) -> String {
    let mut table = create_styled_table();
    table.set_header(
        [
            "ID", "Name", "Status", "Model", "Input", "Output", "Cost", "Msgs", "Last Active",
            "CWD",
        ]
        .map(|h| header_cell(h, use_color)),
    );
    for agent in agents {
        table.add_row(agent_row(agent, now, use_color));
    }
    table.to_string()
}

fn format_created(ts: EventTime) -> String {
    match ts {
        EventTime::Aware(dt) => dt.format("%Y-%m-%d %H:%M:%S %:z").to_string(),
        EventTime::Naive(naive) => naive.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Labelled key/value panel for one agent
fn agent_detail(agent: &Agent, now: DateTime<Utc>, use_color: bool) -> String {
    let t = &agent.tokens;
    let fields = [
        ("Agent ID", agent.agent_id.clone()),
        ("Slug", agent.slug.clone()),
        ("Session ID", agent.session_id.clone()),
        ("Status", agent.status.label().to_string()),
        ("Model", agent.model.clone()),
        ("Project Path", agent.project_path.display().to_string()),
        ("Working Dir", agent.current_cwd.clone()),
        ("Input", format_tokens(t.input_tokens)),
        ("Output", format_tokens(t.output_tokens)),
        ("Cache Create", format_tokens(t.cache_creation_tokens)),
        ("Cache Read", format_tokens(t.cache_read_tokens)),
        ("Messages", format_number(agent.message_count)),
        ("Cost", format_cost(agent.total_cost)),
        ("Created", format_created(agent.created_at)),
        ("Last Activity", format_time_ago(agent.last_activity, now)),
    ];

    let title = format!("Agent Details: {}", agent.slug);
    let mut out = format!("  {}\n", paint(&title, "1;36", use_color));
    for (label, value) in fields {
        let _ = writeln!(out, "  {:<14} {value}", format!("{label}:"));
    }
    out
}

/// Render the full dashboard as text.
pub(crate) fn render_dashboard(snapshot: &Snapshot, options: DashboardOptions) -> String {
    let c = options.use_color;
    let metrics = &snapshot.metrics;
    let usage = &metrics.usage;
    let now = snapshot.generated_at;
    let mut out = String::new();

    let _ = writeln!(out, "\n  {}", paint("cctop: Claude Code agent monitor", "1;36", c));
    let _ = writeln!(out, "  {}\n", header_line(metrics));

    if snapshot.agents.is_empty() {
        let _ = writeln!(out, "  No agents to show.");
    } else {
        let _ = writeln!(out, "{}", agent_table(&snapshot.agents, now, c));
    }

    match (&snapshot.detail, &snapshot.focus) {
        (Some(agent), _) => {
            let _ = write!(out, "\n{}", agent_detail(agent, now, c));
        }
        (None, Some(id)) => {
            let _ = writeln!(out, "\n  No agent matches '{id}'.");
        }
        (None, None) => {}
    }

    if let Some(notice) = waiting_notice(&snapshot.waiting_slugs) {
        let _ = writeln!(out, "\n  {}", paint(&notice, "1;33", c));
    }

    let costs = &snapshot.cost_breakdown;
    let _ = writeln!(out, "\n  {}", paint("Cost", "1", c));
    let _ = writeln!(
        out,
        "  Input {} │ Output {} │ Cache Create {} │ Cache Read {} │ Total {}",
        format_cost(costs.input),
        format_cost(costs.output),
        format_cost(costs.cache_creation),
        format_cost(costs.cache_read),
        paint(&format_cost(costs.total), "32", c),
    );

    let _ = writeln!(out, "\n  {}", paint("Usage", "1", c));
    let _ = writeln!(out, "  Subscription: {}", usage.subscription_type.to_uppercase());
    let _ = writeln!(
        out,
        "  Session: {} tokens, {} requests │ This Week: {} tokens, {} requests │ Resets in {}",
        format_tokens(usage.session_total_tokens),
        format_number(usage.session_request_count),
        format_tokens(usage.weekly_total_tokens),
        format_number(usage.weekly_request_count),
        format_duration(usage.time_until_reset(now)),
    );

    let sort = snapshot.sort.map_or("Discovery Order", |key| key.label());
    let _ = writeln!(out, "\n  {}", paint("System", "1", c));
    let _ = writeln!(
        out,
        "  Uptime: {} │ Sessions: {} │ Pricing: {} │ Sort: {}",
        format_duration(chrono::TimeDelta::seconds(metrics.uptime.as_secs() as i64)),
        metrics.total_sessions,
        snapshot.pricing_source.label(),
        sort,
    );

    if let Some(change) = &snapshot.last_change {
        let name = change
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let _ = writeln!(out, "  Last change: {name} (+{} lines)", change.new_lines);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ChangeNote, CostBreakdown};
    use crate::core::{AgentStatus, SortKey, TokenTotals};
    use crate::pricing::PricingSource;
    use crate::utils::EventTime;
    use rust_decimal::Decimal;
    use std::path::PathBuf;

    fn now() -> DateTime<Utc> {
        "2026-10-18T12:00:00Z".parse().unwrap()
    }

    fn agent(id: &str, slug: &str, status: AgentStatus) -> Agent {
        let ts = EventTime::from_utc(now() - chrono::TimeDelta::minutes(2));
        Agent {
            agent_id: id.to_string(),
            slug: slug.to_string(),
            session_id: "s".to_string(),
            status,
            project_path: PathBuf::from("/p"),
            current_cwd: "/home/dev/projects/cctop".to_string(),
            created_at: ts,
            last_activity: ts,
            tokens: TokenTotals {
                input_tokens: 1_500,
                output_tokens: 250,
                ..TokenTotals::default()
            },
            message_count: 12,
            model: "claude-sonnet-4-5-20250929".to_string(),
            total_cost: Decimal::new(12_346, 5),
        }
    }

    fn snapshot(agents: Vec<Agent>, waiting: &[&str]) -> Snapshot {
        let mut metrics = SystemMetrics {
            total_agents: agents.len(),
            total_sessions: 1,
            ..SystemMetrics::default()
        };
        for a in &agents {
            metrics.count_status(a.status);
            metrics.tokens.add(&a.tokens);
            metrics.total_cost += a.total_cost;
        }
        Snapshot {
            generated_at: now(),
            pricing_source: PricingSource::Bundled,
            metrics,
            cost_breakdown: CostBreakdown::default(),
            waiting_agent_ids: waiting.iter().map(|s| s.to_string()).collect(),
            waiting_slugs: waiting.iter().map(|s| s.to_string()).collect(),
            agents,
            sort: Some(SortKey::Cost),
            last_change: None,
            focus: None,
            detail: None,
        }
    }

    #[test]
    fn waiting_notice_variants() {
        let slugs = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(waiting_notice(&[]), None);
        assert_eq!(
            waiting_notice(&slugs(&["fix-auth"])).unwrap(),
            "⚠ Agent 'fix-auth' is waiting for user input!"
        );
        assert_eq!(
            waiting_notice(&slugs(&["a", "b"])).unwrap(),
            "⚠ 2 agents waiting for input: a, b"
        );
        assert_eq!(
            waiting_notice(&slugs(&["a", "b", "c", "d", "e"])).unwrap(),
            "⚠ 5 agents waiting for input: a, b, c, +2 more"
        );
        let long = waiting_notice(&slugs(&["a-really-long-agent-slug"])).unwrap();
        assert!(long.contains("'a-really-long-…'"));
    }

    #[test]
    fn truncation_helpers() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_left("/a/b/c/project", 8), "…project");
    }

    #[test]
    fn header_line_counts() {
        let snap = snapshot(
            vec![
                agent("a1", "one", AgentStatus::Active),
                agent("a2", "two", AgentStatus::WaitingForUser),
            ],
            &["two"],
        );
        let line = header_line(&snap.metrics);
        assert!(line.starts_with("Agents: 2 │ Active: 1 │ Waiting: 1 │ Idle: 0 │ Stopped: 0"));
        assert!(line.contains("Tokens: 3.5K"));
        assert!(line.contains("Cost: $0.2469"));
    }

    #[test]
    fn render_plain_dashboard() {
        let mut snap = snapshot(
            vec![agent("abcdef0123", "refactor-parser", AgentStatus::WaitingForUser)],
            &["refactor-parser"],
        );
        snap.last_change = Some(ChangeNote {
            path: PathBuf::from("/p/agent-abcdef0123.jsonl"),
            new_lines: 3,
        });
        let text = render_dashboard(&snap, DashboardOptions { use_color: false });

        assert!(!text.contains('\x1b'));
        assert!(text.contains("abcdef0"));
        assert!(!text.contains("abcdef0123 "));
        assert!(text.contains("refactor-parser"));
        assert!(text.contains("WAITING"));
        assert!(text.contains("S-4.5"));
        assert!(text.contains("1.5K"));
        assert!(text.contains("$0.1235"));
        assert!(text.contains("2m ago"));
        assert!(text.contains("⚠ Agent 'refactor-parser' is waiting for user input!"));
        assert!(text.contains("Subscription: PRO"));
        assert!(text.contains("Resets in"));
        assert!(text.contains("Pricing: bundled"));
        assert!(text.contains("Sort: Cost"));
        assert!(text.contains("Last change: agent-abcdef0123.jsonl (+3 lines)"));
    }

    #[test]
    fn render_agent_detail_panel() {
        let mut focused = agent("abcdef0123", "refactor-parser", AgentStatus::Idle);
        focused.created_at = EventTime::parse("2026-10-18T09:30:00").unwrap();
        focused.tokens.cache_read_tokens = 2_000_000;
        let mut snap = snapshot(vec![focused.clone()], &[]);
        snap.focus = Some("abc".to_string());
        snap.detail = Some(focused);

        let text = render_dashboard(&snap, DashboardOptions { use_color: false });
        assert!(text.contains("Agent Details: refactor-parser"));
        assert!(text.contains("Agent ID:      abcdef0123"));
        assert!(text.contains("Model:         claude-sonnet-4-5-20250929"));
        assert!(text.contains("Project Path:  /p"));
        assert!(text.contains("Cache Read:    2.0M"));
        assert!(text.contains("Messages:      12"));
        assert!(text.contains("Created:       2026-10-18 09:30:00"));
        assert!(text.contains("Last Activity: 2m ago"));
    }

    #[test]
    fn render_unmatched_focus() {
        let mut snap = snapshot(vec![agent("a1", "one", AgentStatus::Idle)], &[]);
        snap.focus = Some("zz".to_string());
        let text = render_dashboard(&snap, DashboardOptions { use_color: false });
        assert!(text.contains("No agent matches 'zz'."));
        assert!(!text.contains("Agent Details"));
    }

    #[test]
    fn render_empty_dashboard() {
        let mut snap = snapshot(Vec::new(), &[]);
        snap.sort = None;
        let text = render_dashboard(&snap, DashboardOptions { use_color: false });
        assert!(text.contains("No agents to show."));
        assert!(!text.contains('⚠'));
        assert!(text.contains("Sort: Discovery Order"));
    }
}
