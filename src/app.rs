//! Dashboard state and the refresh loop

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use crate::cli::{Cli, StatusFilter};
use crate::core::{Agent, Scanner, SortKey, SystemMetrics, calculate_usage_metrics};
use crate::error::AppError;
use crate::output::{DashboardOptions, render_dashboard, snapshot_json};
use crate::pricing::{PricingDb, PricingSource};
use crate::source::LogTailer;
use crate::watcher::LogWatcher;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(100);
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Most recent file the watcher reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChangeNote {
    pub(crate) path: PathBuf,
    /// Complete lines appended since the tailer last read this file
    pub(crate) new_lines: usize,
}

/// Cost split by token kind, priced per agent model.
///
/// Each category is rounded once after summing across agents, while `total` is
/// the sum of per-agent costs. The categories can therefore miss `total` by a
/// few millionths of a dollar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) struct CostBreakdown {
    pub(crate) input: Decimal,
    pub(crate) output: Decimal,
    pub(crate) cache_creation: Decimal,
    pub(crate) cache_read: Decimal,
    pub(crate) total: Decimal,
}

impl CostBreakdown {
    fn from_agents<'a>(
        agents: impl IntoIterator<Item = &'a Agent>,
        pricing: &PricingDb,
        total: Decimal,
    ) -> Self {
        let mut breakdown = Self {
            total,
            ..Self::default()
        };
        for agent in agents {
            let rates = pricing.get_pricing(&agent.model);
            let t = &agent.tokens;
            breakdown.input += Decimal::from(t.input_tokens) * rates.input;
            breakdown.output += Decimal::from(t.output_tokens) * rates.output;
            breakdown.cache_creation += Decimal::from(t.cache_creation_tokens) * rates.cache_creation;
            breakdown.cache_read += Decimal::from(t.cache_read_tokens) * rates.cache_read;
        }
        breakdown.input = breakdown.input.round_dp(6);
        breakdown.output = breakdown.output.round_dp(6);
        breakdown.cache_creation = breakdown.cache_creation.round_dp(6);
        breakdown.cache_read = breakdown.cache_read.round_dp(6);
        breakdown
    }
}

/// Everything one render needs, captured at the end of a scan
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Snapshot {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) pricing_source: PricingSource,
    pub(crate) metrics: SystemMetrics,
    pub(crate) cost_breakdown: CostBreakdown,
    /// Sorted, then narrowed by the status filter
    pub(crate) agents: Vec<Agent>,
    /// Every waiting agent, regardless of the status filter
    pub(crate) waiting_agent_ids: Vec<String>,
    #[serde(skip)]
    pub(crate) waiting_slugs: Vec<String>,
    #[serde(skip)]
    pub(crate) sort: Option<SortKey>,
    #[serde(skip)]
    pub(crate) last_change: Option<ChangeNote>,
    /// Id prefix requested with `--agent`
    #[serde(skip)]
    pub(crate) focus: Option<String>,
    /// The focused agent, looked up across all agents rather than the filtered list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) detail: Option<Agent>,
}

pub(crate) struct Dashboard {
    scanner: Scanner,
    pricing: PricingDb,
    session_start: DateTime<Utc>,
    sort: Option<SortKey>,
    status_filter: Option<StatusFilter>,
    tailer: LogTailer,
    last_change: Option<ChangeNote>,
    focus: Option<String>,
}

impl Dashboard {
    pub(crate) fn new(
        claude_home: PathBuf,
        pricing: PricingDb,
        sort: Option<SortKey>,
        status_filter: Option<StatusFilter>,
        session_start: DateTime<Utc>,
    ) -> Self {
        Self {
            scanner: Scanner::new(claude_home),
            pricing,
            session_start,
            sort,
            status_filter,
            tailer: LogTailer::new(),
            last_change: None,
            focus: None,
        }
    }

    /// Track one agent in a detail panel. An empty id is ignored.
    pub(crate) fn with_focus(mut self, agent_id: Option<String>) -> Self {
        self.focus = agent_id.filter(|id| !id.trim().is_empty());
        self
    }

    /// Exact id match first, else the first agent in discovery order with that prefix.
    fn focused_agent(&self) -> Option<&Agent> {
        let id = self.focus.as_deref()?;
        let agents = self.scanner.agents();
        agents
            .iter()
            .find(|a| a.agent_id == id)
            .or_else(|| agents.iter().find(|a| a.agent_id.starts_with(id)))
    }

    pub(crate) fn projects_dir(&self) -> PathBuf {
        self.scanner.projects_dir()
    }

    /// Full rescan plus usage windows.
    pub(crate) fn refresh(&mut self, now: DateTime<Utc>) -> Snapshot {
        let mut metrics = self.scanner.scan_all(&self.pricing, now);
        metrics.usage = calculate_usage_metrics(self.scanner.claude_home(), self.session_start, now);

        let waiting = self.scanner.waiting_agents();
        let waiting_agent_ids: Vec<String> = waiting.iter().map(|a| a.agent_id.clone()).collect();
        let waiting_slugs = waiting.iter().map(|a| a.slug.clone()).collect();

        let filter = self.status_filter;
        let agents: Vec<Agent> = self
            .scanner
            .agents_sorted(self.sort)
            .into_iter()
            .filter(|a| filter.is_none_or(|f| f.matches(a.status)))
            .cloned()
            .collect();

        debug!(
            active = self.scanner.active_agents().len(),
            waiting = waiting_agent_ids.len(),
            shown = agents.len(),
            "dashboard refreshed"
        );

        Snapshot {
            generated_at: now,
            pricing_source: self.pricing.source(),
            cost_breakdown: CostBreakdown::from_agents(
                self.scanner.agents(),
                &self.pricing,
                metrics.total_cost,
            ),
            metrics,
            agents,
            waiting_agent_ids,
            waiting_slugs,
            sort: self.sort,
            last_change: self.last_change.clone(),
            focus: self.focus.clone(),
            detail: self.focused_agent().cloned(),
        }
    }

    /// Record a watcher event. A vanished file forgets its read cursor.
    pub(crate) fn note_change(&mut self, path: &Path) {
        if !path.exists() {
            self.tailer.reset(path);
            return;
        }
        let new_lines = self.tailer.read_new_lines(path).len();
        debug!(path = %path.display(), new_lines, "agent log changed");
        self.last_change = Some(ChangeNote {
            path: path.to_path_buf(),
            new_lines,
        });
    }
}

pub(crate) fn run(cli: &Cli) -> Result<(), AppError> {
    let claude_home = cli.claude_home()?;
    let refresh = cli.refresh_interval()?;

    let pricing = PricingDb::load(cli.offline);
    info!(source = pricing.source().label(), "pricing ready");

    let mut dashboard = Dashboard::new(claude_home, pricing, cli.sort_key(), cli.status, Utc::now())
        .with_focus(cli.agent.clone());
    let options = DashboardOptions {
        use_color: cli.use_color(),
    };

    if cli.one_shot() {
        let snapshot = dashboard.refresh(Utc::now());
        if cli.json {
            println!("{}", snapshot_json(&snapshot)?);
        } else {
            println!("{}", render_dashboard(&snapshot, options));
        }
        return Ok(());
    }

    let (tx, rx) = mpsc::sync_channel::<PathBuf>(1);
    let _watcher = if cli.no_watch {
        info!("file watching disabled, refreshing on the timer only");
        None
    } else {
        Some(LogWatcher::start(&dashboard.projects_dir(), tx, WATCH_DEBOUNCE)?)
    };

    let mut stdout = io::stdout();
    loop {
        let snapshot = dashboard.refresh(Utc::now());
        write!(stdout, "{CLEAR_SCREEN}{}", render_dashboard(&snapshot, options))?;
        stdout.flush()?;

        // Anything that arrived during the scan is already on screen
        for path in rx.try_iter() {
            dashboard.note_change(&path);
        }

        match rx.recv_timeout(refresh) {
            Ok(path) => dashboard.note_change(&path),
            Err(RecvTimeoutError::Timeout) => {}
            // Watcher thread gone: fall back to the timer alone
            Err(RecvTimeoutError::Disconnected) => thread::sleep(refresh),
        }
    }
}
