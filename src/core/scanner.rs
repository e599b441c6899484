//! Corpus scanner: rebuilds the full agent set on every cycle

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::consts::PROJECTS_DIR;
use crate::core::agent::reconstruct_agent;
use crate::core::{Agent, AgentStatus, SortKey, SystemMetrics};
use crate::pricing::PricingDb;
use crate::source::discover_agent_logs;

/// Owns the agent set between scans. Not shared across threads; per-file
/// parsing fans out inside [`Scanner::scan_all`] but results are folded here.
#[derive(Debug)]
pub(crate) struct Scanner {
    claude_home: PathBuf,
    /// Discovery order, with later duplicates overwriting in place
    agents: Vec<Agent>,
    index: HashMap<String, usize>,
    sessions: HashSet<String>,
    started_at: Instant,
}

impl Scanner {
    pub(crate) fn new(claude_home: impl Into<PathBuf>) -> Self {
        Self {
            claude_home: claude_home.into(),
            agents: Vec::new(),
            index: HashMap::new(),
            sessions: HashSet::new(),
            started_at: Instant::now(),
        }
    }

    pub(crate) fn claude_home(&self) -> &Path {
        &self.claude_home
    }

    pub(crate) fn projects_dir(&self) -> PathBuf {
        self.claude_home.join(PROJECTS_DIR)
    }

    /// Clear prior state and rebuild every agent from disk.
    pub(crate) fn scan_all(&mut self, pricing: &PricingDb, now: DateTime<Utc>) -> SystemMetrics {
        self.agents.clear();
        self.index.clear();
        self.sessions.clear();

        let projects_dir = self.projects_dir();
        if !projects_dir.is_dir() {
            debug!(dir = %projects_dir.display(), "no projects directory");
            return self.metrics();
        }

        let start = Instant::now();
        let files = discover_agent_logs(&projects_dir);
        let parsed: Vec<Option<Agent>> = files
            .par_iter()
            .map(|path| reconstruct_agent(path, &self.claude_home, pricing, now))
            .collect();

        for agent in parsed.into_iter().flatten() {
            self.insert(agent);
        }

        info!(
            files = files.len(),
            agents = self.agents.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scan complete"
        );
        self.metrics()
    }

    fn insert(&mut self, agent: Agent) {
        self.sessions.insert(agent.session_id.clone());
        match self.index.get(&agent.agent_id) {
            Some(&slot) => {
                debug!(agent_id = %agent.agent_id, "duplicate agent id, keeping the later log");
                self.agents[slot] = agent;
            }
            None => {
                self.index.insert(agent.agent_id.clone(), self.agents.len());
                self.agents.push(agent);
            }
        }
    }

    fn metrics(&self) -> SystemMetrics {
        let mut metrics = SystemMetrics {
            total_agents: self.agents.len(),
            total_sessions: self.sessions.len(),
            uptime: self.started_at.elapsed(),
            ..SystemMetrics::default()
        };
        for agent in &self.agents {
            metrics.tokens.add(&agent.tokens);
            metrics.total_cost += agent.total_cost;
            metrics.count_status(agent.status);
        }
        metrics
    }

    pub(crate) fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub(crate) fn active_agents(&self) -> Vec<&Agent> {
        self.with_status(AgentStatus::Active)
    }

    pub(crate) fn waiting_agents(&self) -> Vec<&Agent> {
        self.with_status(AgentStatus::WaitingForUser)
    }

    fn with_status(&self, status: AgentStatus) -> Vec<&Agent> {
        self.agents.iter().filter(|a| a.status == status).collect()
    }

    /// Agents ordered by `key`; `None` keeps discovery order. Ties stay in discovery order.
    pub(crate) fn agents_sorted(&self, key: Option<SortKey>) -> Vec<&Agent> {
        let mut agents: Vec<&Agent> = self.agents.iter().collect();
        match key {
            Some(SortKey::LastActivity) => agents.sort_by(|a, b| {
                b.last_activity
                    .to_utc_assume_local()
                    .cmp(&a.last_activity.to_utc_assume_local())
            }),
            Some(SortKey::Cost) => agents.sort_by(|a, b| b.total_cost.cmp(&a.total_cost)),
            Some(SortKey::Tokens) => {
                agents.sort_by(|a, b| b.tokens.input_output().cmp(&a.tokens.input_output()));
            }
            Some(SortKey::AgentId) => agents.sort_by(|a, b| a.agent_id.cmp(&b.agent_id)),
            None => {}
        }
        agents
    }
}
