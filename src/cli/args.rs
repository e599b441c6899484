//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::Config;
use crate::core::{AgentStatus, SortKey};
use crate::error::AppError;

const DEFAULT_REFRESH_SECS: f64 = 1.0;
const MIN_REFRESH_SECS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum StatusFilter {
    /// Activity within the last 30 seconds
    Active,
    /// Activity within the last hour
    Idle,
    /// Waiting for user input
    Waiting,
    /// No activity for over an hour
    Stopped,
}

impl StatusFilter {
    pub(crate) fn matches(self, status: AgentStatus) -> bool {
        matches!(
            (self, status),
            (StatusFilter::Active, AgentStatus::Active)
                | (StatusFilter::Idle, AgentStatus::Idle)
                | (StatusFilter::Waiting, AgentStatus::WaitingForUser)
                | (StatusFilter::Stopped, AgentStatus::Stopped)
        )
    }
}

#[derive(Debug, Parser)]
#[command(name = "cctop")]
#[command(about = "Live monitor for Claude Code agents: status, tokens and cost", version)]
pub(crate) struct Cli {
    /// Claude home directory containing projects/ [default: ~/.claude]
    #[arg(short = 'd', long, value_name = "PATH")]
    pub(crate) log_dir: Option<PathBuf>,

    /// Refresh interval in seconds [default: 1.0]
    #[arg(short, long, value_name = "SECONDS")]
    pub(crate) refresh: Option<f64>,

    /// Disable file watching and refresh on the timer only
    #[arg(long)]
    pub(crate) no_watch: bool,

    /// Skip fetching pricing from LiteLLM (use cache or bundled rates)
    #[arg(short = 'O', long)]
    pub(crate) offline: bool,

    /// Agent ordering [default: last_activity]
    #[arg(short, long, value_enum)]
    pub(crate) sort: Option<SortKey>,

    /// Only show agents with this status
    #[arg(long, value_enum)]
    pub(crate) status: Option<StatusFilter>,

    /// Show a detail panel for the agent whose id starts with ID
    #[arg(short, long, value_name = "ID")]
    pub(crate) agent: Option<String>,

    /// Print a single snapshot and exit
    #[arg(long)]
    pub(crate) once: bool,

    /// Output the snapshot as JSON (implies --once)
    #[arg(short, long)]
    pub(crate) json: bool,

    /// Disable colored output
    #[arg(long)]
    pub(crate) no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub(crate) debug: bool,

    /// Keep discovery order (set when the config names an unknown sort key)
    #[arg(skip)]
    pub(crate) unsorted: bool,

    /// Startup messages to report once logging is initialised
    #[arg(skip)]
    pub(crate) notes: Vec<String>,

    /// Config problems to report once logging is initialised
    #[arg(skip)]
    pub(crate) warnings: Vec<String>,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // For boolean flags, config only applies if CLI is false (default)
        if !self.no_watch && config.no_watch {
            self.no_watch = true;
        }
        if !self.offline && config.offline {
            self.offline = true;
        }
        if !self.no_color && config.no_color {
            self.no_color = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }

        if self.log_dir.is_none() {
            self.log_dir = config.log_dir.clone();
        }
        if self.refresh.is_none() {
            self.refresh = config.refresh;
        }

        if self.sort.is_none()
            && let Some(ref text) = config.sort
        {
            match text.parse::<SortKey>() {
                Ok(key) => self.sort = Some(key),
                Err(e) => {
                    self.warnings.push(format!("{e}; keeping discovery order"));
                    self.unsorted = true;
                }
            }
        }

        if let Some(path) = &config.loaded_from {
            self.notes.push(format!("Loaded config from {}", path.display()));
        }
        self.warnings.extend(config.problems.iter().cloned());

        self
    }

    /// Snapshot mode: print once and exit
    pub(crate) fn one_shot(&self) -> bool {
        self.once || self.json
    }

    pub(crate) fn sort_key(&self) -> Option<SortKey> {
        if self.unsorted {
            return None;
        }
        Some(self.sort.unwrap_or(SortKey::LastActivity))
    }

    /// Claude home: `--log-dir`, config `log_dir`, else `~/.claude`
    pub(crate) fn claude_home(&self) -> Result<PathBuf, AppError> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(".claude"))
                .ok_or(AppError::NoHomeDir),
        }
    }

    /// Validated refresh interval, clamped to at least 100 ms
    pub(crate) fn refresh_interval(&self) -> Result<Duration, AppError> {
        let secs = self.refresh.unwrap_or(DEFAULT_REFRESH_SECS);
        if !secs.is_finite() || secs <= 0.0 {
            return Err(AppError::InvalidRefresh { input: secs });
        }
        Duration::try_from_secs_f64(secs.max(MIN_REFRESH_SECS))
            .map_err(|_| AppError::InvalidRefresh { input: secs })
    }

    pub(crate) fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}
