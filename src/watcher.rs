//! File system watcher for agent logs.
//!
//! Watches `{root}/projects/` recursively and forwards create/modify events
//! on `agent-*.jsonl` files to the dashboard through a single-slot channel.
//! Events closer together than the debounce interval are dropped; the
//! periodic refresh catches anything missed.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{SyncSender, TrySendError};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::error::AppError;
use crate::source::is_agent_log;

/// Minimum-interval gate on a monotonic clock
#[derive(Debug)]
pub(crate) struct Debouncer {
    min_interval: Duration,
    last_fired: Option<Instant>,
}

impl Debouncer {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_fired: None,
        }
    }

    /// True if `now` is at least `min_interval` after the last accepted event.
    pub(crate) fn should_fire(&mut self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) if now.saturating_duration_since(last) < self.min_interval => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }
}

fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Watcher handle; dropping it stops watching.
pub(crate) struct LogWatcher {
    _watcher: RecommendedWatcher,
}

impl LogWatcher {
    /// Watch `projects_dir` (created if absent) and send touched agent log paths to `tx`.
    pub(crate) fn start(
        projects_dir: &Path,
        tx: SyncSender<PathBuf>,
        debounce: Duration,
    ) -> Result<Self, AppError> {
        fs::create_dir_all(projects_dir)?;

        let mut debouncer = Debouncer::new(debounce);
        let mut watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if !is_relevant(&event) {
                        return;
                    }
                    let Some(path) = event.paths.into_iter().find(|p| is_agent_log(p)) else {
                        return;
                    };
                    if !debouncer.should_fire(Instant::now()) {
                        return;
                    }
                    // A full slot already guarantees a rescan
                    if let Err(TrySendError::Disconnected(_)) = tx.try_send(path) {
                        warn!("dashboard stopped listening for file events");
                    }
                }
                Err(e) => warn!("file watcher error: {e}"),
            })?;

        watcher.watch(projects_dir, RecursiveMode::Recursive)?;
        info!(dir = %projects_dir.display(), "watching agent logs");

        Ok(Self { _watcher: watcher })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn debouncer_drops_events_inside_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        assert!(debouncer.should_fire(start));
        assert!(!debouncer.should_fire(start + Duration::from_millis(50)));
        assert!(!debouncer.should_fire(start + Duration::from_millis(99)));
        assert!(debouncer.should_fire(start + Duration::from_millis(100)));
        assert!(!debouncer.should_fire(start + Duration::from_millis(150)));
        assert!(debouncer.should_fire(start + Duration::from_millis(250)));
    }

    #[test]
    fn only_create_and_modify_are_relevant() {
        let path = PathBuf::from("/p/agent-a.jsonl");
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.clone());
        let remove = Event::new(EventKind::Remove(RemoveKind::File)).add_path(path);
        assert!(is_relevant(&create));
        assert!(is_relevant(&modify));
        assert!(!is_relevant(&remove));
    }

    #[test]
    fn start_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let projects = dir.path().join("projects");
        let (tx, _rx) = std::sync::mpsc::sync_channel(1);
        let watcher = LogWatcher::start(&projects, tx, Duration::from_millis(100));
        assert!(watcher.is_ok());
        assert!(projects.is_dir());
    }
}
