//! Logging setup
//!
//! The live dashboard owns the terminal, so logs go to
//! `{cache_dir}/cctop/cctop.log` through a non-blocking writer. Snapshot mode
//! (`--once`/`--json`) logs to stderr instead.

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::consts::APP_DIR;
use crate::error::AppError;

const LOG_FILE: &str = "cctop.log";

/// Keeps the background log writer alive; pending lines are flushed on drop.
pub(crate) struct LoggingGuard {
    _guard: Option<WorkerGuard>,
}

pub(crate) fn log_dir() -> Option<PathBuf> {
    Some(dirs::cache_dir()?.join(APP_DIR))
}

fn default_level(debug: bool, to_stderr: bool) -> &'static str {
    match (debug, to_stderr) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    }
}

/// `RUST_LOG` wins over the `--debug` flag.
fn build_filter(debug: bool, to_stderr: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(debug, to_stderr)))
}

pub(crate) fn init(debug: bool, to_stderr: bool) -> Result<LoggingGuard, AppError> {
    let filter = build_filter(debug, to_stderr);

    if to_stderr {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
            .map_err(|e| AppError::Logging(e.to_string()))?;
        return Ok(LoggingGuard { _guard: None });
    }

    // Without a cache dir there is nowhere safe to write; run without logs
    let Some(dir) = log_dir() else {
        return Ok(LoggingGuard { _guard: None });
    };
    fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing::info!(log_dir = %dir.display(), "logging initialized");
    Ok(LoggingGuard {
        _guard: Some(guard),
    })
}
