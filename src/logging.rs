//! File logging. The terminal belongs to the UI, so nothing is written to
//! stdout or stderr while the app runs.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "assistant_chat=info,warn";

/// Build the filter: `RUST_LOG` first, then the configured filter, then the default.
pub fn build_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        configured
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
    })
}

/// Install the global subscriber writing to `log_path`. Keep the returned
/// guard alive for the whole run or buffered lines are lost.
pub fn init(log_path: &Path, filter: Option<&str>) -> Result<WorkerGuard> {
    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))?;

    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow!("log path has no file name: {}", log_path.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(filter))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    tracing::info!(path = %log_path.display(), "logging initialised");
    Ok(guard)
}
