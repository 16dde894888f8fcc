use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

const LOG_DIRECTORY: &str = "logs";

/// Installs the global subscriber: plain output on stdout and, if requested, JSON
/// lines in a log file. Records from the `log` facade end up here as well.
///
/// The returned guard flushes the log file when dropped.
pub fn setup(log_level: &str, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let level = match tracing::Level::from_str(log_level) {
        Ok(level) => LevelFilter::from_level(level),
        Err(_) => bail!("Invalid log level: {}", log_level),
    };

    let stdout_layer = fmt::layer().without_time().with_filter(level);

    let (logfile_layer, guard, path) = match log_file {
        Some(log_file) => {
            let path = log_file_path(log_file)?;
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            let dir = path.parent().unwrap_or(Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking_appender)
                .with_filter(level);
            (Some(layer), Some(guard), Some(path))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(logfile_layer)
        .try_init()
        .context("Unable to set global tracing subscriber")?;

    if let Some(path) = path {
        tracing::info!("Saving logs to {}", path.display());
    }
    Ok(guard)
}

/// Resolves the `--log-file` argument. `auto` picks a timestamped file in the log
/// directory; an explicit path must not exist yet.
fn log_file_path(log_file: &str) -> Result<PathBuf> {
    if log_file != "auto" {
        let path = PathBuf::from(log_file);
        if path.exists() {
            bail!("Log file already exists: {}", path.display());
        }
        return Ok(path);
    }

    let time = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let dir = PathBuf::from(LOG_DIRECTORY);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    Ok(dir.join(format!("courtside-{time}.log")))
}
