//! Tracing setup: console plus a timestamped log file.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// `<logs_dir>/availability_check_<YYYY-mm-dd_HH-MM-SS>.txt`.
pub fn log_file_path(logs_dir: &Path, now: chrono::DateTime<chrono::Local>) -> PathBuf {
    logs_dir.join(format!(
        "availability_check_{}.txt",
        now.format("%Y-%m-%d_%H-%M-%S")
    ))
}

/// Install the global subscriber. Returns the log file path.
///
/// Creates `logs_dir` when missing. Failing to create the log file is an
/// error: a run without its log is not worth much.
pub fn init(logs_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("failed to create logs folder {}", logs_dir.display()))?;

    let path = log_file_path(logs_dir, chrono::Local::now());
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(path)
}
