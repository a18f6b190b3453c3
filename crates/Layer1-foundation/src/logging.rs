//! Logging - 프로세스 시작 시 한 번 초기화
//!
//! stderr 출력 + `~/.openwebui/logs/openwebui_installer.log` 파일 기록.
//! Library crates only emit `tracing` events; the binary owns the subscriber.

use crate::{Error, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name inside the log dir
pub const LOG_FILE_NAME: &str = "openwebui_installer.log";

/// Rotate once the active file reaches this size
pub const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;

/// Rotated files kept next to the active one (`.1` .. `.3`)
pub const LOG_BACKUPS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Debug level instead of info
    pub verbose: bool,
    /// Directory for the log file; `None` logs to stderr only
    pub log_dir: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            log_dir: None,
        }
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the level chosen by `verbose`. Calling this a second
/// time is an error rather than a second set of handlers. Returns the log
/// file path when one was opened.
pub fn init(config: &LogConfig) -> Result<Option<PathBuf>> {
    let log_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let (file_layer, log_file) = match &config.log_dir {
        Some(dir) => {
            let path = open_log_file(dir)?;
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    // With a log file, stderr only carries events in verbose mode
    let stderr_layer = (config.verbose || log_file.is_none()).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Internal(format!("Logging already initialized: {}", e)))?;

    Ok(log_file)
}

/// Create the log dir and rotate the active file if it is too large
fn open_log_file(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    rotate_if_needed(&path, MAX_LOG_BYTES, LOG_BACKUPS)?;
    Ok(path)
}

/// Size-based rotation: `file` -> `file.1` -> ... -> `file.N`, oldest dropped
pub fn rotate_if_needed(path: &Path, max_bytes: u64, backups: usize) -> Result<bool> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if size < max_bytes {
        return Ok(false);
    }

    if backups == 0 {
        std::fs::remove_file(path)?;
        return Ok(true);
    }

    let backup = |n: usize| PathBuf::from(format!("{}.{}", path.display(), n));

    let oldest = backup(backups);
    if oldest.exists() {
        std::fs::remove_file(&oldest)?;
    }
    for n in (1..backups).rev() {
        let from = backup(n);
        if from.exists() {
            std::fs::rename(&from, backup(n + 1))?;
        }
    }
    std::fs::rename(path, backup(1))?;
    Ok(true)
}
