//! File logging bootstrap.
//!
//! The terminal form owns stdout, so log records always go to rotating files.
//! CLI commands may also echo warnings and errors to stderr. Short-lived
//! commands write through directly; the terminal form buffers and must call
//! [`flush_logs`] before the process exits.
//!
//! Initialization happens at most once per process; asking again for the same
//! directory is a no-op, asking for another directory is an error.

use anyhow::{anyhow, Context, Result};
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "car-inventory";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    log_dir: PathBuf,
    logger: LoggerHandle,
}

/// Start logging at `level` into `log_dir`.
///
/// `echo_stderr` copies warnings and errors to stderr; leave it off while the
/// terminal UI is running.
pub fn init_logging(level: &str, log_dir: &Path, echo_stderr: bool) -> Result<()> {
    if let Some(state) = LOGGING_STATE.get() {
        if state.log_dir == log_dir {
            return Ok(());
        }
        return Err(anyhow!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            state.log_dir.display(),
            log_dir.display()
        ));
    }

    LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState> {
        std::fs::create_dir_all(log_dir).with_context(|| {
            format!("failed to create log directory `{}`", log_dir.display())
        })?;

        let (duplicate, write_mode) = if echo_stderr {
            (Duplicate::Warn, WriteMode::Direct)
        } else {
            (Duplicate::None, WriteMode::BufferAndFlush)
        };

        let logger = Logger::try_with_str(level)
            .with_context(|| format!("invalid log level `{level}`"))?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir)
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .duplicate_to_stderr(duplicate)
            .write_mode(write_mode)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .context("failed to start logger")?;

        info!(
            "event=app_start module=logging status=ok version={} level={} log_dir={}",
            env!("CARGO_PKG_VERSION"),
            level,
            log_dir.display()
        );

        Ok(LoggingState {
            log_dir: log_dir.to_path_buf(),
            logger,
        })
    })?;

    Ok(())
}

/// Write out any buffered log records. No-op before [`init_logging`].
pub fn flush_logs() {
    if let Some(state) = LOGGING_STATE.get() {
        state.logger.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // One test only: the logger is process-global.
    #[test]
    fn test_init_is_idempotent_and_writes_through() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let log_dir = first.path().join("logs");

        init_logging("debug", &log_dir, true).unwrap();
        init_logging("debug", &log_dir, true).unwrap();
        log::info!("event=test module=logging status=ok");
        flush_logs();

        // Records are on disk without waiting for a background flush
        let written: u64 = std::fs::read_dir(&log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().metadata().unwrap().len())
            .sum();
        assert!(written > 0);
        assert!(init_logging("debug", second.path(), true).is_err());
    }
}
