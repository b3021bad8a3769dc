//! Structured logger forwarding to [`tracing`].
use std::path::{Path, PathBuf};

use super::types::{DRY_RUN_TARGET, Log, RESULT_TARGET, STAGE_TARGET, SUCCESS_TARGET};

/// Implement the methods of [`Log`] by delegating to inherent methods of the
/// same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger for one run.
///
/// Console and file output are handled by the subscriber installed with
/// [`init_subscriber`](super::subscriber::init_subscriber); the logger only
/// remembers where the per-run log file lives so it can be reported.
#[derive(Debug, Default)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for a run whose log file is `log_file`.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self { log_file }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Log a success message.
    pub fn success(&self, msg: &str) {
        tracing::info!(target: SUCCESS_TARGET, "{msg}");
    }

    /// Log a command result line.
    pub fn result(&self, msg: &str) {
        tracing::info!(target: RESULT_TARGET, "{msg}");
    }

    /// Point the user at the log file.
    pub fn print_log_location(&self) {
        if let Some(path) = &self.log_file {
            self.debug(&format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run, success, result);
}
