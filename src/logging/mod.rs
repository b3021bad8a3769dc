//! Logging infrastructure for structured console and file output.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{
    DRY_RUN_TARGET, Log, RESULT_TARGET, STAGE_TARGET, SUCCESS_TARGET, Verbosity,
};
pub use utils::log_file_path;

/// Run `f` with a [`Logger`] whose events go to a fresh temporary log file
/// through a thread-local subscriber, and return the file's contents.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn with_test_log_file(f: impl FnOnce(&Logger)) -> String {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let file_layer = subscriber::FileLayer::new(&path).expect("failed to create file layer");
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let log = Logger::new(Some(path.clone()));
    tracing::subscriber::with_default(subscriber, || f(&log));
    std::fs::read_to_string(&path).expect("read log file")
}

/// A [`Log`] implementation that records every message for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLog {
    lines: std::sync::Mutex<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl RecordingLog {
    fn push(&self, level: &'static str, msg: &str) {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((level, msg.to_string()));
    }

    /// Messages logged at `level` (`stage`, `info`, `debug`, `warn`,
    /// `error`, `dry_run`, `success`, `result`).
    pub(crate) fn at(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any message at `level` contains `needle`.
    pub(crate) fn contains(&self, level: &str, needle: &str) -> bool {
        self.at(level).iter().any(|m| m.contains(needle))
    }
}

#[cfg(test)]
impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn success(&self, msg: &str) {
        self.push("success", msg);
    }
    fn result(&self, msg: &str) {
        self.push("result", msg);
    }
}
