//! Core logging types: console verbosity, event targets, and the [`Log`] trait.

/// Target for stage headers (major phases of a command).
pub const STAGE_TARGET: &str = "brewfiles::stage";
/// Target for dry-run previews.
pub const DRY_RUN_TARGET: &str = "brewfiles::dry_run";
/// Target for success lines.
pub const SUCCESS_TARGET: &str = "brewfiles::success";
/// Target for command results (plans, diffs, counts); shown even when quiet.
pub const RESULT_TARGET: &str = "brewfiles::result";

/// How much the console shows. The log file always receives everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings, errors, and command results only.
    Quiet,
    /// Informational output.
    #[default]
    Normal,
    /// Informational output plus debug detail.
    Verbose,
}

impl Verbosity {
    /// Derive verbosity from the `--quiet` and `--verbose` flags.
    /// `--verbose` wins when both are given.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (_, true) => Self::Verbose,
            (true, false) => Self::Quiet,
            (false, false) => Self::Normal,
        }
    }
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) forwards to [`tracing`]; tests use a
/// recording implementation to assert on what an operation reported.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (shown on console only when verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Log a success message.
    fn success(&self, msg: &str);
    /// Log a command result line (plan entries, diff output, counts).
    fn result(&self, msg: &str);
}
