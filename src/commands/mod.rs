//! Top-level command orchestration.
//!
//! Every reconciling command walks the same sequence: resolve the manifest
//! selection, merge it into an ephemeral file, dispatch to the engine, and
//! release the merged file. `backup` reads installed state only and skips
//! resolution and merging.
pub mod backup;
pub mod completions;
pub mod reconcile;

use std::fmt;
use std::io;

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::backend::Backend;
use crate::cli::{Cli, Command};
use crate::confirm::Confirm;
use crate::engine::Report;
use crate::lifecycle::EphemeralFiles;
use crate::logging::Log;

/// Collaborators one invocation runs against.
pub struct Runtime<'a> {
    /// Package manager backend.
    pub backend: &'a dyn Backend,
    /// Confirmation gate for destructive actions.
    pub gate: &'a mut dyn Confirm,
    /// Logger.
    pub log: &'a dyn Log,
    /// Registry of files the signal handler must delete.
    pub files: &'a EphemeralFiles,
    /// Invocation start time (merged manifest header, backup file name).
    pub started: DateTime<Local>,
}

impl fmt::Debug for Runtime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("backend", &self.backend)
            .field("files", &self.files)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

/// Run the command selected on the command line.
///
/// # Errors
///
/// Returns an error if resolution, merging, or the engine operation fails.
/// A declined confirmation surfaces as
/// [`ReconcileError::UserCancelled`](crate::error::ReconcileError::UserCancelled)
/// inside the returned error.
pub fn run(cli: &Cli, rt: Runtime<'_>) -> Result<Report> {
    let command = cli.effective_command();
    rt.log.debug(&format!("command: {}", command.name()));
    match command {
        Command::Install => reconcile::run(cli, rt, command, |engine, merged| {
            engine.install(merged)
        }),
        Command::Cleanup => reconcile::run(cli, rt, command, |engine, merged| {
            engine.cleanup(merged)
        }),
        Command::Sync => {
            reconcile::run(cli, rt, command, |engine, merged| engine.sync(merged))
        }
        Command::Diff => {
            reconcile::run(cli, rt, command, |engine, merged| engine.diff(merged))
        }
        Command::Backup => backup::run(cli, rt),
        Command::Completions { shell } => {
            completions::run(shell, &mut io::stdout());
            Ok(Report::default())
        }
    }
}
