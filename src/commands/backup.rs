//! Command: snapshot installed packages into a manifest.
use anyhow::{Context as _, Result};

use super::Runtime;
use crate::cli::Cli;
use crate::config;
use crate::engine::{Engine, Report};
use crate::manifest;

/// Run the backup command.
///
/// Writes to `--output` when given, otherwise to a timestamped file in the
/// manifest directory. Manifest selection flags are ignored.
///
/// # Errors
///
/// Returns an error if no output location can be determined, the backend
/// query fails, or the file cannot be written.
pub fn run(cli: &Cli, rt: Runtime<'_>) -> Result<Report> {
    let Runtime {
        backend,
        gate,
        log,
        started,
        ..
    } = rt;

    if cli.global.system.is_some() || !cli.global.manifests.is_empty() {
        log.debug("backup reads installed state only; ignoring manifest selection");
    }

    let output = match &cli.global.output {
        Some(path) => path.clone(),
        None => {
            let dir = config::resolve_manifest_dir(cli.global.dir.as_deref())?;
            manifest::backup_path(&dir, started)
        }
    };
    log.debug(&format!("backup output: {}", output.display()));

    Engine::new(backend, gate, log, cli.run_options())
        .backup(&output, started)
        .with_context(|| format!("backup to {} failed", output.display()))
}
