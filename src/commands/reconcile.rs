//! Commands: `install`, `cleanup`, `sync`, `diff`.
use anyhow::{Context as _, Result};

use super::Runtime;
use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::engine::{Engine, Report};
use crate::error::ReconcileError;
use crate::manifest::merger::MergeInfo;
use crate::manifest::{MergedManifest, loader};

/// Resolve and merge the selected manifests, then hand the merged manifest
/// to `operation`.
///
/// The merged manifest is released before returning, whatever the outcome.
///
/// # Errors
///
/// Returns an error if the manifest directory or `systems.toml` cannot be
/// loaded, a manifest is missing, merging fails, or `operation` fails.
pub fn run<F>(cli: &Cli, rt: Runtime<'_>, command: Command, operation: F) -> Result<Report>
where
    F: FnOnce(&mut Engine<'_>, &MergedManifest) -> Result<Report, ReconcileError>,
{
    let Runtime {
        backend,
        gate,
        log,
        files,
        started,
    } = rt;

    if let Some(output) = &cli.global.output {
        log.debug(&format!(
            "--output {} only applies to backup; ignoring",
            output.display()
        ));
    }

    log.debug("resolving manifests");
    let settings = Settings::load(cli.global.dir.as_deref())?;
    let selection = cli.selection().context("invalid --system")?;
    log.stage(&format!("Resolving manifests ({})", selection.label()));
    let paths = loader::resolve(&selection, &settings.manifest_dir, &settings.systems)
        .with_context(|| {
            format!(
                "resolving manifests in {}",
                settings.manifest_dir.display()
            )
        })?;
    for path in &paths {
        log.info(&format!("using {}", path.display()));
    }

    log.debug("merging manifests");
    let info = MergeInfo {
        system: selection.label(),
        generated: started,
    };
    let merged = MergedManifest::create(&paths, &info, files).context("merging manifests")?;
    log.debug(&format!("merged manifest: {}", merged.path().display()));
    log.info(&format!(
        "merged {} entries from {} manifest(s)",
        merged.entries().len(),
        paths.len()
    ));

    log.debug(&format!("dispatching {}", command.name()));
    let mut engine = Engine::new(backend, gate, log, cli.run_options());
    let result =
        operation(&mut engine, &merged).with_context(|| format!("{} failed", command.name()));

    log.debug("releasing merged manifest");
    drop(merged);
    result
}
