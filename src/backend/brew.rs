//! Homebrew backend: `brew bundle` for install and state, per-kind removal.
use std::path::Path;

use anyhow::{Context as _, Result, bail};

use super::Backend;
use crate::error::ReconcileError;
use crate::exec::Executor;
use crate::manifest::{Entry, EntryKind};

const BREW: &str = "brew";
const MAS: &str = "mas";
const CODE: &str = "code";

/// Kinds in the order they are removed: dependents before what they
/// depend on, taps last.
const REMOVAL_ORDER: [EntryKind; 5] = [
    EntryKind::EditorExtension,
    EntryKind::AppStoreApp,
    EntryKind::Cask,
    EntryKind::Formula,
    EntryKind::Tap,
];

/// [`Backend`] driving Homebrew (plus `mas` and `code` for removals).
#[derive(Debug)]
pub struct BrewBackend<'a> {
    executor: &'a dyn Executor,
}

impl<'a> BrewBackend<'a> {
    /// Create a backend running commands through `executor`.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor) -> Self {
        Self { executor }
    }

    fn require(&self, program: &str) -> Result<()> {
        if !self.executor.which(program) {
            bail!("{program} not found on PATH");
        }
        Ok(())
    }

    /// Remove one kind's entries with as few commands as the tool allows.
    fn remove_batch(&self, kind: EntryKind, batch: &[&Entry]) -> Result<()> {
        let ids: Vec<&str> = batch.iter().map(|e| e.identifier.as_str()).collect();
        match kind {
            EntryKind::EditorExtension => {
                self.require(CODE)?;
                let args: Vec<&str> = ids
                    .iter()
                    .flat_map(|id| ["--uninstall-extension", *id])
                    .collect();
                self.executor.run_passthrough(CODE, &args)?;
            }
            EntryKind::AppStoreApp => {
                self.require(MAS)?;
                // mas uninstalls one app per invocation
                for entry in batch {
                    let id = entry
                        .store_id()
                        .with_context(|| format!("mas entry '{}' has no id", entry.identifier))?;
                    self.executor.run_passthrough(MAS, &["uninstall", id])?;
                }
            }
            EntryKind::Cask => self.brew(&["uninstall", "--cask"], &ids)?,
            EntryKind::Formula => self.brew(&["uninstall", "--formula"], &ids)?,
            EntryKind::Tap => self.brew(&["untap"], &ids)?,
        }
        Ok(())
    }

    fn brew(&self, command: &[&str], ids: &[&str]) -> Result<()> {
        let args: Vec<&str> = command.iter().chain(ids).copied().collect();
        self.executor.run_passthrough(BREW, &args)?;
        Ok(())
    }
}

impl Backend for BrewBackend<'_> {
    fn installed(&self) -> Result<Vec<Entry>, ReconcileError> {
        let dump = self
            .require(BREW)
            .and_then(|()| self.executor.run(BREW, &["bundle", "dump", "--file=-"]))
            .map_err(|e| ReconcileError::backend("dump", &e))?;
        Ok(dump.stdout.lines().filter_map(Entry::parse).collect())
    }

    fn install(&self, manifest: &Path) -> Result<(), ReconcileError> {
        let file = manifest.to_string_lossy();
        let file: &str = &file;
        self.require(BREW)
            .and_then(|()| {
                self.executor
                    .run_passthrough(BREW, &["bundle", "install", "--file", file])
            })
            .map(|_| ())
            .map_err(|e| ReconcileError::backend("install", &e))
    }

    fn remove(&self, entries: &[Entry]) -> Result<(), ReconcileError> {
        for kind in REMOVAL_ORDER {
            let batch: Vec<&Entry> = entries.iter().filter(|e| e.kind == kind).collect();
            if batch.is_empty() {
                continue;
            }
            self.remove_batch(kind, &batch)
                .with_context(|| format!("removing {}", kind.plural()))
                .map_err(|e| ReconcileError::backend("remove", &e))?;
        }
        Ok(())
    }
}
