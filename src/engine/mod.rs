//! Reconciliation engine: converge installed packages onto the merged
//! manifest.
//!
//! Every operation reads live state from the [`Backend`], computes a
//! [`Plan`], and returns a [`Report`]. Only [`Engine::cleanup`] (and the
//! cleanup half of [`Engine::sync`]) can remove anything, and only after the
//! confirmation gate agrees or `force` is set.
pub mod plan;
pub mod report;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};

pub use plan::Plan;
pub use report::Report;

use crate::backend::Backend;
use crate::confirm::{self, Confirm};
use crate::error::ReconcileError;
use crate::logging::Log;
use crate::manifest::{Manifest, MergedManifest, count_kinds, describe_counts};

/// Flags shared by every operation of one invocation.
///
/// The engine acts on `dry_run` and `force`; `verbose` and `quiet` only
/// shape console output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunOptions {
    /// Report what would change without touching the system.
    pub dry_run: bool,
    /// Skip the confirmation gate and allow overwriting backups.
    pub force: bool,
    /// Show debug output.
    pub verbose: bool,
    /// Show only warnings, errors, and results.
    pub quiet: bool,
}

/// Runs reconciliation operations against one backend.
pub struct Engine<'a> {
    backend: &'a dyn Backend,
    gate: &'a mut dyn Confirm,
    log: &'a dyn Log,
    options: RunOptions,
}

impl fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("backend", &self.backend)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Engine<'a> {
    /// Create an engine.
    pub const fn new(
        backend: &'a dyn Backend,
        gate: &'a mut dyn Confirm,
        log: &'a dyn Log,
        options: RunOptions,
    ) -> Self {
        Self {
            backend,
            gate,
            log,
            options,
        }
    }

    /// Install every declared entry that is missing, as one backend batch.
    /// Never removes anything.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::BackendOperation`] if querying state or the
    /// install batch fails.
    pub fn install(&self, merged: &MergedManifest) -> Result<Report, ReconcileError> {
        self.log.stage("Planning install");
        let plan = self.plan(merged)?;
        let entries = plan.install_entries();
        let mut report = Report {
            plan: Plan {
                to_install: plan.to_install,
                ..Plan::default()
            },
            dry_run: self.options.dry_run,
            ..Report::default()
        };

        if entries.is_empty() {
            self.log.success(&format!(
                "all {} declared entries are installed",
                merged.entries().len()
            ));
            return Ok(report);
        }

        for entry in &entries {
            self.log.info(&format!("+ {entry}"));
        }
        let count = entries.len();
        let summary = describe_counts(&count_kinds(&entries));

        if self.options.dry_run {
            self.log
                .dry_run(&format!("would install {count} entries ({summary})"));
            return Ok(report);
        }

        self.log.stage("Installing packages");
        self.backend.install(merged.path())?;
        report.installed = count;
        self.log
            .success(&format!("installed {count} entries ({summary})"));
        Ok(report)
    }

    /// Remove installed entries that no manifest in scope declares, after
    /// confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UserCancelled`] if the gate declines, or
    /// [`ReconcileError::BackendOperation`] if querying state or a removal
    /// batch fails.
    pub fn cleanup(&mut self, merged: &MergedManifest) -> Result<Report, ReconcileError> {
        self.log.stage("Planning cleanup");
        let plan = self.plan(merged)?;
        let entries = plan.remove_entries();
        let mut report = Report {
            plan: Plan {
                to_remove: plan.to_remove,
                ..Plan::default()
            },
            dry_run: self.options.dry_run,
            ..Report::default()
        };

        if entries.is_empty() {
            self.log.success("nothing to remove");
            return Ok(report);
        }

        for entry in &entries {
            self.log.info(&format!("- {entry}"));
        }
        let count = entries.len();
        let summary = describe_counts(&count_kinds(&entries));

        if self.options.dry_run {
            self.log
                .dry_run(&format!("would remove {count} entries ({summary})"));
            return Ok(report);
        }

        let question = format!("Remove {count} entries not declared in any manifest ({summary})?");
        if !confirm::confirm(&mut *self.gate, &question, count, self.options.force) {
            self.log.debug("removal declined at confirmation prompt");
            return Err(ReconcileError::UserCancelled);
        }

        self.log.stage("Removing undeclared packages");
        self.backend.remove(&entries)?;
        report.removed = count;
        self.log.success(&format!("removed {count} entries ({summary})"));
        Ok(report)
    }

    /// Install, then clean up. Cleanup is skipped when install fails.
    ///
    /// # Errors
    ///
    /// Returns the first error from either step.
    pub fn sync(&mut self, merged: &MergedManifest) -> Result<Report, ReconcileError> {
        let installed = self.install(merged)?;
        let cleaned = self.cleanup(merged)?;
        Ok(installed.then(cleaned))
    }

    /// Print what install and cleanup would do. Never mutates or prompts,
    /// whatever `dry_run` says.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::BackendOperation`] if querying state fails.
    pub fn diff(&self, merged: &MergedManifest) -> Result<Report, ReconcileError> {
        self.log.stage("Comparing manifests with installed packages");
        let plan = self.plan(merged)?;

        if plan.is_converged() {
            self.log.result(&format!(
                "no differences: all {} declared entries installed, nothing undeclared",
                merged.entries().len()
            ));
        }
        if !plan.to_install.is_empty() {
            self.log
                .result(&format!("to install ({}):", plan.to_install.len()));
            for entry in plan.to_install.values() {
                self.log.result(&format!("  + {entry}"));
            }
        }
        if !plan.to_remove.is_empty() {
            self.log
                .result(&format!("to remove ({}):", plan.to_remove.len()));
            for entry in plan.to_remove.values() {
                self.log.result(&format!("  - {entry}"));
            }
        }

        Ok(Report {
            plan,
            ..Report::default()
        })
    }

    /// Snapshot the installed state into a new manifest at `output`.
    /// Independent of the manifest set and system type.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::BackendOperation`] if querying state fails,
    /// or [`ReconcileError::Backup`] if `output` exists without `force` or
    /// cannot be written.
    pub fn backup(
        &self,
        output: &Path,
        generated: DateTime<Local>,
    ) -> Result<Report, ReconcileError> {
        self.log.stage("Backing up installed packages");
        let manifest = Manifest::from_installed(self.backend.installed()?);
        let counts = manifest.counts();
        let summary = describe_counts(&counts);
        let mut report = Report {
            counts,
            dry_run: self.options.dry_run,
            ..Report::default()
        };

        if self.options.dry_run {
            self.log.dry_run(&format!(
                "would write {summary} to {}",
                output.display()
            ));
            return Ok(report);
        }

        if output.exists() && !self.options.force {
            return Err(ReconcileError::Backup {
                path: output.to_path_buf(),
                reason: "file exists (use --force to overwrite)".to_string(),
            });
        }

        let backup_err = |e: std::io::Error| ReconcileError::Backup {
            path: output.to_path_buf(),
            reason: e.to_string(),
        };
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(backup_err)?;
        }
        let content = format!(
            "# Backup generated by brewfiles\n# Generated: {}\n# Entries: {summary}\n\n{}",
            generated.format("%Y-%m-%d %H:%M:%S"),
            manifest.render_body()
        );
        std::fs::write(output, content).map_err(backup_err)?;

        self.log
            .success(&format!("backed up {summary} to {}", output.display()));
        report.backup = Some(output.to_path_buf());
        Ok(report)
    }

    fn plan(&self, merged: &MergedManifest) -> Result<Plan, ReconcileError> {
        let installed = self.backend.installed()?;
        self.log.debug(&format!(
            "{} declared entries, {} installed entries",
            merged.entries().len(),
            installed.len()
        ));
        Ok(Plan::compute(merged.entries(), &installed, self.log))
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::confirm::{MockConfirm, PromptGate};
    use crate::lifecycle::EphemeralFiles;
    use crate::logging::RecordingLog;
    use crate::manifest::merger::MergeInfo;
    use crate::manifest::{Entry, EntryKey, EntryKind};
    use std::collections::BTreeSet;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory package manager: install applies the merged manifest,
    /// remove drops keys. Counts mutating calls.
    #[derive(Debug, Default)]
    struct FakeBackend {
        state: Mutex<Vec<Entry>>,
        mutations: Mutex<usize>,
    }

    impl FakeBackend {
        fn with(lines: &[&str]) -> Self {
            let fake = Self::default();
            *fake.state.lock().unwrap() = lines.iter().copied().filter_map(Entry::parse).collect();
            fake
        }

        fn keys(&self) -> BTreeSet<String> {
            self.state
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.key().to_string())
                .collect()
        }

        fn mutations(&self) -> usize {
            *self.mutations.lock().unwrap()
        }
    }

    impl Backend for FakeBackend {
        fn installed(&self) -> Result<Vec<Entry>, ReconcileError> {
            Ok(self.state.lock().unwrap().clone())
        }

        fn install(&self, manifest: &Path) -> Result<(), ReconcileError> {
            *self.mutations.lock().unwrap() += 1;
            let declared = Manifest::load(manifest)?;
            let mut state = self.state.lock().unwrap();
            for entry in declared.entries {
                if !state.iter().any(|e| e.key() == entry.key()) {
                    state.push(entry);
                }
            }
            Ok(())
        }

        fn remove(&self, entries: &[Entry]) -> Result<(), ReconcileError> {
            *self.mutations.lock().unwrap() += 1;
            let doomed: BTreeSet<EntryKey> = entries.iter().map(Entry::key).collect();
            self.state
                .lock()
                .unwrap()
                .retain(|e| !doomed.contains(&e.key()));
            Ok(())
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        files: EphemeralFiles,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                files: EphemeralFiles::new(),
            }
        }

        fn merged(&self, manifests: &[(&str, &str)]) -> MergedManifest {
            let paths: Vec<PathBuf> = manifests
                .iter()
                .map(|(name, content)| {
                    let path = self.dir.path().join(format!("{name}.manifest"));
                    std::fs::write(&path, content).unwrap();
                    path
                })
                .collect();
            let info = MergeInfo {
                system: "test".to_string(),
                generated: Local::now(),
            };
            MergedManifest::create(&paths, &info, &self.files).unwrap()
        }
    }

    fn opts() -> RunOptions {
        RunOptions::default()
    }

    fn answering(answer: &str) -> PromptGate<Cursor<Vec<u8>>, Vec<u8>> {
        PromptGate::new(Cursor::new(answer.as_bytes().to_vec()), Vec::new())
    }

    fn keys(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(ToString::to_string).collect()
    }

    const BASE: &str = "brew \"git\"\nbrew \"jq\"\n";
    const DEV: &str = "cask \"docker\"\nvscode \"rust-lang.rust-analyzer\"\n";

    // -----------------------------------------------------------------------
    // install
    // -----------------------------------------------------------------------

    #[test]
    fn install_converges_and_never_removes() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE), ("dev", DEV)]);
        let backend = FakeBackend::with(&["brew \"git\"", "brew \"wget\""]);
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        gate.expect_ask().never();

        let report = Engine::new(&backend, &mut gate, &log, opts())
            .install(&merged)
            .unwrap();

        assert_eq!(report.installed, 3);
        assert!(report.plan.to_remove.is_empty());
        assert_eq!(
            backend.keys(),
            keys(&[
                "brew:git",
                "brew:jq",
                "brew:wget",
                "cask:docker",
                "vscode:rust-lang.rust-analyzer"
            ])
        );
    }

    #[test]
    fn install_twice_is_idempotent() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::default();
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        let mut engine = Engine::new(&backend, &mut gate, &log, opts());

        engine.install(&merged).unwrap();
        let state_after_first = backend.keys();
        let second = engine.install(&merged).unwrap();

        assert_eq!(second.installed, 0);
        assert!(!second.mutated());
        assert_eq!(backend.mutations(), 1);
        assert_eq!(backend.keys(), state_after_first);
        assert!(log.contains("success", "all 2 declared entries are installed"));
    }

    #[test]
    fn install_dry_run_is_pure() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::default();
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        let options = RunOptions {
            dry_run: true,
            ..opts()
        };

        let report = Engine::new(&backend, &mut gate, &log, options)
            .install(&merged)
            .unwrap();

        assert_eq!(report.plan.to_install.len(), 2);
        assert_eq!(report.installed, 0);
        assert_eq!(backend.mutations(), 0);
        assert!(log.contains("dry_run", "would install 2 entries (2 formulae)"));
    }

    #[test]
    fn install_failure_is_reported_without_retry() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let mut backend = MockBackend::new();
        backend.expect_installed().returning(|| Ok(Vec::new()));
        backend.expect_install().times(1).returning(|_| {
            Err(ReconcileError::BackendOperation {
                operation: "install",
                reason: "exit 1".to_string(),
            })
        });
        backend.expect_remove().never();
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();

        let err = Engine::new(&backend, &mut gate, &log, opts())
            .install(&merged)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::BackendOperation { .. }));
    }

    // -----------------------------------------------------------------------
    // cleanup
    // -----------------------------------------------------------------------

    #[test]
    fn cleanup_only_removes_undeclared_entries() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::with(&["brew \"git\"", "brew \"wget\"", "cask \"zoom\""]);
        let log = RecordingLog::default();
        let mut gate = answering("y\n");

        let report = Engine::new(&backend, &mut gate, &log, opts())
            .cleanup(&merged)
            .unwrap();

        assert_eq!(report.removed, 2);
        assert_eq!(backend.keys(), keys(&["brew:git"]));
        assert!(log.contains("success", "removed 2 entries (1 formulae, 1 casks)"));
    }

    #[test]
    fn cleanup_declined_is_cancelled_and_mutates_nothing() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::with(&["brew \"git\"", "brew \"wget\""]);
        let log = RecordingLog::default();
        let mut prompt = Vec::new();
        let mut gate = PromptGate::new(Cursor::new(b"n\n".to_vec()), &mut prompt);

        let err = Engine::new(&backend, &mut gate, &log, opts())
            .cleanup(&merged)
            .unwrap_err();

        assert!(err.is_cancellation());
        assert_eq!(backend.mutations(), 0);
        assert_eq!(
            String::from_utf8(prompt).unwrap(),
            "Remove 1 entries not declared in any manifest (1 formulae)? [y/N] "
        );
    }

    #[test]
    fn cleanup_eof_at_prompt_declines() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::with(&["brew \"wget\""]);
        let log = RecordingLog::default();
        let mut gate = answering("");

        let err = Engine::new(&backend, &mut gate, &log, opts())
            .cleanup(&merged)
            .unwrap_err();
        assert!(err.is_cancellation());
        assert_eq!(backend.keys(), keys(&["brew:wget"]));
    }

    #[test]
    fn cleanup_force_skips_gate() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::with(&["brew \"wget\""]);
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        gate.expect_ask().never();
        let options = RunOptions {
            force: true,
            ..opts()
        };

        let report = Engine::new(&backend, &mut gate, &log, options)
            .cleanup(&merged)
            .unwrap();
        assert_eq!(report.removed, 1);
        assert!(backend.keys().is_empty());
    }

    #[test]
    fn cleanup_dry_run_never_prompts_or_mutates() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::with(&["brew \"wget\"", "cask \"zoom\""]);
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        gate.expect_ask().never();
        let options = RunOptions {
            dry_run: true,
            ..opts()
        };

        let report = Engine::new(&backend, &mut gate, &log, options)
            .cleanup(&merged)
            .unwrap();
        assert_eq!(report.plan.to_remove.len(), 2);
        assert_eq!(backend.mutations(), 0);
        assert!(log.contains("dry_run", "would remove 2 entries"));
    }

    #[test]
    fn cleanup_with_nothing_undeclared_is_a_no_op() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::with(&["brew \"git\""]);
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        gate.expect_ask().never();

        let report = Engine::new(&backend, &mut gate, &log, opts())
            .cleanup(&merged)
            .unwrap();
        assert!(!report.mutated());
        assert_eq!(backend.mutations(), 0);
    }

    // -----------------------------------------------------------------------
    // sync
    // -----------------------------------------------------------------------

    #[test]
    fn sync_installs_then_cleans_up() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE), ("dev", DEV)]);
        let backend = FakeBackend::with(&["brew \"wget\""]);
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        gate.expect_ask().times(1).return_const(true);

        let report = Engine::new(&backend, &mut gate, &log, opts())
            .sync(&merged)
            .unwrap();

        assert_eq!(report.installed, 4);
        assert_eq!(report.removed, 1);
        assert_eq!(
            backend.keys(),
            keys(&[
                "brew:git",
                "brew:jq",
                "cask:docker",
                "vscode:rust-lang.rust-analyzer"
            ])
        );
        let stages = log.at("stage");
        let install_at = stages.iter().position(|s| s == "Planning install").unwrap();
        let cleanup_at = stages.iter().position(|s| s == "Planning cleanup").unwrap();
        assert!(install_at < cleanup_at);
    }

    #[test]
    fn sync_skips_cleanup_when_install_fails() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let mut backend = MockBackend::new();
        backend
            .expect_installed()
            .times(1)
            .returning(|| Ok(vec![Entry::new(EntryKind::Formula, "wget")]));
        backend.expect_install().returning(|_| {
            Err(ReconcileError::BackendOperation {
                operation: "install",
                reason: "exit 1".to_string(),
            })
        });
        backend.expect_remove().never();
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        gate.expect_ask().never();

        let result = Engine::new(&backend, &mut gate, &log, opts()).sync(&merged);
        assert!(result.is_err());
        assert!(!log.at("stage").iter().any(|s| s == "Planning cleanup"));
    }

    // -----------------------------------------------------------------------
    // diff
    // -----------------------------------------------------------------------

    #[test]
    fn diff_lists_both_sides_and_ignores_dry_run() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::with(&["brew \"git\"", "cask \"zoom\""]);
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        gate.expect_ask().never();

        for dry_run in [false, true] {
            let options = RunOptions {
                dry_run,
                ..opts()
            };
            let report = Engine::new(&backend, &mut gate, &log, options)
                .diff(&merged)
                .unwrap();
            assert!(!report.dry_run);
            assert_eq!(report.plan.to_install.len(), 1);
            assert_eq!(report.plan.to_remove.len(), 1);
        }

        assert_eq!(backend.mutations(), 0);
        assert!(log.contains("result", "+ brew \"jq\""));
        assert!(log.contains("result", "- cask \"zoom\""));
        assert!(log.at("dry_run").is_empty());
    }

    #[test]
    fn diff_reports_no_differences_when_converged() {
        let fx = Fixture::new();
        let merged = fx.merged(&[("base", BASE)]);
        let backend = FakeBackend::with(&["brew \"git\"", "brew \"jq\""]);
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();

        let report = Engine::new(&backend, &mut gate, &log, opts())
            .diff(&merged)
            .unwrap();
        assert!(report.plan.is_converged());
        assert!(log.contains("result", "no differences"));
    }

    // -----------------------------------------------------------------------
    // backup
    // -----------------------------------------------------------------------

    fn scenario_b_backend() -> FakeBackend {
        FakeBackend::with(&["brew \"git\"", "brew \"jq\"", "brew \"wget\"", "cask \"firefox\""])
    }

    #[test]
    fn backup_writes_one_line_per_entry() {
        let fx = Fixture::new();
        let backend = scenario_b_backend();
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        let output = fx.dir.path().join("snap.manifest");

        let report = Engine::new(&backend, &mut gate, &log, opts())
            .backup(&output, Local::now())
            .unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        let brew_lines = text.lines().filter(|l| l.starts_with("brew ")).count();
        let cask_lines = text.lines().filter(|l| l.starts_with("cask ")).count();
        assert_eq!((brew_lines, cask_lines), (3, 1));
        assert_eq!(report.counts[&EntryKind::Formula], 3);
        assert_eq!(report.counts[&EntryKind::Cask], 1);
        assert_eq!(report.backup.as_deref(), Some(output.as_path()));
        assert!(log.contains("success", "3 formulae, 1 casks"));
    }

    #[test]
    fn backup_round_trips_through_the_parser() {
        let fx = Fixture::new();
        let backend = FakeBackend::with(&[
            "tap \"user/tap\"",
            "brew \"user/tap/fd\"",
            "mas \"Xcode\", id: 497799835",
            "vscode \"rust-lang.rust-analyzer\"",
        ]);
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        let output = fx.dir.path().join("snap.manifest");

        Engine::new(&backend, &mut gate, &log, opts())
            .backup(&output, Local::now())
            .unwrap();

        let reparsed: BTreeSet<String> = Manifest::load(&output)
            .unwrap()
            .entries
            .iter()
            .map(|e| e.key().to_string())
            .collect();
        assert_eq!(reparsed, backend.keys());
    }

    #[test]
    fn backup_refuses_to_overwrite_without_force() {
        let fx = Fixture::new();
        let backend = scenario_b_backend();
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        let output = fx.dir.path().join("snap.manifest");
        std::fs::write(&output, "keep me").unwrap();

        let err = Engine::new(&backend, &mut gate, &log, opts())
            .backup(&output, Local::now())
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Backup { .. }));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");

        let options = RunOptions {
            force: true,
            ..opts()
        };
        Engine::new(&backend, &mut gate, &log, options)
            .backup(&output, Local::now())
            .unwrap();
        assert!(std::fs::read_to_string(&output).unwrap().contains("brew \"git\""));
    }

    #[test]
    fn backup_dry_run_writes_nothing() {
        let fx = Fixture::new();
        let backend = scenario_b_backend();
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        let output = fx.dir.path().join("snap.manifest");
        let options = RunOptions {
            dry_run: true,
            ..opts()
        };

        let report = Engine::new(&backend, &mut gate, &log, options)
            .backup(&output, Local::now())
            .unwrap();
        assert!(!output.exists());
        assert!(report.backup.is_none());
        assert_eq!(report.counts.values().sum::<usize>(), 4);
    }

    #[test]
    fn backup_creates_missing_parent_directory() {
        let fx = Fixture::new();
        let backend = scenario_b_backend();
        let log = RecordingLog::default();
        let mut gate = MockConfirm::new();
        let output = fx.dir.path().join("nested/dir/snap.manifest");

        Engine::new(&backend, &mut gate, &log, opts())
            .backup(&output, Local::now())
            .unwrap();
        assert!(output.is_file());
    }
}
