// Shared helpers for integration tests.
//
// Provides a temporary manifest directory, an in-memory package backend, a
// recording logger, and a fluent builder so each integration test can run a
// full command without touching the real package manager.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use brewfiles_cli::backend::Backend;
use brewfiles_cli::cli::Cli;
use brewfiles_cli::commands::{self, Runtime};
use brewfiles_cli::confirm::PromptGate;
use brewfiles_cli::engine::Report;
use brewfiles_cli::error::ReconcileError;
use brewfiles_cli::lifecycle::EphemeralFiles;
use brewfiles_cli::logging::Log;
use brewfiles_cli::manifest::{Entry, EntryKey, Manifest};
use chrono::Local;
use clap::Parser;

/// One call to [`FakeBackend::install`], captured while the merged manifest
/// still existed.
#[derive(Debug, Clone)]
pub struct InstallCall {
    /// Path the backend was given.
    pub path: PathBuf,
    /// File contents at call time.
    pub content: String,
}

/// In-memory package manager.
///
/// `install` reads the merged manifest and adds what is missing; `remove`
/// drops entries by key. Every call is recorded.
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<Vec<Entry>>,
    installs: Mutex<Vec<InstallCall>>,
    removals: Mutex<Vec<Vec<Entry>>>,
    fail_install: bool,
}

impl FakeBackend {
    /// Installed keys, e.g. `brew:git`.
    pub fn keys(&self) -> BTreeSet<String> {
        self.state
            .lock()
            .expect("state lock")
            .iter()
            .map(|e| e.key().to_string())
            .collect()
    }

    /// Recorded install calls.
    pub fn installs(&self) -> Vec<InstallCall> {
        self.installs.lock().expect("installs lock").clone()
    }

    /// Recorded removal batches.
    pub fn removals(&self) -> Vec<Vec<Entry>> {
        self.removals.lock().expect("removals lock").clone()
    }
}

impl Backend for FakeBackend {
    fn installed(&self) -> Result<Vec<Entry>, ReconcileError> {
        Ok(self.state.lock().expect("state lock").clone())
    }

    fn install(&self, manifest: &Path) -> Result<(), ReconcileError> {
        let content = std::fs::read_to_string(manifest).expect("merged manifest readable");
        self.installs.lock().expect("installs lock").push(InstallCall {
            path: manifest.to_path_buf(),
            content: content.clone(),
        });
        if self.fail_install {
            return Err(ReconcileError::BackendOperation {
                operation: "install",
                reason: "simulated failure".to_string(),
            });
        }
        let mut state = self.state.lock().expect("state lock");
        for entry in Manifest::parse(&content).entries {
            if !state.iter().any(|e| e.key() == entry.key()) {
                state.push(entry);
            }
        }
        Ok(())
    }

    fn remove(&self, entries: &[Entry]) -> Result<(), ReconcileError> {
        self.removals
            .lock()
            .expect("removals lock")
            .push(entries.to_vec());
        let doomed: BTreeSet<EntryKey> = entries.iter().map(Entry::key).collect();
        self.state
            .lock()
            .expect("state lock")
            .retain(|e| !doomed.contains(&e.key()));
        Ok(())
    }
}

/// [`Log`] implementation that keeps every line for assertions.
#[derive(Debug, Default)]
pub struct CollectingLog {
    lines: Mutex<Vec<(&'static str, String)>>,
}

impl CollectingLog {
    fn push(&self, level: &'static str, msg: &str) {
        self.lines
            .lock()
            .expect("log lock")
            .push((level, msg.to_string()));
    }

    /// Messages logged at `level`.
    pub fn at(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .expect("log lock")
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.at(level).iter().any(|m| m.contains(needle))
    }
}

impl Log for CollectingLog {
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

/// An isolated manifest directory plus fake collaborators.
///
/// The directory is automatically deleted when dropped (via the underlying
/// [`tempfile::TempDir`]).
pub struct IntegrationTestContext {
    /// Temporary manifest directory.
    pub dir: tempfile::TempDir,
    /// Fake package manager.
    pub backend: FakeBackend,
    /// Recorded log output.
    pub log: CollectingLog,
    /// Ephemeral file registry shared with the command under test.
    pub files: EphemeralFiles,
}

impl IntegrationTestContext {
    /// Path to the manifest directory.
    pub fn manifest_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Run `brewfiles --dir <manifest dir> <args…>`, answering any
    /// confirmation prompt with `answer`.
    pub fn run(&self, args: &[&str], answer: &str) -> anyhow::Result<Report> {
        let dir = self.dir.path().to_string_lossy().to_string();
        let argv = ["brewfiles", "--dir", dir.as_str()]
            .into_iter()
            .chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).expect("valid arguments");
        let mut gate = PromptGate::new(Cursor::new(answer.as_bytes().to_vec()), Vec::new());
        commands::run(
            &cli,
            Runtime {
                backend: &self.backend,
                gate: &mut gate,
                log: &self.log,
                files: &self.files,
                started: Local::now(),
            },
        )
    }

    /// Files left in the manifest directory, by name.
    pub fn dir_entries(&self) -> BTreeSet<String> {
        std::fs::read_dir(self.dir.path())
            .expect("read manifest dir")
            .map(|e| {
                e.expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .to_string()
            })
            .collect()
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    manifests: Vec<(String, String)>,
    installed: Vec<String>,
    systems_toml: Option<String>,
    fail_install: bool,
}

impl TestContextBuilder {
    /// Begin building a context with no manifests and nothing installed.
    pub fn new() -> Self {
        Self {
            manifests: Vec::new(),
            installed: Vec::new(),
            systems_toml: None,
            fail_install: false,
        }
    }

    /// Write `<name>.manifest` with `content`.
    pub fn manifest(mut self, name: &str, content: &str) -> Self {
        self.manifests.push((name.to_string(), content.to_string()));
        self
    }

    /// Mark manifest lines as already installed.
    pub fn installed(mut self, lines: &[&str]) -> Self {
        self.installed
            .extend(lines.iter().map(ToString::to_string));
        self
    }

    /// Write `systems.toml` with `content`.
    pub fn systems_toml(mut self, content: &str) -> Self {
        self.systems_toml = Some(content.to_string());
        self
    }

    /// Make the backend's install batch fail.
    pub fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    /// Finalise the builder.
    pub fn build(self) -> IntegrationTestContext {
        let dir = tempfile::tempdir().expect("create temp dir");
        for (name, content) in &self.manifests {
            std::fs::write(dir.path().join(format!("{name}.manifest")), content)
                .expect("write manifest");
        }
        if let Some(content) = &self.systems_toml {
            std::fs::write(dir.path().join("systems.toml"), content).expect("write systems.toml");
        }
        let backend = FakeBackend {
            state: Mutex::new(
                self.installed
                    .iter()
                    .filter_map(|l| Entry::parse(l))
                    .collect(),
            ),
            fail_install: self.fail_install,
            ..FakeBackend::default()
        };
        IntegrationTestContext {
            dir,
            backend,
            log: CollectingLog::default(),
            files: EphemeralFiles::new(),
        }
    }
}

/// Build a set of keys from string literals.
pub fn keys(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(ToString::to_string).collect()
}

/// Whether `err` carries [`ReconcileError::UserCancelled`].
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ReconcileError>()
        .is_some_and(ReconcileError::is_cancellation)
}
