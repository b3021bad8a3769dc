//! Process lifecycle: signal handling and cleanup of ephemeral files.
//!
//! Normal exits release ephemeral files through `Drop`. An interrupt
//! arrives while the main thread is usually blocked inside a backend call,
//! so the signal handler removes every registered file itself before
//! exiting.
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context as _, Result};

/// Exit status used when the process is interrupted.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Shared set of ephemeral files that must not outlive the process.
#[derive(Debug, Clone, Default)]
pub struct EphemeralFiles {
    paths: Arc<Mutex<Vec<PathBuf>>>,
}

impl EphemeralFiles {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `path` until [`forget`](Self::forget) is called.
    pub fn register(&self, path: &Path) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());
    }

    /// Create a file with `create` and track it under the same lock, so a
    /// signal arriving in between still finds it.
    ///
    /// # Errors
    ///
    /// Returns whatever `create` returns; nothing is tracked in that case.
    pub fn create_tracked<T, F>(&self, create: F) -> std::io::Result<T>
    where
        T: AsRef<Path>,
        F: FnOnce() -> std::io::Result<T>,
    {
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        let created = create()?;
        paths.push(created.as_ref().to_path_buf());
        Ok(created)
    }

    /// Stop tracking `path`.
    pub fn forget(&self, path: &Path) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|p| p != path);
    }

    /// Snapshot of the tracked paths.
    #[must_use]
    pub fn tracked(&self) -> Vec<PathBuf> {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Delete every tracked file (best effort) and clear the registry.
    /// Returns the number of files removed.
    pub fn remove_all(&self) -> usize {
        let paths = std::mem::take(&mut *self.paths.lock().unwrap_or_else(PoisonError::into_inner));
        paths
            .iter()
            .filter(|p| std::fs::remove_file(p).is_ok())
            .count()
    }
}

/// Install a SIGINT/SIGTERM handler that releases `files` and exits with
/// [`INTERRUPTED_EXIT_CODE`].
///
/// # Errors
///
/// Returns an error if a handler is already installed.
pub fn install_signal_handler(files: EphemeralFiles) -> Result<()> {
    ctrlc::set_handler(move || {
        let removed = files.remove_all();
        tracing::warn!("interrupted; removed {removed} temporary file(s)");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
    .context("failed to set signal handler")
}
