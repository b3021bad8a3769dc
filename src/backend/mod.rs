//! The opaque package manager the engine converges against.
pub mod brew;

use std::path::Path;

pub use brew::BrewBackend;

use crate::error::ReconcileError;
use crate::manifest::Entry;

/// Primitive operations the reconciliation engine needs from a package
/// manager. Dependency resolution stays inside the backend.
#[cfg_attr(test, mockall::automock)]
pub trait Backend: std::fmt::Debug {
    /// Query the live set of installed entries.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::BackendOperation`] if the query fails.
    fn installed(&self) -> Result<Vec<Entry>, ReconcileError>;

    /// Install everything declared in `manifest` as one batch.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::BackendOperation`] if the batch fails.
    /// Partially applied changes are not rolled back.
    fn install(&self, manifest: &Path) -> Result<(), ReconcileError>;

    /// Remove `entries`, batched per kind.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::BackendOperation`] on the first failing batch.
    fn remove(&self, entries: &[Entry]) -> Result<(), ReconcileError>;
}
