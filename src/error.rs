//! Domain-specific error types for the reconciliation engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors ([`ReconcileError`], [`ConfigError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ReconcileError
//! ├── ManifestNotFound    — a resolved manifest path does not exist
//! ├── UnknownSystemType   — system type outside the recognized set
//! ├── EmptySelection      — the selection names no manifests at all
//! ├── Merge               — I/O failure while building the merged manifest
//! ├── BackendOperation    — the package manager call failed
//! ├── Backup              — backup output could not be written
//! └── UserCancelled       — confirmation declined (not a failure)
//! ConfigError             — systems.toml read/parse failures
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving, merging, and reconciling manifests.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A named manifest does not exist. Raised before any merge begins.
    #[error("manifest not found: {}", path.display())]
    ManifestNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The requested system type is not one of the recognized presets.
    #[error(
        "unknown system type '{0}': must be one of base, dev, productivity, utilities, all"
    )]
    UnknownSystemType(String),

    /// The selection resolved to no manifests. Raised before any merge.
    #[error("no manifests selected by {selection}")]
    EmptySelection {
        /// Description of the selection, e.g. `system type 'dev'`.
        selection: String,
    },

    /// Reading a source manifest or writing the merged manifest failed.
    #[error("failed to merge manifest {}: {source}", path.display())]
    Merge {
        /// File being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The backend package manager reported a failure.
    #[error("backend {operation} failed: {reason}")]
    BackendOperation {
        /// Backend primitive that failed (e.g. `install`, `dump`).
        operation: &'static str,
        /// Human-readable failure detail.
        reason: String,
    },

    /// The backup manifest could not be written.
    #[error("cannot write backup {}: {reason}", path.display())]
    Backup {
        /// Requested output path.
        path: PathBuf,
        /// Human-readable failure detail.
        reason: String,
    },

    /// The user declined a destructive action at the confirmation prompt.
    #[error("cancelled by user")]
    UserCancelled,
}

impl ReconcileError {
    /// Wrap an arbitrary backend failure, keeping the full cause chain.
    #[must_use]
    pub fn backend(operation: &'static str, err: &anyhow::Error) -> Self {
        Self::BackendOperation {
            operation,
            reason: format!("{err:#}"),
        }
    }

    /// Return `true` for outcomes that must not be reported as failures.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}

/// Errors that arise from loading `systems.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape.
    #[error("invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser message.
        message: String,
    },

    /// A table names a system type outside the recognized set.
    #[error("{file}: {source}")]
    System {
        /// File containing the unknown table.
        file: String,
        /// The rejected system type.
        source: ReconcileError,
    },
}
