//! Declarative package-manifest reconciliation.
//!
//! Composes Brewfile-style manifests selected by system type (or an explicit
//! list) into one ephemeral merged manifest, diffs it against the packages
//! the backend reports as installed, and converges: install what is missing,
//! remove what no manifest declares (after confirmation), or snapshot the
//! installed state into a new manifest.
//!
//! The public API is organised into layers:
//!
//! - **[`manifest`]**: entry syntax, source resolution, and merging
//! - **[`backend`]**: the package manager behind a mockable trait
//! - **[`engine`]**: install, cleanup, sync, diff, and backup
//! - **[`commands`]**: command orchestration and merged-manifest lifetime
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod error;
pub mod exec;
pub mod lifecycle;
pub mod logging;
pub mod manifest;
