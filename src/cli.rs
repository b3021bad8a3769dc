//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::engine::RunOptions;
use crate::error::ReconcileError;
use crate::manifest::{ManifestSelection, SystemType};

/// Version string baked in at build time (`git describe` or
/// `BREWFILES_VERSION`), falling back to the crate version.
pub const VERSION: &str = match option_env!("BREWFILES_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Top-level CLI entry point for the manifest reconciliation engine.
#[derive(Parser, Debug)]
#[command(
    name = "brewfiles",
    about = "Reconcile installed packages against declarative manifests",
    version = VERSION
)]
pub struct Cli {
    /// Command to run (defaults to `install`).
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show warnings, errors, and results
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all commands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Skip confirmation prompts and overwrite existing backups
    #[arg(short, long, global = true)]
    pub force: bool,

    /// System type selecting the manifests (base, dev, productivity, utilities, all)
    #[arg(long, global = true, conflicts_with = "manifests")]
    pub system: Option<String>,

    /// Comma-separated manifest names or paths, in merge order
    #[arg(long, global = true, value_delimiter = ',')]
    pub manifests: Vec<String>,

    /// Output path for `backup`
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Override the manifest directory
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Install every declared package that is missing
    Install,
    /// Remove installed packages no manifest declares
    Cleanup,
    /// Install, then clean up
    Sync,
    /// Show what install and cleanup would change
    Diff,
    /// Write the installed packages to a new manifest
    Backup,
    /// Print shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

impl Command {
    /// Command name as typed on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Cleanup => "cleanup",
            Self::Sync => "sync",
            Self::Diff => "diff",
            Self::Backup => "backup",
            Self::Completions { .. } => "completions",
        }
    }
}

impl Cli {
    /// The command to run, `install` when none was given.
    #[must_use]
    pub const fn effective_command(&self) -> Command {
        match self.command {
            Some(command) => command,
            None => Command::Install,
        }
    }

    /// Flags for the reconciliation engine.
    #[must_use]
    pub const fn run_options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.global.dry_run,
            force: self.global.force,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }

    /// Which manifests to operate on: the explicit list if given, otherwise
    /// the system type (default `all`).
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnknownSystemType`] for an unrecognized
    /// `--system` value.
    pub fn selection(&self) -> Result<ManifestSelection, ReconcileError> {
        if !self.global.manifests.is_empty() {
            let names = self
                .global
                .manifests
                .iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            return Ok(ManifestSelection::Explicit(names));
        }
        let system = match &self.global.system {
            Some(name) => name.parse()?,
            None => SystemType::default(),
        };
        Ok(ManifestSelection::System(system))
    }
}
