//! Manifest files: parsing, source resolution, and merging.
pub mod entry;
pub mod loader;
pub mod merger;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use entry::{Entry, EntryKey, EntryKind};
pub use loader::{ManifestSelection, SystemType};
pub use merger::MergedManifest;

use crate::error::ReconcileError;

/// File extension used for manifests resolved by bare name.
pub const MANIFEST_EXTENSION: &str = "manifest";

/// An ordered list of entries backed by a text file.
///
/// Non-entry lines (comments, blanks, unrecognized directives) are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Entries in declaration order, duplicates preserved.
    pub entries: Vec<Entry>,
}

impl Manifest {
    /// Parse manifest text.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self {
            entries: content.lines().filter_map(Entry::parse).collect(),
        }
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::ManifestNotFound`] if the file does not
    /// exist, or [`ReconcileError::Merge`] for any other read failure.
    pub fn load(path: &Path) -> Result<Self, ReconcileError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ReconcileError::ManifestNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(ReconcileError::Merge {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Build a manifest from entries, grouped by kind in manifest order and
    /// sorted by identifier within each group.
    #[must_use]
    pub fn from_installed(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Self { entries }
    }

    /// Number of entries of each kind, in manifest order. Kinds with no
    /// entries are omitted.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<EntryKind, usize> {
        count_kinds(&self.entries)
    }

    /// Render the entries as manifest text, one per line, with a blank
    /// line between kinds.
    #[must_use]
    pub fn render_body(&self) -> String {
        let mut out = String::new();
        let mut previous: Option<EntryKind> = None;
        for entry in &self.entries {
            if previous.is_some_and(|k| k != entry.kind) {
                out.push('\n');
            }
            out.push_str(&entry.to_string());
            out.push('\n');
            previous = Some(entry.kind);
        }
        out
    }
}

/// Number of entries of each kind. Kinds with no entries are omitted.
#[must_use]
pub fn count_kinds<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> BTreeMap<EntryKind, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.kind).or_insert(0) += 1;
    }
    counts
}

/// Human-readable `3 formulae, 1 casks` style summary.
#[must_use]
pub fn describe_counts(counts: &BTreeMap<EntryKind, usize>) -> String {
    if counts.is_empty() {
        return "no entries".to_string();
    }
    counts
        .iter()
        .map(|(kind, n)| format!("{n} {}", kind.plural()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Default path for a backup taken at `now`.
#[must_use]
pub fn backup_path(dir: &Path, now: chrono::DateTime<chrono::Local>) -> PathBuf {
    dir.join(format!(
        "backup-{}.{MANIFEST_EXTENSION}",
        now.format("%Y%m%d-%H%M%S")
    ))
}
