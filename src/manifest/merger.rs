//! Concatenate resolved manifests into one ephemeral merged manifest.
//!
//! The merged file lives only as long as its [`MergedManifest`] guard:
//! dropping the guard deletes it on success, error, and panic alike.
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tempfile::TempPath;

use super::{Entry, MANIFEST_EXTENSION};
use crate::error::ReconcileError;
use crate::lifecycle::EphemeralFiles;

/// Run metadata recorded in the merged manifest header.
#[derive(Debug, Clone)]
pub struct MergeInfo {
    /// System type label (or `custom` for explicit lists).
    pub system: String,
    /// Generation time.
    pub generated: DateTime<Local>,
}

/// An entry together with the manifest that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedEntry {
    /// Declared entry.
    pub entry: Entry,
    /// Source manifest path.
    pub source: PathBuf,
}

/// Scoped handle to an ephemeral merged manifest file.
#[derive(Debug)]
pub struct MergedManifest {
    path: TempPath,
    sources: Vec<PathBuf>,
    entries: Vec<SourcedEntry>,
    registry: EphemeralFiles,
}

impl MergedManifest {
    /// Merge `sources` in order into a new temporary file.
    ///
    /// Only recognized entry lines are copied; each source is preceded by a
    /// provenance comment. Duplicates are kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::ManifestNotFound`] if a source disappeared
    /// since resolution, or [`ReconcileError::Merge`] on any other I/O
    /// failure. No file is left behind on error.
    pub fn create(
        sources: &[PathBuf],
        info: &MergeInfo,
        registry: &EphemeralFiles,
    ) -> Result<Self, ReconcileError> {
        let mut body = render_header(sources, info);
        let mut entries = Vec::new();

        for source in sources {
            let content = std::fs::read_to_string(source).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ReconcileError::ManifestNotFound {
                        path: source.clone(),
                    }
                } else {
                    ReconcileError::Merge {
                        path: source.clone(),
                        source: e,
                    }
                }
            })?;

            let _ = writeln!(body, "\n# --- from {} ---", source.display());
            for line in content.lines() {
                if let Some(entry) = Entry::parse(line) {
                    body.push_str(line.trim());
                    body.push('\n');
                    entries.push(SourcedEntry {
                        entry,
                        source: source.clone(),
                    });
                }
            }
        }

        let path = write_temp(&body, registry)?;
        Ok(Self {
            path,
            sources: sources.to_vec(),
            entries,
            registry: registry.clone(),
        })
    }

    /// Path of the merged file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Source manifests in merge order.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// All merged entries with provenance, in merge order.
    #[must_use]
    pub fn entries(&self) -> &[SourcedEntry] {
        &self.entries
    }
}

impl Drop for MergedManifest {
    fn drop(&mut self) {
        self.registry.forget(&self.path);
        // TempPath removes the file when dropped right after this.
    }
}

fn render_header(sources: &[PathBuf], info: &MergeInfo) -> String {
    let mut header = String::new();
    let _ = writeln!(header, "# Merged manifest generated by brewfiles");
    let _ = writeln!(
        header,
        "# Generated: {}",
        info.generated.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(header, "# System type: {}", info.system);
    let _ = writeln!(header, "# Sources:");
    for source in sources {
        let _ = writeln!(header, "#   {}", source.display());
    }
    header
}

/// Write `body` to a new temp file that is registered from the moment it
/// exists.
fn write_temp(body: &str, registry: &EphemeralFiles) -> Result<TempPath, ReconcileError> {
    let tmp_dir = std::env::temp_dir();
    let merge_err = |source| ReconcileError::Merge {
        path: tmp_dir.clone(),
        source,
    };
    let mut file = registry
        .create_tracked(|| {
            tempfile::Builder::new()
                .prefix("brewfiles-merged-")
                .suffix(&format!(".{MANIFEST_EXTENSION}"))
                .tempfile()
        })
        .map_err(merge_err)?;
    if let Err(e) = file.write_all(body.as_bytes()).and_then(|()| file.flush()) {
        registry.forget(file.path());
        return Err(merge_err(e));
    }
    Ok(file.into_temp_path())
}
