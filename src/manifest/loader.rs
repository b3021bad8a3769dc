//! Resolve a system type or explicit manifest list into ordered file paths.
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::MANIFEST_EXTENSION;
use crate::error::ReconcileError;

/// Named preset selecting which manifests compose the active scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemType {
    /// Core tools every machine gets.
    Base,
    /// Base plus development tooling.
    Dev,
    /// Base plus office and communication apps.
    Productivity,
    /// Base plus system utilities.
    Utilities,
    /// Every manifest.
    #[default]
    All,
}

impl SystemType {
    /// All recognized system types.
    pub const ALL: [Self; 5] = [
        Self::Base,
        Self::Dev,
        Self::Productivity,
        Self::Utilities,
        Self::All,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Dev => "dev",
            Self::Productivity => "productivity",
            Self::Utilities => "utilities",
            Self::All => "all",
        }
    }

    /// Built-in ordered manifest names for this preset.
    #[must_use]
    pub const fn default_manifests(self) -> &'static [&'static str] {
        match self {
            Self::Base => &["base"],
            Self::Dev => &["base", "dev"],
            Self::Productivity => &["base", "productivity"],
            Self::Utilities => &["base", "utilities"],
            Self::All => &["base", "dev", "productivity", "utilities"],
        }
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SystemType {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| ReconcileError::UnknownSystemType(s.to_string()))
    }
}

/// Which manifests the current invocation operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSelection {
    /// A preset resolved through the system table.
    System(SystemType),
    /// Explicit names or paths, in order.
    Explicit(Vec<String>),
}

impl ManifestSelection {
    /// Human-readable description for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::System(system) => format!("system type '{system}'"),
            Self::Explicit(_) => "--manifests".to_string(),
        }
    }

    /// Label written into the merged manifest header.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::System(system) => system.to_string(),
            Self::Explicit(_) => "custom".to_string(),
        }
    }
}

/// Ordered manifest names for every system type.
///
/// Starts from the built-in presets; entries may be replaced from
/// `systems.toml` via [`crate::config::systems`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTable {
    presets: BTreeMap<SystemType, Vec<String>>,
}

impl Default for SystemTable {
    fn default() -> Self {
        let presets = SystemType::ALL
            .into_iter()
            .map(|t| {
                let names = t.default_manifests().iter().map(ToString::to_string);
                (t, names.collect())
            })
            .collect();
        Self { presets }
    }
}

impl SystemTable {
    /// Replace the manifest list of one preset.
    pub fn set(&mut self, system: SystemType, manifests: Vec<String>) {
        self.presets.insert(system, manifests);
    }

    /// Ordered manifest names for a preset.
    #[must_use]
    pub fn manifests(&self, system: SystemType) -> &[String] {
        self.presets.get(&system).map_or(&[], Vec::as_slice)
    }
}

/// Resolve a selection into an ordered list of absolute, existing paths.
///
/// Fails on the first missing file; no partial list is returned. An empty
/// selection is an error rather than an empty scope.
///
/// # Errors
///
/// Returns [`ReconcileError::EmptySelection`] if the selection names no
/// manifests, or [`ReconcileError::ManifestNotFound`] naming the first path
/// that does not exist.
pub fn resolve(
    selection: &ManifestSelection,
    manifest_dir: &Path,
    systems: &SystemTable,
) -> Result<Vec<PathBuf>, ReconcileError> {
    let names: Vec<&str> = match selection {
        ManifestSelection::System(system) => {
            systems.manifests(*system).iter().map(String::as_str).collect()
        }
        ManifestSelection::Explicit(names) => names.iter().map(String::as_str).collect(),
    };
    if names.is_empty() {
        return Err(ReconcileError::EmptySelection {
            selection: selection.describe(),
        });
    }

    names
        .into_iter()
        .map(|name| resolve_one(name, manifest_dir))
        .collect()
}

/// Resolve one name: absolute paths are used as-is, anything else is joined
/// onto the manifest directory, retrying with the `.manifest` extension when
/// the bare name has none and does not exist.
fn resolve_one(name: &str, manifest_dir: &Path) -> Result<PathBuf, ReconcileError> {
    let given = Path::new(name);
    let candidate = if given.is_absolute() {
        given.to_path_buf()
    } else {
        manifest_dir.join(given)
    };

    let path = if !candidate.is_file() && candidate.extension().is_none() {
        candidate.with_extension(MANIFEST_EXTENSION)
    } else {
        candidate
    };

    if !path.is_file() {
        return Err(ReconcileError::ManifestNotFound { path });
    }
    dunce::canonicalize(&path).map_err(|_| ReconcileError::ManifestNotFound { path })
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

    fn manifest_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        dir
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn parse_system_types() {
        assert_eq!("dev".parse::<SystemType>().unwrap(), SystemType::Dev);
        assert_eq!(" ALL ".parse::<SystemType>().unwrap(), SystemType::All);
        let err = "gaming".parse::<SystemType>().unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownSystemType(ref s) if s == "gaming"));
    }

    #[test]
    fn default_system_is_all() {
        assert_eq!(SystemType::default(), SystemType::All);
    }

    #[test]
    fn all_preset_order() {
        let table = SystemTable::default();
        assert_eq!(
            table.manifests(SystemType::All),
            ["base", "dev", "productivity", "utilities"]
        );
    }

    #[test]
    fn dev_resolves_base_then_dev() {
        let dir = manifest_dir(&["base.manifest", "dev.manifest", "utilities.manifest"]);
        let paths = resolve(
            &ManifestSelection::System(SystemType::Dev),
            dir.path(),
            &SystemTable::default(),
        )
        .unwrap();
        assert_eq!(file_names(&paths), ["base.manifest", "dev.manifest"]);
        assert!(paths.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn missing_manifest_fails_fast_naming_file() {
        let dir = manifest_dir(&["base.manifest"]);
        let err = resolve(
            &ManifestSelection::System(SystemType::All),
            dir.path(),
            &SystemTable::default(),
        )
        .unwrap_err();
        match err {
            ReconcileError::ManifestNotFound { path } => {
                assert_eq!(path.file_name().unwrap(), "dev.manifest");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn explicit_names_keep_order() {
        let dir = manifest_dir(&["work.manifest", "base.manifest"]);
        let paths = resolve(
            &ManifestSelection::Explicit(vec!["work".into(), "base.manifest".into()]),
            dir.path(),
            &SystemTable::default(),
        )
        .unwrap();
        assert_eq!(file_names(&paths), ["work.manifest", "base.manifest"]);
    }

    #[test]
    fn explicit_absolute_path() {
        let elsewhere = manifest_dir(&["Brewfile"]);
        let dir = manifest_dir(&[]);
        let abs = elsewhere.path().join("Brewfile");
        let paths = resolve(
            &ManifestSelection::Explicit(vec![abs.to_string_lossy().to_string()]),
            dir.path(),
            &SystemTable::default(),
        )
        .unwrap();
        assert_eq!(file_names(&paths), ["Brewfile"]);
    }

    #[test]
    fn bare_name_without_extension_prefers_exact_file() {
        let dir = manifest_dir(&["Brewfile", "Brewfile.manifest"]);
        let paths = resolve(
            &ManifestSelection::Explicit(vec!["Brewfile".into()]),
            dir.path(),
            &SystemTable::default(),
        )
        .unwrap();
        assert_eq!(file_names(&paths), ["Brewfile"]);
    }

    #[test]
    fn overridden_preset_is_used() {
        let dir = manifest_dir(&["base.manifest", "work.manifest"]);
        let mut table = SystemTable::default();
        table.set(SystemType::Dev, vec!["base".into(), "work".into()]);
        let paths = resolve(
            &ManifestSelection::System(SystemType::Dev),
            dir.path(),
            &table,
        )
        .unwrap();
        assert_eq!(file_names(&paths), ["base.manifest", "work.manifest"]);
    }

    #[test]
    fn empty_explicit_list_is_rejected() {
        let dir = manifest_dir(&["base.manifest"]);
        let err = resolve(
            &ManifestSelection::Explicit(vec![]),
            dir.path(),
            &SystemTable::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::EmptySelection { ref selection } if selection == "--manifests"
        ));
    }

    #[test]
    fn emptied_preset_is_rejected() {
        let dir = manifest_dir(&["base.manifest"]);
        let mut table = SystemTable::default();
        table.set(SystemType::Base, vec![]);
        let err = resolve(&ManifestSelection::System(SystemType::Base), dir.path(), &table)
            .unwrap_err();
        assert_eq!(err.to_string(), "no manifests selected by system type 'base'");
    }

    #[test]
    fn selection_labels() {
        assert_eq!(ManifestSelection::System(SystemType::Dev).label(), "dev");
        assert_eq!(ManifestSelection::Explicit(vec![]).label(), "custom");
    }
}
