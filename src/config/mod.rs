//! Runtime configuration: where manifests live and how presets resolve.
pub mod systems;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::manifest::loader::SystemTable;

/// Environment variable overriding the manifest directory.
pub const DIR_ENV: &str = "BREWFILES_DIR";

/// Name of the manifest directory inside a provisioning repository.
pub const MANIFEST_DIR_NAME: &str = "manifests";

/// Configuration shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory bare manifest names resolve against.
    pub manifest_dir: PathBuf,
    /// Manifest lists for each system type.
    pub systems: SystemTable,
}

impl Settings {
    /// Resolve the manifest directory and load `systems.toml` from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest directory cannot be determined or
    /// `systems.toml` is invalid.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let manifest_dir = resolve_manifest_dir(dir)?;
        let systems = systems::load(&manifest_dir)
            .with_context(|| format!("loading {}", systems::FILE_NAME))?;
        Ok(Self {
            manifest_dir,
            systems,
        })
    }
}

/// Resolve the manifest directory from CLI arguments or auto-detection.
///
/// Order: `--dir`, `$BREWFILES_DIR`, a `manifests/` directory in the
/// repository the binary was built in, then `./manifests`.
///
/// # Errors
///
/// Returns an error if no candidate directory exists.
pub fn resolve_manifest_dir(dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = dir {
        return Ok(dir.to_path_buf());
    }

    if let Ok(dir) = std::env::var(DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidates = [
            parent.join("../../").join(MANIFEST_DIR_NAME), // target/release/ → repo root
            parent.join("../").join(MANIFEST_DIR_NAME),    // bin/ → repo root
        ];
        for candidate in &candidates {
            if candidate.is_dir() {
                return Ok(dunce::canonicalize(candidate)?);
            }
        }
    }

    let cwd = std::env::current_dir()?.join(MANIFEST_DIR_NAME);
    if cwd.is_dir() {
        return Ok(cwd);
    }

    anyhow::bail!("cannot determine manifest directory. Use --dir or set {DIR_ENV}");
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let dir = resolve_manifest_dir(Some(Path::new("/explicit/manifests"))).unwrap();
        assert_eq!(dir, PathBuf::from("/explicit/manifests"));
    }

    #[test]
    fn settings_load_applies_systems_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(systems::FILE_NAME),
            "[base]\nmanifests = [\"core\"]\n",
        )
        .unwrap();
        let settings = Settings::load(Some(dir.path())).unwrap();
        assert_eq!(settings.manifest_dir, dir.path());
        assert_eq!(
            settings.systems.manifests(crate::manifest::SystemType::Base),
            ["core"]
        );
    }

    #[test]
    fn settings_load_reports_bad_systems_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(systems::FILE_NAME), "[nope]\nmanifests=[]\n").unwrap();
        let err = Settings::load(Some(dir.path())).unwrap_err();
        assert!(format!("{err:#}").contains("loading systems.toml"));
    }
}
