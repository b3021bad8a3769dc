//! Optional `systems.toml` overriding the built-in system presets.
//!
//! ```toml
//! [dev]
//! manifests = ["base", "dev", "work"]
//! ```
//!
//! Only the five recognized system types may appear; presets not listed
//! keep their built-in manifest lists.
use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::manifest::SystemType;
use crate::manifest::loader::SystemTable;

/// File name looked up inside the manifest directory.
pub const FILE_NAME: &str = "systems.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SystemDef {
    manifests: Vec<String>,
}

/// Load the system table for `manifest_dir`, applying `systems.toml` on top
/// of the built-in presets when the file exists.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or names
/// an unknown system type.
pub fn load(manifest_dir: &Path) -> Result<SystemTable, ConfigError> {
    let path = manifest_dir.join(FILE_NAME);
    if !path.exists() {
        return Ok(SystemTable::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&content, &path.display().to_string())
}

/// Parse `systems.toml` content. `file` is used in error messages.
///
/// # Errors
///
/// Returns an error if the content is not valid TOML or names an unknown
/// system type.
pub fn parse(content: &str, file: &str) -> Result<SystemTable, ConfigError> {
    let defs: BTreeMap<String, SystemDef> =
        toml::from_str(content).map_err(|e| ConfigError::InvalidSyntax {
            file: file.to_string(),
            message: e.message().to_string(),
        })?;

    let mut table = SystemTable::default();
    for (name, def) in defs {
        let system: SystemType = name.parse().map_err(|source| ConfigError::System {
            file: file.to_string(),
            source,
        })?;
        table.set(system, def.manifests);
    }
    Ok(table)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_builtin_presets() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load(dir.path()).unwrap(), SystemTable::default());
    }

    #[test]
    fn override_replaces_one_preset() {
        let table = parse("[dev]\nmanifests = [\"base\", \"dev\", \"work\"]\n", "t").unwrap();
        assert_eq!(table.manifests(SystemType::Dev), ["base", "dev", "work"]);
        assert_eq!(table.manifests(SystemType::Base), ["base"]);
    }

    #[test]
    fn unknown_system_type_is_rejected() {
        let err = parse("[gaming]\nmanifests = [\"steam\"]\n", "systems.toml").unwrap_err();
        assert!(matches!(err, ConfigError::System { .. }), "{err}");
        assert!(err.to_string().contains("gaming"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = parse("[dev\n", "systems.toml").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }), "{err}");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse("[dev]\nmanifest = [\"base\"]\n", "systems.toml").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }), "{err}");
    }

    #[test]
    fn load_reads_file_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(FILE_NAME),
            "[all]\nmanifests = [\"base\"]\n",
        )
        .unwrap();
        let table = load(dir.path()).unwrap();
        assert_eq!(table.manifests(SystemType::All), ["base"]);
    }
}
