//! Set difference between declared and installed entries.
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::logging::Log;
use crate::manifest::merger::SourcedEntry;
use crate::manifest::{Entry, EntryKey};

/// What it takes to converge installed state onto the declared state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Declared entries that are not installed.
    pub to_install: BTreeMap<EntryKey, Entry>,
    /// Installed entries no manifest in scope declares. Taps still needed
    /// by a declared tap-qualified formula or cask are never listed.
    pub to_remove: BTreeMap<EntryKey, Entry>,
}

impl Plan {
    /// Diff `declared` against `installed`.
    ///
    /// When one key is declared more than once with different metadata the
    /// later declaration wins and a warning names both sources.
    #[must_use]
    pub fn compute(declared: &[SourcedEntry], installed: &[Entry], log: &dyn Log) -> Self {
        let mut wanted: BTreeMap<EntryKey, &SourcedEntry> = BTreeMap::new();
        for sourced in declared {
            let key = sourced.entry.key();
            if let Some(earlier) = wanted.insert(key.clone(), sourced)
                && earlier.entry.metadata != sourced.entry.metadata
            {
                log.warn(&format!(
                    "conflicting declarations for {key}: '{}' in {} overridden by '{}' in {}",
                    earlier.entry,
                    file_name(&earlier.source),
                    sourced.entry,
                    file_name(&sourced.source),
                ));
            }
        }

        let implied_taps: BTreeSet<EntryKey> = declared
            .iter()
            .filter_map(|sourced| sourced.entry.required_tap())
            .collect();

        let present: BTreeMap<EntryKey, &Entry> =
            installed.iter().map(|e| (e.key(), e)).collect();

        let to_install = wanted
            .iter()
            .filter(|(key, _)| !present.contains_key(*key))
            .map(|(key, sourced)| (key.clone(), sourced.entry.clone()))
            .collect();
        let to_remove = present
            .iter()
            .filter(|(key, _)| !wanted.contains_key(*key) && !implied_taps.contains(*key))
            .map(|(key, entry)| (key.clone(), (*entry).clone()))
            .collect();

        Self {
            to_install,
            to_remove,
        }
    }

    /// Whether installed state already matches the declared state.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.to_install.is_empty() && self.to_remove.is_empty()
    }

    /// Entries to install, ordered by kind then name.
    #[must_use]
    pub fn install_entries(&self) -> Vec<Entry> {
        self.to_install.values().cloned().collect()
    }

    /// Entries to remove, ordered by kind then name.
    #[must_use]
    pub fn remove_entries(&self) -> Vec<Entry> {
        self.to_remove.values().cloned().collect()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string())
}
