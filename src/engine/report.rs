//! Per-operation result value.
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::plan::Plan;
use crate::manifest::EntryKind;

/// What one engine operation planned and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// The plan the operation acted on (empty for backup).
    pub plan: Plan,
    /// Number of entries handed to the backend for installation.
    pub installed: usize,
    /// Number of entries removed.
    pub removed: usize,
    /// Backup file written, if any.
    pub backup: Option<PathBuf>,
    /// Per-kind entry counts captured by a backup.
    pub counts: BTreeMap<EntryKind, usize>,
    /// Whether the operation only previewed its changes.
    pub dry_run: bool,
}

impl Report {
    /// Whether the backend was asked to change anything.
    #[must_use]
    pub const fn mutated(&self) -> bool {
        self.installed > 0 || self.removed > 0 || self.backup.is_some()
    }

    /// Fold a later step of the same command into this report.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        let mut to_install = self.plan.to_install;
        to_install.extend(next.plan.to_install);
        let mut to_remove = self.plan.to_remove;
        to_remove.extend(next.plan.to_remove);
        Self {
            plan: Plan {
                to_install,
                to_remove,
            },
            installed: self.installed + next.installed,
            removed: self.removed + next.removed,
            backup: next.backup.or(self.backup),
            counts: if next.counts.is_empty() {
                self.counts
            } else {
                next.counts
            },
            dry_run: self.dry_run || next.dry_run,
        }
    }
}
