use serde::Serialize;

use crate::package::Package;

/// Whether installed and declared state agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncStatus {
    InSync,
    OutOfSync,
}

impl SyncStatus {
    /// `0` in sync, `1` out of sync.
    pub fn code(self) -> i32 {
        match self {
            SyncStatus::InSync => 0,
            SyncStatus::OutOfSync => 1,
        }
    }
}

/// Result of a status check.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: SyncStatus,
    /// Declared but not installed.
    pub missing: Vec<Package>,
    /// Installed at the project level but not declared.
    pub untracked: Vec<Package>,
}

impl StatusReport {
    /// Partition `packages` in a single pass. A package is counted as
    /// untracked before it is considered missing.
    pub fn from_packages<'a>(packages: impl IntoIterator<Item = &'a Package>) -> Self {
        let mut missing = Vec::new();
        let mut untracked = Vec::new();

        for pkg in packages {
            if pkg.is_not_tracked() {
                untracked.push(pkg.clone());
            } else if pkg.is_missing() {
                missing.push(pkg.clone());
            }
        }

        let status = if missing.is_empty() && untracked.is_empty() {
            SyncStatus::InSync
        } else {
            SyncStatus::OutOfSync
        };

        StatusReport {
            status,
            missing,
            untracked,
        }
    }

    pub fn is_in_sync(&self) -> bool {
        self.status == SyncStatus::InSync
    }
}
