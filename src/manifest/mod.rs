//! Manifest (`bower.json`) access.
//!
//! # Structure
//!
//! - [`ManifestSnapshot`] - point-in-time read of the declared dependencies
//! - [`ManifestChanges`] - additions and removals applied in one rewrite
//! - [`ManifestStore`] - collaborator contract used by the engine
//! - `bower_json` - [`BowerJsonStore`], the file-backed store

mod bower_json;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::Result;
use crate::package::{DependencyType, Package};

pub use bower_json::{BOWER_JSON, BowerJsonStore};

/// Declared dependencies, partitioned into production and development.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl ManifestSnapshot {
    pub fn new(
        dependencies: BTreeMap<String, String>,
        dev_dependencies: BTreeMap<String, String>,
    ) -> Self {
        ManifestSnapshot {
            name: None,
            dependencies,
            dev_dependencies,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    /// Partition and range for `name`. Production is checked first, so a
    /// name declared in both partitions resolves to production.
    pub fn lookup(&self, name: &str) -> Option<(DependencyType, &str)> {
        if let Some(range) = self.dependencies.get(name) {
            return Some((DependencyType::Production, range));
        }
        self.dev_dependencies
            .get(name)
            .map(|range| (DependencyType::Development, range.as_str()))
    }

    /// Every declaration, production entries first.
    pub fn declared(&self) -> impl Iterator<Item = (&str, DependencyType, &str)> {
        let prod = self
            .dependencies
            .iter()
            .map(|(n, r)| (n.as_str(), DependencyType::Production, r.as_str()));
        let dev = self
            .dev_dependencies
            .iter()
            .map(|(n, r)| (n.as_str(), DependencyType::Development, r.as_str()));
        prod.chain(dev)
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }
}

/// A batch of manifest edits, applied as one full rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestChanges {
    pub add_production: BTreeMap<String, String>,
    pub add_development: BTreeMap<String, String>,
    pub remove: BTreeSet<String>,
}

impl ManifestChanges {
    pub fn add(&mut self, name: impl Into<String>, range: impl Into<String>, dev: bool) {
        let name = name.into();
        self.remove.remove(&name);
        if dev {
            self.add_production.remove(&name);
            self.add_development.insert(name, range.into());
        } else {
            self.add_development.remove(&name);
            self.add_production.insert(name, range.into());
        }
    }

    pub fn remove(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.add_production.remove(&name);
        self.add_development.remove(&name);
        self.remove.insert(name);
    }

    pub fn is_empty(&self) -> bool {
        self.add_production.is_empty() && self.add_development.is_empty() && self.remove.is_empty()
    }
}

/// Range written for an installed package: `~<version>`, or `*` when the
/// version is unknown.
pub fn pinned_range(pkg: &Package) -> String {
    match pkg.version() {
        Some(version) if !version.is_empty() => format!("~{}", version),
        _ => "*".to_string(),
    }
}

/// Read and write access to a directory's manifest.
#[cfg_attr(test, mockall::automock)]
pub trait ManifestStore: Send + Sync {
    fn exists(&self, dir: &Path) -> bool;

    /// `None` when the directory has no manifest.
    fn read(&self, dir: &Path) -> Result<Option<ManifestSnapshot>>;

    /// Apply `changes` with a full rewrite of the dependency sections.
    fn write(&self, dir: &Path, changes: &ManifestChanges) -> Result<()>;

    /// Create a manifest named `name` declaring `packages`.
    fn create(&self, dir: &Path, name: &str, packages: &[Package]) -> Result<()>;

    fn delete(&self, dir: &Path) -> Result<()>;

    fn add_dependency(&self, dir: &Path, name: &str, range: &str, dev: bool) -> Result<()> {
        let mut changes = ManifestChanges::default();
        changes.add(name, range, dev);
        self.write(dir, &changes)
    }

    fn remove_dependency(&self, dir: &Path, name: &str) -> Result<()> {
        let mut changes = ManifestChanges::default();
        changes.remove(name);
        self.write(dir, &changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ManifestSnapshot {
        ManifestSnapshot::new(
            [("jquery".to_string(), "~2.1.3".to_string())].into(),
            [
                ("jquery".to_string(), "*".to_string()),
                ("mocha".to_string(), "~2.2.0".to_string()),
            ]
            .into(),
        )
    }

    #[test]
    fn test_lookup_prefers_production() {
        let manifest = snapshot();
        assert_eq!(
            manifest.lookup("jquery"),
            Some((DependencyType::Production, "~2.1.3"))
        );
        assert_eq!(
            manifest.lookup("mocha"),
            Some((DependencyType::Development, "~2.2.0"))
        );
        assert_eq!(manifest.lookup("lodash"), None);
    }

    #[test]
    fn test_declared_lists_production_first() {
        let manifest = snapshot();
        let declared: Vec<_> = manifest.declared().collect();
        assert_eq!(declared[0], ("jquery", DependencyType::Production, "~2.1.3"));
        assert_eq!(declared.len(), 3);
    }

    #[test]
    fn test_changes_last_edit_wins() {
        let mut changes = ManifestChanges::default();
        changes.add("jquery", "~2.1.3", false);
        changes.add("jquery", "~2.1.3", true);
        assert!(changes.add_production.is_empty());
        assert_eq!(changes.add_development.len(), 1);

        changes.remove("jquery");
        assert!(changes.add_development.is_empty());
        assert!(changes.remove.contains("jquery"));
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_pinned_range() {
        let pkg = Package::new("jquery").with_installed(Some("2.1.3".into()));
        assert_eq!(pinned_range(&pkg), "~2.1.3");

        let pkg = Package::new("jquery").with_installed(None);
        assert_eq!(pinned_range(&pkg), "*");
    }
}
