use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::VersionComparator;

/// Manifest partition a package is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Production,
    Development,
    /// Not declared in either partition.
    #[default]
    Untracked,
}

/// Derived status of a package against the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// Installed and declared, or installed as a transitive dependency.
    Installed,
    /// Declared in the manifest but not installed.
    Missing,
    /// Installed at the project level but not declared in the manifest.
    Extraneous,
    /// Neither installed nor declared.
    Unknown,
}

/// One installed or declared package.
///
/// Edges to other packages are stored by name; a `Package` never owns
/// another `Package`. The graph that produced it guarantees the edges are
/// symmetric.
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    name: String,
    version: Option<String>,
    latest_version: Option<String>,
    manifest_version: Option<String>,
    installed: bool,
    dependency_type: DependencyType,
    is_project_dependency: bool,
    dependencies: BTreeSet<String>,
    dependants: BTreeSet<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub source: Option<String>,
    pub install_dir: Option<PathBuf>,
}

impl Package {
    /// Create an uninstalled, untracked package. `name` must not be empty.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "package name must not be empty");
        Package {
            name,
            version: None,
            latest_version: None,
            manifest_version: None,
            installed: false,
            dependency_type: DependencyType::Untracked,
            is_project_dependency: false,
            dependencies: BTreeSet::new(),
            dependants: BTreeSet::new(),
            description: None,
            homepage: None,
            source: None,
            install_dir: None,
        }
    }

    /// Mark the package as present in the install directory at `version`.
    pub fn with_installed(mut self, version: Option<String>) -> Self {
        self.installed = true;
        self.version = version;
        self
    }

    pub fn with_latest_version(mut self, latest: Option<String>) -> Self {
        self.latest_version = latest;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.latest_version.as_deref()
    }

    /// Version range as declared in the manifest.
    pub fn manifest_version(&self) -> Option<&str> {
        self.manifest_version.as_deref()
    }

    pub fn dependency_type(&self) -> DependencyType {
        self.dependency_type
    }

    pub fn is_project_dependency(&self) -> bool {
        self.is_project_dependency
    }

    // Classification

    /// Place the package in a manifest partition, recording the declared range.
    pub fn set_dependency_type(&mut self, kind: DependencyType, manifest_version: Option<String>) {
        self.dependency_type = kind;
        self.manifest_version = match kind {
            DependencyType::Untracked => None,
            _ => manifest_version,
        };
    }

    pub fn mark_project_dependency(&mut self, direct: bool) {
        self.is_project_dependency = direct;
    }

    pub fn set_latest_version(&mut self, latest: Option<String>) {
        self.latest_version = latest;
    }

    // Edges

    pub fn add_dependency(&mut self, name: impl Into<String>) {
        self.dependencies.insert(name.into());
    }

    pub fn add_dependant(&mut self, name: impl Into<String>) {
        self.dependants.insert(name.into());
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(String::as_str)
    }

    pub fn dependants(&self) -> impl Iterator<Item = &str> {
        self.dependants.iter().map(String::as_str)
    }

    pub fn dependencies_count(&self) -> usize {
        self.dependencies.len()
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    pub fn has_dependants(&self) -> bool {
        !self.dependants.is_empty()
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains(name)
    }

    pub fn has_dependant(&self, name: &str) -> bool {
        self.dependants.contains(name)
    }

    // Derived status

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn is_production_dependency(&self) -> bool {
        self.dependency_type == DependencyType::Production
    }

    pub fn is_dev_dependency(&self) -> bool {
        self.dependency_type == DependencyType::Development
    }

    pub fn is_tracked(&self) -> bool {
        self.dependency_type != DependencyType::Untracked
    }

    /// Declared in the manifest but not installed.
    pub fn is_missing(&self) -> bool {
        !self.installed && self.is_tracked()
    }

    /// Installed at the project level without a manifest declaration.
    /// Transitive dependencies are never extraneous.
    pub fn is_not_tracked(&self) -> bool {
        self.installed && self.is_project_dependency && !self.is_tracked()
    }

    pub fn is_extraneous(&self) -> bool {
        self.is_not_tracked()
    }

    pub fn status(&self) -> PackageStatus {
        if self.is_missing() {
            PackageStatus::Missing
        } else if self.is_not_tracked() {
            PackageStatus::Extraneous
        } else if self.installed {
            PackageStatus::Installed
        } else {
            PackageStatus::Unknown
        }
    }

    /// Whether the latest known version is newer than the installed one.
    pub fn has_updates(&self) -> bool {
        match (&self.version, &self.latest_version) {
            (Some(current), Some(latest)) => VersionComparator::is_newer(latest, current),
            _ => false,
        }
    }

    /// Equality used to detect no-op updates: name, versions and every
    /// classification flag. Edges and the manifest range are not compared.
    pub fn is_equal_to(&self, other: &Package) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.latest_version == other.latest_version
            && self.installed == other.installed
            && self.dependency_type == other.dependency_type
            && self.is_project_dependency == other.is_project_dependency
    }
}
