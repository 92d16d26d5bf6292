use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{Notifier, ProjectEvent};
use crate::config::ProjectConfig;
use crate::manifest::ManifestSnapshot;
use crate::package::Package;

/// Directory names that never become the active directory.
const EXCLUDED_DIRS: [&str; 2] = ["node_modules", "bower_components"];

/// Packages and scope of one open project.
///
/// Every mutation emits the matching [`ProjectEvent`].
#[derive(Debug)]
pub struct ProjectState {
    name: String,
    root: PathBuf,
    active_dir: Option<PathBuf>,
    short_active_dir: String,
    config: Option<ProjectConfig>,
    manifest: Option<ManifestSnapshot>,
    packages: BTreeMap<String, Package>,
    notifier: Notifier,
}

impl ProjectState {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, notifier: Notifier) -> Self {
        ProjectState {
            name: name.into(),
            root: root.into(),
            active_dir: None,
            short_active_dir: String::new(),
            config: None,
            manifest: None,
            packages: BTreeMap::new(),
            notifier,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn active_dir(&self) -> Option<&Path> {
        self.active_dir.as_deref()
    }

    /// Active directory relative to the root; empty at the root itself.
    pub fn short_active_dir(&self) -> &str {
        &self.short_active_dir
    }

    /// The active directory, or the root when none is set.
    pub fn active_path(&self) -> &Path {
        self.active_dir.as_deref().unwrap_or(&self.root)
    }

    /// Whether `path` can become the active directory.
    pub fn is_eligible_dir(path: &Path) -> bool {
        !path.components().any(|c| {
            EXCLUDED_DIRS
                .iter()
                .any(|excluded| c.as_os_str() == *excluded)
        })
    }

    /// Move the scope to `path`. Returns false, changing nothing, when the
    /// path is inside an excluded directory.
    pub fn set_active_dir(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if !Self::is_eligible_dir(&path) {
            debug!("Ignoring excluded directory {:?}", path);
            return false;
        }

        self.short_active_dir = if path == self.root {
            String::new()
        } else {
            path.strip_prefix(&self.root)
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|_| path.to_string_lossy().into_owned())
        };
        self.active_dir = Some(path.clone());

        self.notifier.notify(ProjectEvent::ActiveDirChanged {
            path,
            short_path: self.short_active_dir.clone(),
        });
        true
    }

    pub fn config(&self) -> Option<&ProjectConfig> {
        self.config.as_ref()
    }

    pub fn set_config(&mut self, config: Option<ProjectConfig>) {
        self.config = config;
    }

    /// Directory the package manager runs in.
    pub fn working_dir(&self) -> PathBuf {
        match &self.config {
            Some(config) => config.working_dir(self.active_path()),
            None => self.active_path().to_path_buf(),
        }
    }

    pub fn manifest(&self) -> Option<&ManifestSnapshot> {
        self.manifest.as_ref()
    }

    pub fn set_manifest(&mut self, manifest: Option<ManifestSnapshot>) {
        self.manifest = manifest;
    }

    /// Replace the manifest snapshot and emit `ManifestReloaded`.
    pub fn reload_manifest(&mut self, manifest: Option<ManifestSnapshot>) {
        self.manifest = manifest;
        self.notifier.notify(ProjectEvent::ManifestReloaded);
    }

    // Mutations

    /// Replace the whole collection. Every package is reported as installed.
    pub fn set_packages(&mut self, packages: Vec<Package>) {
        self.packages.clear();
        self.add_packages(packages);
    }

    /// Merge `packages`, returning `(installed, updated)`.
    pub fn add_packages(&mut self, packages: Vec<Package>) -> (Vec<Package>, Vec<Package>) {
        let mut installed = Vec::new();
        let mut updated = Vec::new();

        for pkg in packages {
            if self.packages.contains_key(pkg.name()) {
                updated.push(pkg.clone());
            } else {
                installed.push(pkg.clone());
            }
            self.packages.insert(pkg.name().to_string(), pkg);
        }

        self.notifier.notify(ProjectEvent::DependenciesAdded {
            installed: installed.clone(),
            updated: updated.clone(),
        });
        (installed, updated)
    }

    /// Remove by name. Unknown names are ignored; returns what was removed.
    pub fn remove_packages<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<Package> {
        let removed: Vec<Package> = names
            .iter()
            .filter_map(|name| self.packages.remove(name.as_ref()))
            .collect();

        self.notifier.notify(ProjectEvent::DependenciesRemoved {
            removed: removed.clone(),
        });
        removed
    }

    pub fn update_package(&mut self, pkg: Package) {
        self.packages.insert(pkg.name().to_string(), pkg.clone());
        self.notifier.notify(ProjectEvent::DependencyUpdated(pkg));
    }

    /// Replace the collection only when `packages` differs from it: a
    /// different count, an unknown name, or an entity that is not
    /// [`Package::is_equal_to`] the current one. Returns whether it replaced.
    pub fn replace_if_changed(&mut self, packages: Vec<Package>) -> bool {
        let changed = packages.len() != self.packages.len()
            || packages.iter().any(|pkg| {
                self.packages
                    .get(pkg.name())
                    .is_none_or(|current| !current.is_equal_to(pkg))
            });

        if changed {
            self.set_packages(packages);
        } else {
            debug!("Package collection unchanged");
        }
        changed
    }

    // Queries

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn has_packages(&self) -> bool {
        !self.packages.is_empty()
    }

    /// Present and installed. A declared-only entry does not count.
    pub fn has_package(&self, name: &str) -> bool {
        self.packages.get(name).is_some_and(Package::is_installed)
    }

    pub fn has_uninstalled_packages(&self) -> bool {
        self.packages.values().any(Package::is_missing)
    }

    pub fn uninstalled_packages(&self) -> Vec<&Package> {
        self.packages.values().filter(|p| p.is_missing()).collect()
    }

    pub fn has_extra_packages(&self) -> bool {
        self.packages.values().any(Package::is_not_tracked)
    }

    pub fn extraneous_packages(&self) -> Vec<&Package> {
        self.packages.values().filter(|p| p.is_extraneous()).collect()
    }
}
