//! Project lifecycle and the reconciliation pipeline.
//!
//! A [`ProjectManager`] owns at most one [`ProjectState`]. Opening a
//! project, or moving its active directory, runs the pipeline:
//!
//! 1. load the project configuration (`.bowerrc`)
//! 2. load the manifest and emit `ManifestReloaded`
//! 3. list installed packages offline, build the graph and `set_packages`
//! 4. check for updates (failures are logged and ignored)
//! 5. re-arm the watcher and emit `ProjectReady`
//!
//! Configuration and manifest failures degrade to "none"; a listing failure
//! is returned after step 5 has run.
//!
//! The state lock is never held across a collaborator call, so overlapping
//! refreshes are allowed and the last `set_packages` wins.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Notifier, ProjectEvent, ProjectState, ProjectWatcher};
use crate::client::{InstallRequest, PackageManagerClient};
use crate::config::ConfigStore;
use crate::error::{EngineError, Result};
use crate::manifest::{ManifestChanges, ManifestStore, pinned_range};
use crate::package::{DependencyType, Package, PackageFactory, PackageInfo, PackageMetadata};

/// External collaborators of the engine.
#[derive(Clone)]
pub struct Collaborators {
    pub client: Arc<dyn PackageManagerClient>,
    pub manifest: Arc<dyn ManifestStore>,
    pub config: Arc<dyn ConfigStore>,
    pub watcher: Arc<dyn ProjectWatcher>,
}

pub struct ProjectManager {
    collaborators: Collaborators,
    notifier: Notifier,
    check_updates: bool,
    state: RwLock<Option<ProjectState>>,
}

impl ProjectManager {
    pub fn new(collaborators: Collaborators, notifier: Notifier) -> Self {
        Self {
            collaborators,
            notifier,
            check_updates: true,
            state: RwLock::new(None),
        }
    }

    /// Enable or disable the latest-version lookup of the pipeline.
    pub fn with_update_check(mut self, enabled: bool) -> Self {
        self.check_updates = enabled;
        self
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Run `f` against the open project.
    pub async fn with_state<T>(&self, f: impl FnOnce(&ProjectState) -> T) -> Result<T> {
        let guard = self.state.read().await;
        guard.as_ref().map(f).ok_or(EngineError::NoActiveProject)
    }

    async fn update_state<T>(&self, f: impl FnOnce(&mut ProjectState) -> T) -> Result<T> {
        let mut guard = self.state.write().await;
        guard.as_mut().map(f).ok_or(EngineError::NoActiveProject)
    }

    pub async fn is_open(&self) -> bool {
        self.state.read().await.is_some()
    }

    // Lifecycle

    /// Replace the current project with the one at `root` and reconcile it.
    #[tracing::instrument(skip(self, root))]
    pub async fn open_project(&self, root: impl Into<PathBuf>) -> Result<()> {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());

        info!("Opening project '{}' at {:?}", name, root);
        *self.state.write().await = Some(ProjectState::new(name, root, self.notifier.clone()));
        self.reconcile().await
    }

    pub async fn close_project(&self) {
        self.collaborators.watcher.unwatch();
        if let Some(state) = self.state.write().await.take() {
            info!("Closed project '{}'", state.name());
        }
    }

    /// Scope the project to `path` and reconcile. Returns false when the
    /// path is excluded and nothing changed.
    #[tracing::instrument(skip(self, path))]
    pub async fn set_active_dir(&self, path: impl Into<PathBuf>) -> Result<bool> {
        let path = path.into();
        let changed = self.update_state(|s| s.set_active_dir(path)).await?;
        if changed {
            self.reconcile().await?;
        }
        Ok(changed)
    }

    /// Follow a rename of the active directory.
    pub async fn on_path_renamed(&self, old: &Path, new: &Path) -> Result<()> {
        let active = self
            .with_state(|s| s.active_dir().map(Path::to_path_buf))
            .await?;
        if active.as_deref() == Some(old) {
            self.set_active_dir(new).await?;
        }
        Ok(())
    }

    /// Fall back to the root when the active directory is deleted.
    pub async fn on_path_deleted(&self, path: &Path) -> Result<()> {
        let (active, root) = self
            .with_state(|s| (s.active_dir().map(Path::to_path_buf), s.root().to_path_buf()))
            .await?;
        if active.as_deref() == Some(path) {
            self.set_active_dir(root).await?;
        }
        Ok(())
    }

    // Pipeline

    /// Run the full reconciliation pipeline for the open project.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<()> {
        let active = self.with_state(|s| s.active_path().to_path_buf()).await?;
        self.notifier.notify(ProjectEvent::ProjectLoading);

        self.load_config(&active).await?;
        self.load_manifest().await?;

        let listed = self.refresh_packages().await;
        match &listed {
            Ok(()) if self.check_updates => {
                if let Err(e) = self.check_for_updates().await {
                    warn!("Failed to check for updates: {}", e);
                }
            }
            Ok(()) => {}
            Err(e) => warn!("Failed to list project dependencies: {}", e),
        }

        self.collaborators.watcher.watch(&active);
        self.notifier.notify(ProjectEvent::ProjectReady);
        listed
    }

    async fn load_config(&self, active: &Path) -> Result<()> {
        let config = match self.collaborators.config.load(active) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring project configuration: {}", e);
                None
            }
        };
        self.update_state(|s| s.set_config(config)).await
    }

    async fn load_manifest(&self) -> Result<()> {
        let dir = self.working_dir().await?;
        let manifest = match self.collaborators.manifest.read(&dir) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("Continuing without manifest: {}", e);
                None
            }
        };
        if manifest.is_none() {
            debug!("No manifest for {:?}", dir);
        }
        self.update_state(|s| s.reload_manifest(manifest)).await
    }

    /// Directory the package manager and the manifest live in.
    pub async fn working_dir(&self) -> Result<PathBuf> {
        self.with_state(|s| s.working_dir()).await
    }

    /// List installed packages offline and replace the collection.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_packages(&self) -> Result<()> {
        let packages = self.list_packages(false).await?;
        self.update_state(|s| s.set_packages(packages)).await
    }

    /// List with latest-version information and replace the collection.
    #[tracing::instrument(skip(self))]
    pub async fn check_for_updates(&self) -> Result<()> {
        let packages = self.list_packages(true).await?;
        self.update_state(|s| s.set_packages(packages)).await
    }

    async fn list_packages(&self, include_latest: bool) -> Result<Vec<Package>> {
        let (dir, manifest) = self
            .with_state(|s| (s.working_dir(), s.manifest().cloned()))
            .await?;
        let root = self.collaborators.client.list(&dir, include_latest).await?;
        let graph = PackageFactory::build(&root, manifest.as_ref())?;
        Ok(graph.into_packages())
    }

    // Manifest lifecycle

    /// Re-read the manifest, rebuild the graph and replace the collection
    /// only if it changed. Returns whether it changed.
    #[tracing::instrument(skip(self))]
    pub async fn notify_manifest_changed(&self) -> Result<bool> {
        let dir = self.working_dir().await?;
        let manifest = self.collaborators.manifest.read(&dir)?;
        self.update_state(|s| s.reload_manifest(manifest)).await?;

        let packages = self.list_packages(false).await?;
        self.update_state(|s| s.replace_if_changed(packages)).await
    }

    pub async fn on_manifest_created(&self) -> Result<bool> {
        self.notify_manifest_changed().await
    }

    pub async fn on_manifest_changed(&self) -> Result<bool> {
        self.notify_manifest_changed().await
    }

    pub async fn on_manifest_deleted(&self) -> Result<bool> {
        self.notify_manifest_changed().await
    }

    /// Write a manifest declaring every installed direct package.
    #[tracing::instrument(skip(self))]
    pub async fn create_manifest(&self) -> Result<()> {
        let (dir, name, packages) = self
            .with_state(|s| {
                (
                    s.working_dir(),
                    s.name().to_string(),
                    s.packages().cloned().collect::<Vec<_>>(),
                )
            })
            .await?;
        self.collaborators.manifest.create(&dir, &name, &packages)?;
        self.notify_manifest_changed().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_manifest(&self) -> Result<()> {
        let dir = self.working_dir().await?;
        self.collaborators.manifest.delete(&dir)?;
        self.notify_manifest_changed().await?;
        Ok(())
    }

    // Per-package operations

    /// Install `requests`, merge the result and declare the requested
    /// packages in the manifest when one exists. Returns `(installed, updated)`.
    #[tracing::instrument(skip(self, requests))]
    pub async fn install_packages(
        &self,
        requests: &[InstallRequest],
    ) -> Result<(Vec<Package>, Vec<Package>)> {
        let (dir, manifest) = self
            .with_state(|s| (s.working_dir(), s.manifest().cloned()))
            .await?;
        let nodes = self.collaborators.client.install(&dir, requests).await?;

        let mut metadata: Vec<PackageMetadata> = requests
            .iter()
            .map(|r| {
                let kind = if r.dev {
                    DependencyType::Development
                } else {
                    DependencyType::Production
                };
                PackageMetadata::new(&r.name, kind)
            })
            .collect();
        if let Some(manifest) = &manifest {
            for name in nodes.keys() {
                if metadata.iter().any(|m| &m.name == name) {
                    continue;
                }
                if let Some((kind, _)) = manifest.lookup(name) {
                    metadata.push(PackageMetadata::new(name, kind));
                }
            }
        }

        let packages = PackageFactory::build_flat(&nodes, &metadata)?.into_packages();

        if manifest.is_some() {
            let mut changes = ManifestChanges::default();
            for request in requests {
                if let Some(pkg) = packages.iter().find(|p| p.name() == request.name) {
                    let range = request.range.clone().unwrap_or_else(|| pinned_range(pkg));
                    changes.add(&request.name, range, request.dev);
                }
            }
            if !changes.is_empty() {
                self.collaborators.manifest.write(&dir, &changes)?;
                let reloaded = self.collaborators.manifest.read(&dir)?;
                self.update_state(|s| s.set_manifest(reloaded)).await?;
            }
        }

        self.update_state(|s| s.add_packages(packages)).await
    }

    /// Uninstall `names`, drop them from the collection and the manifest.
    /// Returns the packages removed from the collection.
    #[tracing::instrument(skip(self))]
    pub async fn uninstall_packages(&self, names: &[String]) -> Result<Vec<Package>> {
        let (dir, manifest) = self
            .with_state(|s| (s.working_dir(), s.manifest().cloned()))
            .await?;
        let removed = self.collaborators.client.uninstall(&dir, names).await?;

        if let Some(manifest) = &manifest {
            let mut changes = ManifestChanges::default();
            for name in names.iter().filter(|n| manifest.contains(n)) {
                changes.remove(name.as_str());
            }
            if !changes.is_empty() {
                self.collaborators.manifest.write(&dir, &changes)?;
                let reloaded = self.collaborators.manifest.read(&dir)?;
                self.update_state(|s| s.set_manifest(reloaded)).await?;
            }
        }

        self.update_state(|s| s.remove_packages(&removed)).await
    }

    /// Update one installed package and replace its entity.
    #[tracing::instrument(skip(self))]
    pub async fn update_package(&self, name: &str) -> Result<Package> {
        let (dir, previous_latest) = self
            .with_state(|s| {
                (
                    s.working_dir(),
                    s.package(name)
                        .filter(|p| p.is_installed())
                        .map(|p| p.latest_version().map(String::from)),
                )
            })
            .await?;
        let Some(previous_latest) = previous_latest else {
            return Err(EngineError::external(
                "update",
                format!("'{}' is not installed", name),
            ));
        };

        self.collaborators.client.update(&dir, name).await?;

        let mut pkg = self
            .list_packages(false)
            .await?
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| {
                EngineError::external("update", format!("'{}' disappeared after update", name))
            })?;
        // The offline listing has no latest version, keep the one already known.
        if pkg.latest_version().is_none() {
            pkg.set_latest_version(previous_latest);
        }
        self.update_state(|s| s.update_package(pkg.clone())).await?;
        Ok(pkg)
    }

    pub async fn info(&self, name: &str) -> Result<PackageInfo> {
        let dir = self.working_dir().await?;
        self.collaborators.client.info(&dir, name).await
    }

    // Queries

    pub async fn packages(&self) -> Result<Vec<Package>> {
        self.with_state(|s| s.packages().cloned().collect()).await
    }

    pub async fn uninstalled_packages(&self) -> Result<Vec<Package>> {
        self.with_state(|s| s.uninstalled_packages().into_iter().cloned().collect())
            .await
    }

    pub async fn extraneous_packages(&self) -> Result<Vec<Package>> {
        self.with_state(|s| s.extraneous_packages().into_iter().cloned().collect())
            .await
    }
}
