use log::{debug, info};

use super::StatusReport;
use crate::error::{EngineError, Result};
use crate::manifest::{ManifestChanges, pinned_range};
use crate::project::ProjectManager;

/// Reconciles installed packages with the manifest, in one direction at a
/// time.
pub struct SyncEngine<'a> {
    manager: &'a ProjectManager,
}

impl<'a> SyncEngine<'a> {
    pub fn new(manager: &'a ProjectManager) -> Self {
        Self { manager }
    }

    /// Partition the current packages into missing and untracked.
    ///
    /// Fails with [`EngineError::NoManifest`] when the project has no manifest.
    pub async fn check_project_status(&self) -> Result<StatusReport> {
        self.manager
            .with_state(|s| {
                if s.manifest().is_none() {
                    return Err(EngineError::NoManifest);
                }
                Ok(StatusReport::from_packages(s.packages()))
            })
            .await?
    }

    /// Bring the install directory in line with the manifest: prune, then
    /// install declared packages if any are missing. Returns the status
    /// after refreshing.
    ///
    /// A prune failure aborts before installing. An install failure leaves
    /// the prune in place.
    #[tracing::instrument(skip(self))]
    pub async fn synchronize_with_manifest(&self) -> Result<StatusReport> {
        let status = self.check_project_status().await?;
        let dir = self.manager.working_dir().await?;
        let client = &self.manager.collaborators().client;

        client.prune(&dir).await?;
        if !status.missing.is_empty() {
            info!("Installing {} missing package(s)", status.missing.len());
            client.install_declared(&dir).await?;
        } else {
            debug!("Nothing missing, skipping install");
        }

        self.manager.refresh_packages().await?;
        self.check_project_status().await
    }

    /// Bring the manifest in line with the install directory: declare every
    /// untracked package as a production dependency pinned at its installed
    /// version, and drop every missing declaration. The install directory is
    /// not touched.
    #[tracing::instrument(skip(self))]
    pub async fn synchronize_with_project(&self) -> Result<StatusReport> {
        let status = self.check_project_status().await?;

        let mut changes = ManifestChanges::default();
        for pkg in &status.untracked {
            changes.add(pkg.name(), pinned_range(pkg), false);
        }
        for pkg in &status.missing {
            changes.remove(pkg.name());
        }

        if changes.is_empty() {
            debug!("Manifest already matches installed packages");
            return Ok(status);
        }

        let dir = self.manager.working_dir().await?;
        self.manager.collaborators().manifest.write(&dir, &changes)?;
        info!(
            "Declared {} and removed {} package(s) in manifest",
            status.untracked.len(),
            status.missing.len()
        );

        self.manager.notify_manifest_changed().await?;
        self.check_project_status().await
    }
}
