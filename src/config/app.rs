use anyhow::{Context, Result, bail};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use super::BowerRcStore;
use crate::client::BowerClient;
use crate::manifest::BowerJsonStore;
use crate::project::{Collaborators, NullWatcher};
use crate::runtime::Runtime;

pub const DEFAULT_BOWER: &str = "bower";

/// Application configuration assembled from the command line.
pub struct Config<R: Runtime> {
    pub runtime: Arc<R>,
    /// Project root. Defaults to the current directory.
    pub root: PathBuf,
    /// Package manager executable.
    pub bower: String,
}

impl<R: Runtime + 'static> Config<R> {
    pub fn new(runtime: R, root: Option<PathBuf>, bower: Option<String>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => runtime
                .current_dir()
                .context("Failed to determine the project root")?,
        };
        if !runtime.is_dir(&root) {
            bail!("Project root {} is not a directory", root.display());
        }
        let bower = bower
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BOWER.to_string());
        debug!("Project root {:?}, package manager '{}'", root, bower);

        Ok(Self {
            runtime: Arc::new(runtime),
            root,
            bower,
        })
    }

    /// File- and process-backed collaborators sharing this runtime.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            client: Arc::new(BowerClient::new(self.runtime.clone(), self.bower.clone())),
            manifest: Arc::new(BowerJsonStore::new(self.runtime.clone())),
            config: Arc::new(BowerRcStore::new(self.runtime.clone())),
            watcher: Arc::new(NullWatcher),
        }
    }
}
