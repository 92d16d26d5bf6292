use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{ConfigStore, ProjectConfig};
use crate::error::{EngineError, Result};
use crate::runtime::Runtime;

pub const BOWERRC: &str = ".bowerrc";

/// Reads `.bowerrc` from the project directory, falling back to the one in
/// the user's home directory.
pub struct BowerRcStore<R: Runtime> {
    runtime: Arc<R>,
}

impl<R: Runtime> BowerRcStore<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self { runtime }
    }

    fn candidates(&self, dir: &Path) -> Vec<PathBuf> {
        let mut paths = vec![dir.join(BOWERRC)];
        if let Some(home) = self.runtime.home_dir() {
            paths.push(home.join(BOWERRC));
        }
        paths
    }
}

impl<R: Runtime> ConfigStore for BowerRcStore<R> {
    #[tracing::instrument(skip(self))]
    fn load(&self, dir: &Path) -> Result<Option<ProjectConfig>> {
        let Some(path) = self
            .candidates(dir)
            .into_iter()
            .find(|p| self.runtime.exists(p))
        else {
            debug!("No {} found for {:?}", BOWERRC, dir);
            return Ok(None);
        };

        let content = self.runtime.read_to_string(&path).map_err(|e| EngineError::Config {
            path: path.clone(),
            message: format!("{:#}", e),
        })?;
        let config = serde_json::from_str(&content).map_err(|e| EngineError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;

        debug!("Loaded {:?}", path);
        Ok(Some(config))
    }
}
