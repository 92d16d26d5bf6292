//! Configuration.
//!
//! - [`ProjectConfig`] is the project's `.bowerrc`, read through a
//!   [`ConfigStore`]. The engine consumes it and never writes it.
//! - [`Config`] is the application configuration assembled by the CLI.

mod app;
mod bowerrc;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use app::Config;
pub use bowerrc::{BOWERRC, BowerRcStore};

/// Settings read from `.bowerrc`.
///
/// Only `cwd` is consumed here. Other keys such as `directory` are left to
/// bower, which reads the same file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectConfig {
    /// Working directory for the package manager, relative to the project root.
    #[serde(default)]
    pub cwd: Option<String>,
}

impl ProjectConfig {
    /// Directory the package manager runs in for a project rooted at `root`.
    pub fn working_dir(&self, root: &Path) -> PathBuf {
        match &self.cwd {
            Some(cwd) => root.join(cwd),
            None => root.to_path_buf(),
        }
    }
}

/// Read access to project configuration.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigStore: Send + Sync {
    /// `None` when no configuration file applies to `dir`.
    fn load(&self, dir: &Path) -> Result<Option<ProjectConfig>>;
}
