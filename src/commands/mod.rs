//! Command-line entry points.
//!
//! Each command opens the project at [`Config::root`] with a fresh
//! [`ProjectManager`], runs one operation and prints the outcome.
//!
//! # Structure
//!
//! - `list` - installed and declared packages
//! - `status` - status check and both synchronization directions
//! - `packages` - install, uninstall and update of named packages
//! - `info` - registry information for one package
//! - `init` - manifest creation

mod info;
mod init;
mod list;
mod packages;
mod status;

use anyhow::{Context, Result};
use log::debug;

use crate::config::Config;
use crate::project::{Notifier, ProjectManager};
use crate::runtime::Runtime;

pub use info::info;
pub use init::init;
pub use list::list;
pub use packages::{install, uninstall, update};
pub use status::{status, sync};

/// Open the configured project. The update check is only run when
/// `check_updates` is set, so offline commands never hit the registry.
async fn open<R: Runtime + 'static>(
    config: &Config<R>,
    check_updates: bool,
) -> Result<ProjectManager> {
    debug!("Opening {:?} (update check: {})", config.root, check_updates);
    let manager = ProjectManager::new(config.collaborators(), Notifier::disabled())
        .with_update_check(check_updates);
    manager
        .open_project(config.root.clone())
        .await
        .with_context(|| format!("Failed to load project at {}", config.root.display()))?;
    Ok(manager)
}
