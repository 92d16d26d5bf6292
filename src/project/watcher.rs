use log::debug;
use std::path::Path;

/// Filesystem watching for the active directory.
///
/// Implementations call back into the
/// [`ProjectManager`](super::ProjectManager) entry points on changes; the
/// engine only arms and disarms them.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectWatcher: Send + Sync {
    fn watch(&self, path: &Path);
    fn unwatch(&self);
}

/// Watcher for one-shot hosts such as the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWatcher;

impl ProjectWatcher for NullWatcher {
    fn watch(&self, path: &Path) {
        debug!("Watching disabled, ignoring {:?}", path);
    }

    fn unwatch(&self) {}
}
