use log::debug;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::package::Package;

/// Notifications emitted to the host.
#[derive(Debug, Clone)]
pub enum ProjectEvent {
    ProjectLoading,
    ProjectReady,
    /// Newly installed packages and packages that replaced an existing entry.
    DependenciesAdded {
        installed: Vec<Package>,
        updated: Vec<Package>,
    },
    /// Only the packages that were actually present.
    DependenciesRemoved { removed: Vec<Package> },
    DependencyUpdated(Package),
    ManifestReloaded,
    /// `short_path` is empty when the active directory is the project root.
    ActiveDirChanged { path: PathBuf, short_path: String },
}

/// Fire-and-forget event sink.
///
/// A notifier without a receiver, or whose receiver was dropped, discards
/// events.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<UnboundedSender<ProjectEvent>>,
}

impl Notifier {
    pub fn new(sender: UnboundedSender<ProjectEvent>) -> Self {
        Notifier {
            sender: Some(sender),
        }
    }

    /// A notifier paired with its receiving end.
    pub fn channel() -> (Self, UnboundedReceiver<ProjectEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// A notifier that drops every event.
    pub fn disabled() -> Self {
        Notifier::default()
    }

    pub fn notify(&self, event: ProjectEvent) {
        if let Some(sender) = &self.sender
            && sender.send(event).is_err()
        {
            debug!("Event receiver dropped, discarding notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_reach_receiver() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.notify(ProjectEvent::ProjectLoading);
        notifier.notify(ProjectEvent::ProjectReady);

        assert!(matches!(rx.try_recv(), Ok(ProjectEvent::ProjectLoading)));
        assert!(matches!(rx.try_recv(), Ok(ProjectEvent::ProjectReady)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.notify(ProjectEvent::ManifestReloaded);
    }

    #[test]
    fn test_disabled_notifier() {
        Notifier::disabled().notify(ProjectEvent::ProjectReady);
    }
}
