//! Project state and its lifecycle.
//!
//! # Structure
//!
//! - `events` - [`ProjectEvent`] notifications and the [`Notifier`] sink
//! - `state` - [`ProjectState`], the package collection of one project
//! - `manager` - [`ProjectManager`], which owns the state and runs the
//!   reconciliation pipeline against the collaborators
//! - `watcher` - [`ProjectWatcher`] contract

mod events;
mod manager;
mod state;
mod watcher;

pub use events::{Notifier, ProjectEvent};
pub use manager::{Collaborators, ProjectManager};
pub use state::ProjectState;
pub use watcher::{NullWatcher, ProjectWatcher};

#[cfg(test)]
pub use watcher::MockProjectWatcher;
