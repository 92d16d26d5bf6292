//! Reconciliation between installed packages and the manifest.
//!
//! # Structure
//!
//! - `status` - [`StatusReport`] and [`SyncStatus`]
//! - `engine` - [`SyncEngine`], the two synchronization directions

mod engine;
mod status;

pub use engine::SyncEngine;
pub use status::{StatusReport, SyncStatus};
