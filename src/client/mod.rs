//! Package manager client.
//!
//! The engine never runs the package manager directly; it goes through
//! [`PackageManagerClient`]. [`BowerClient`] is the implementation that
//! shells out to the `bower` executable.

mod bower;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::package::{ListingNode, PackageInfo};

pub use bower::BowerClient;

/// A package to install, as `name` or `name#range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub name: String,
    pub range: Option<String>,
    pub dev: bool,
}

impl InstallRequest {
    pub fn new(name: impl Into<String>, range: Option<String>, dev: bool) -> Self {
        InstallRequest {
            name: name.into(),
            range,
            dev,
        }
    }

    /// Parse `name` or `name#range`. An empty range counts as none.
    pub fn parse(spec: &str, dev: bool) -> Self {
        match spec.split_once('#') {
            Some((name, range)) if !range.is_empty() => {
                Self::new(name, Some(range.to_string()), dev)
            }
            Some((name, _)) => Self::new(name, None, dev),
            None => Self::new(spec, None, dev),
        }
    }
}

impl fmt::Display for InstallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.range {
            Some(range) => write!(f, "{}#{}", self.name, range),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Operations the engine needs from the package manager.
///
/// Every call runs in `cwd`, the project's working directory. Failures are
/// reported as [`EngineError::ExternalTool`](crate::error::EngineError::ExternalTool)
/// or, for unparsable listings, [`EngineError::MalformedListing`](crate::error::EngineError::MalformedListing).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageManagerClient: Send + Sync {
    /// Recursive listing of the project. Latest-version data is only
    /// fetched when `include_latest` is set.
    async fn list(&self, cwd: &Path, include_latest: bool) -> Result<ListingNode>;

    /// Install everything the manifest declares.
    async fn install_declared(&self, cwd: &Path) -> Result<()>;

    /// Remove every installed package the manifest does not need.
    async fn prune(&self, cwd: &Path) -> Result<()>;

    /// Install specific packages. Returns the installed nodes keyed by name.
    async fn install(
        &self,
        cwd: &Path,
        requests: &[InstallRequest],
    ) -> Result<BTreeMap<String, ListingNode>>;

    /// Uninstall packages. Returns the names actually removed.
    async fn uninstall(&self, cwd: &Path, names: &[String]) -> Result<Vec<String>>;

    async fn update(&self, cwd: &Path, name: &str) -> Result<()>;

    async fn info(&self, cwd: &Path, name: &str) -> Result<PackageInfo>;
}
