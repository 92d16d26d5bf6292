//! Raw listing payload as reported by `bower list --json`.
//!
//! The root node describes the project itself; its `dependencies` map holds
//! the top-level installed packages, each nesting its own direct
//! dependencies the same way.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{EngineError, Result};

/// Where a package was resolved from.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Endpoint {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Version range or tag requested for the package.
    #[serde(default)]
    pub target: Option<String>,
}

/// Package metadata read from the installed package's own `bower.json`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PkgMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

/// Latest-version information, present only for non-offline listings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UpdateInfo {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub latest: Option<String>,
}

/// One node of the listing tree.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingNode {
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
    #[serde(default)]
    pub canonical_dir: Option<String>,
    #[serde(default)]
    pub pkg_meta: Option<PkgMeta>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, ListingNode>,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub update: Option<UpdateInfo>,
}

impl ListingNode {
    /// Parse a listing from the package manager's JSON output.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| EngineError::MalformedListing(e.to_string()))
    }

    /// Package name: the endpoint name, falling back to the metadata name.
    ///
    /// Fails when the node carries neither.
    pub fn name(&self) -> Result<&str> {
        let from_endpoint = self
            .endpoint
            .as_ref()
            .map(|e| e.name.as_str())
            .filter(|n| !n.is_empty());
        let from_meta = self
            .pkg_meta
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .filter(|n| !n.is_empty());

        from_endpoint.or(from_meta).ok_or_else(|| {
            EngineError::MalformedListing(format!(
                "listing node without a name (dir: {})",
                self.canonical_dir.as_deref().unwrap_or("<unknown>")
            ))
        })
    }

    /// Present on disk with readable metadata.
    pub fn is_installed(&self) -> bool {
        !self.missing && self.pkg_meta.is_some()
    }

    pub fn version(&self) -> Option<&str> {
        self.pkg_meta.as_ref().and_then(|m| m.version.as_deref())
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.update.as_ref().and_then(|u| u.latest.as_deref())
    }

    /// Requested range, as recorded on the endpoint.
    pub fn target(&self) -> Option<&str> {
        self.endpoint.as_ref().and_then(|e| e.target.as_deref())
    }
}
