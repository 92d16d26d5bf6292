//! Package model and graph construction.
//!
//! # Structure
//!
//! - `entity` - [`Package`], one installed or declared package
//! - `listing` - Raw listing payload from the package manager
//! - `factory` - Builds a [`PackageGraph`] from a listing
//! - `info` - Registry information for a single package
//! - `version` - Version comparison

mod entity;
mod factory;
mod info;
mod listing;
mod version;

pub use entity::{DependencyType, Package, PackageStatus};
pub use factory::{PackageFactory, PackageGraph, PackageMetadata};
pub use info::PackageInfo;
pub use listing::{Endpoint, ListingNode, PkgMeta, UpdateInfo};
pub use version::VersionComparator;
