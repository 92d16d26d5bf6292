//! Graph construction from listing payloads.
//!
//! Two shapes are supported:
//!
//! - the recursive listing of the whole project, classified against a
//!   manifest snapshot ([`PackageFactory::build`]);
//! - a flat map of freshly installed packages with caller-supplied
//!   classification ([`PackageFactory::build_flat`]).
//!
//! Both produce a [`PackageGraph`], an arena keyed by package name where
//! edges are name sets on each entity.

use log::debug;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::PathBuf;

use super::{DependencyType, ListingNode, Package};
use crate::error::Result;
use crate::manifest::ManifestSnapshot;

/// Keyed collection of packages with symmetric edges.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    packages: BTreeMap<String, Package>,
}

impl PackageGraph {
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn into_packages(self) -> Vec<Package> {
        self.packages.into_values().collect()
    }

    /// Every dependency edge has a matching dependant edge and vice versa.
    pub fn is_symmetric(&self) -> bool {
        self.packages.values().all(|pkg| {
            pkg.dependencies().all(|dep| {
                self.packages
                    .get(dep)
                    .is_some_and(|d| d.has_dependant(pkg.name()))
            }) && pkg.dependants().all(|parent| {
                self.packages
                    .get(parent)
                    .is_some_and(|p| p.has_dependency(pkg.name()))
            })
        })
    }

    fn link(&mut self, parent: &str, child: &str) {
        if let Some(p) = self.packages.get_mut(parent) {
            p.add_dependency(child);
        }
        if let Some(c) = self.packages.get_mut(child) {
            c.add_dependant(parent);
        }
    }
}

impl FromIterator<Package> for PackageGraph {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        PackageGraph {
            packages: iter
                .into_iter()
                .map(|pkg| (pkg.name().to_string(), pkg))
                .collect(),
        }
    }
}

/// Caller-supplied classification for the flat build.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
    pub name: String,
    pub dependency_type: DependencyType,
}

impl PackageMetadata {
    pub fn new(name: impl Into<String>, dependency_type: DependencyType) -> Self {
        PackageMetadata {
            name: name.into(),
            dependency_type,
        }
    }
}

/// Builds package graphs. Stateless.
pub struct PackageFactory;

impl PackageFactory {
    /// Build the full graph from the project's recursive listing.
    ///
    /// `root` is the project node; its children are the top-level installed
    /// packages. With no manifest, every top-level package is treated as a
    /// declared production dependency.
    #[tracing::instrument(skip(root, manifest))]
    pub fn build(root: &ListingNode, manifest: Option<&ManifestSnapshot>) -> Result<PackageGraph> {
        let mut graph = PackageGraph::default();
        let mut top_level = Vec::with_capacity(root.dependencies.len());

        for node in root.dependencies.values() {
            let name = Self::visit(node, None, &mut graph)?;
            top_level.push(name);
        }

        match manifest {
            Some(manifest) => Self::classify(&mut graph, &top_level, manifest),
            None => Self::classify_without_manifest(&mut graph, &top_level, root),
        }

        debug!(
            "Built package graph with {} entities ({} top-level)",
            graph.len(),
            top_level.len()
        );
        Ok(graph)
    }

    /// Build standalone entities from a flat `name -> node` map.
    ///
    /// No edges are resolved. Packages found in `metadata` are direct
    /// dependencies of the declared type; the rest are untracked transitive
    /// packages.
    #[tracing::instrument(skip(nodes, metadata))]
    pub fn build_flat(
        nodes: &BTreeMap<String, ListingNode>,
        metadata: &[PackageMetadata],
    ) -> Result<PackageGraph> {
        let mut graph = PackageGraph::default();

        for node in nodes.values() {
            let mut pkg = Self::entity(node)?;
            match metadata.iter().find(|m| m.name == pkg.name()) {
                Some(meta) => {
                    pkg.set_dependency_type(meta.dependency_type, node.target().map(String::from));
                    pkg.mark_project_dependency(true);
                }
                None => pkg.mark_project_dependency(false),
            }
            graph.packages.insert(pkg.name().to_string(), pkg);
        }

        Ok(graph)
    }

    /// Materialize `node` once, attach the edge from `parent`, then descend.
    fn visit(node: &ListingNode, parent: Option<&str>, graph: &mut PackageGraph) -> Result<String> {
        let name = node.name()?.to_string();

        // A later occurrence may carry the installed metadata.
        let replace = match graph.packages.get(&name) {
            Some(existing) => !existing.is_installed() && node.is_installed(),
            None => true,
        };
        if replace {
            let mut pkg = Self::entity(node)?;
            if let Some(previous) = graph.packages.get(&name) {
                for parent in previous.dependants() {
                    pkg.add_dependant(parent);
                }
            }
            graph.packages.insert(name.clone(), pkg);
        }

        if let Some(parent) = parent {
            graph.link(parent, &name);
        }

        if node.is_installed() {
            for child in node.dependencies.values() {
                Self::visit(child, Some(&name), graph)?;
            }
        }

        Ok(name)
    }

    fn entity(node: &ListingNode) -> Result<Package> {
        let name = node.name()?;
        let mut pkg = Package::new(name);
        if node.is_installed() {
            pkg = pkg.with_installed(node.version().map(String::from));
        }
        pkg.set_latest_version(node.latest_version().map(String::from));

        if let Some(meta) = &node.pkg_meta {
            pkg.description = meta.description.clone();
            pkg.homepage = meta.homepage.clone();
        }
        pkg.source = node.endpoint.as_ref().and_then(|e| e.source.clone());
        pkg.install_dir = node.canonical_dir.as_ref().map(PathBuf::from);
        Ok(pkg)
    }

    fn classify(graph: &mut PackageGraph, top_level: &[String], manifest: &ManifestSnapshot) {
        let declared_top_level: Vec<&str> = top_level
            .iter()
            .map(String::as_str)
            .filter(|name| manifest.contains(name))
            .collect();
        let reachable = Self::reachable_from(graph, &declared_top_level);
        let top_level: BTreeSet<&str> = top_level.iter().map(String::as_str).collect();

        for pkg in graph.packages.values_mut() {
            match manifest.lookup(pkg.name()) {
                Some((kind, range)) => {
                    pkg.set_dependency_type(kind, Some(range.to_string()));
                    pkg.mark_project_dependency(true);
                }
                None => {
                    let extraneous =
                        top_level.contains(pkg.name()) && !reachable.contains(pkg.name());
                    pkg.set_dependency_type(DependencyType::Untracked, None);
                    pkg.mark_project_dependency(extraneous);
                }
            }
        }

        for (name, kind, range) in manifest.declared() {
            if graph.contains(name) {
                continue;
            }
            debug!("Declared package '{}' is not installed", name);
            let mut pkg = Package::new(name);
            pkg.set_dependency_type(kind, Some(range.to_string()));
            pkg.mark_project_dependency(true);
            graph.packages.insert(name.to_string(), pkg);
        }
    }

    fn classify_without_manifest(graph: &mut PackageGraph, top_level: &[String], root: &ListingNode) {
        for pkg in graph.packages.values_mut() {
            if top_level.iter().any(|n| n == pkg.name()) {
                let range = root
                    .dependencies
                    .values()
                    .find(|node| node.name().is_ok_and(|n| n == pkg.name()))
                    .and_then(|node| node.target())
                    .map(String::from);
                pkg.set_dependency_type(DependencyType::Production, range);
                pkg.mark_project_dependency(true);
            } else {
                pkg.mark_project_dependency(false);
            }
        }
    }

    /// Names reachable through dependency edges from `roots`, excluding the
    /// roots themselves unless another root depends on them.
    fn reachable_from(graph: &PackageGraph, roots: &[&str]) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        for root in roots {
            if let Some(pkg) = graph.get(root) {
                queue.extend(pkg.dependencies());
            }
        }

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.to_string()) {
                continue;
            }
            if let Some(pkg) = graph.get(name) {
                queue.extend(pkg.dependencies());
            }
        }

        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::test_utils::{listing_node as node, manifest, missing_node, project_root as root};

    /// angular-material -> {angular, angular-animate, angular-aria},
    /// angular-animate -> angular, angular-aria -> angular; every package is
    /// also installed at the top level.
    fn angular_listing() -> ListingNode {
        let angular = || node("angular", "1.4.1", vec![]);
        let animate = || node("angular-animate", "1.4.1", vec![angular()]);
        let aria = || node("angular-aria", "1.4.1", vec![angular()]);
        let material = node("angular-material", "0.10.0", vec![angular(), animate(), aria()]);
        root(vec![material, animate(), aria(), angular()])
    }

    fn names<'a>(it: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        it.collect()
    }

    #[test]
    fn test_angular_diamond() {
        let manifest = manifest(&[("angular-material", "*")], &[]);
        let graph = PackageFactory::build(&angular_listing(), Some(&manifest)).unwrap();

        assert_eq!(graph.len(), 4);

        let material = graph.get("angular-material").unwrap();
        assert!(material.is_project_dependency());
        assert!(material.is_production_dependency());
        assert_eq!(material.manifest_version(), Some("*"));
        assert_eq!(material.dependencies_count(), 3);

        for name in ["angular", "angular-animate", "angular-aria"] {
            let pkg = graph.get(name).unwrap();
            assert!(!pkg.is_project_dependency(), "{} should be transitive", name);
            assert!(!pkg.is_extraneous(), "{} should not be extraneous", name);
            assert!(pkg.is_installed());
        }

        let angular = graph.get("angular").unwrap();
        assert_eq!(
            names(angular.dependants()),
            vec!["angular-animate", "angular-aria", "angular-material"]
        );
        assert!(!angular.has_dependencies());
    }

    #[test]
    fn test_edges_are_symmetric() {
        let manifest = manifest(&[("angular-material", "*")], &[]);
        let graph = PackageFactory::build(&angular_listing(), Some(&manifest)).unwrap();
        assert!(graph.is_symmetric());

        let graph = PackageFactory::build(&angular_listing(), None).unwrap();
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_production_takes_precedence() {
        let listing = root(vec![node("jquery", "2.1.3", vec![])]);
        let manifest = manifest(&[("jquery", "~2.1.0")], &[("jquery", "*")]);

        let graph = PackageFactory::build(&listing, Some(&manifest)).unwrap();
        let jquery = graph.get("jquery").unwrap();

        assert!(jquery.is_production_dependency());
        assert!(!jquery.is_dev_dependency());
        assert_eq!(jquery.manifest_version(), Some("~2.1.0"));
    }

    #[test]
    fn test_dev_dependency() {
        let listing = root(vec![node("mocha", "2.2.5", vec![])]);
        let manifest = manifest(&[], &[("mocha", "~2.2.0")]);

        let graph = PackageFactory::build(&listing, Some(&manifest)).unwrap();
        let mocha = graph.get("mocha").unwrap();

        assert!(mocha.is_dev_dependency());
        assert!(mocha.is_project_dependency());
        assert!(!mocha.is_extraneous());
    }

    #[test]
    fn test_undeclared_top_level_is_extraneous() {
        let listing = root(vec![
            node("jquery", "2.1.3", vec![]),
            node("lodash", "3.9.3", vec![]),
        ]);
        let manifest = manifest(&[("jquery", "~2.1.3")], &[]);

        let graph = PackageFactory::build(&listing, Some(&manifest)).unwrap();
        let lodash = graph.get("lodash").unwrap();

        assert!(lodash.is_extraneous());
        assert!(lodash.is_project_dependency());
        assert!(!lodash.is_production_dependency());
        assert!(!lodash.is_dev_dependency());
    }

    #[test]
    fn test_declared_but_not_listed_is_missing() {
        let listing = root(vec![node("jquery", "2.1.3", vec![])]);
        let manifest = manifest(&[("jquery", "~2.1.3"), ("lodash", "~3.9.0")], &[]);

        let graph = PackageFactory::build(&listing, Some(&manifest)).unwrap();
        let lodash = graph.get("lodash").unwrap();

        assert!(lodash.is_missing());
        assert!(!lodash.is_installed());
        assert!(!lodash.has_dependencies());
        assert_eq!(lodash.manifest_version(), Some("~3.9.0"));
    }

    #[test]
    fn test_listed_missing_node_has_no_dependencies() {
        let mut lodash = missing_node("lodash");
        lodash.dependencies.insert("x".into(), node("x", "1.0.0", vec![]));
        let listing = root(vec![lodash]);
        let manifest = manifest(&[("lodash", "*")], &[]);

        let graph = PackageFactory::build(&listing, Some(&manifest)).unwrap();
        let lodash = graph.get("lodash").unwrap();

        assert!(lodash.is_missing());
        assert!(!lodash.has_dependencies());
        assert!(!graph.contains("x"));
    }

    #[test]
    fn test_no_manifest_treats_top_level_as_production() {
        let graph = PackageFactory::build(&angular_listing(), None).unwrap();

        for pkg in graph.iter() {
            assert!(pkg.is_production_dependency());
            assert!(pkg.is_project_dependency());
            assert!(!pkg.is_extraneous());
            assert!(!pkg.is_missing());
        }
    }

    #[test]
    fn test_no_manifest_nested_only_is_transitive() {
        let listing = root(vec![node(
            "bootstrap",
            "3.3.5",
            vec![node("jquery", "2.1.4", vec![])],
        )]);

        let graph = PackageFactory::build(&listing, None).unwrap();
        let jquery = graph.get("jquery").unwrap();

        assert!(!jquery.is_project_dependency());
        assert!(!jquery.is_tracked());
        assert!(!jquery.is_extraneous());
        assert!(jquery.has_dependant("bootstrap"));
    }

    #[test]
    fn test_manifest_round_trip_matches_no_manifest_build() {
        let listing = angular_listing();
        let initial = PackageFactory::build(&listing, None).unwrap();

        let declared: Vec<(&str, String)> = initial
            .iter()
            .map(|p| (p.name(), p.version().unwrap_or("*").to_string()))
            .collect();
        let manifest = ManifestSnapshot::new(
            declared
                .iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect(),
            BTreeMap::new(),
        );
        let rebuilt = PackageFactory::build(&listing, Some(&manifest)).unwrap();

        assert_eq!(initial.len(), rebuilt.len());
        for pkg in initial.iter() {
            assert!(pkg.is_equal_to(rebuilt.get(pkg.name()).unwrap()));
        }
    }

    #[test]
    fn test_descriptive_fields() {
        let mut jquery = node("jquery", "2.1.3", vec![]);
        if let Some(meta) = jquery.pkg_meta.as_mut() {
            meta.homepage = Some("https://jquery.com".into());
            meta.description = Some("DOM library".into());
        }
        let graph = PackageFactory::build(&root(vec![jquery]), None).unwrap();
        let pkg = graph.get("jquery").unwrap();

        assert_eq!(pkg.homepage.as_deref(), Some("https://jquery.com"));
        assert_eq!(pkg.description.as_deref(), Some("DOM library"));
        assert_eq!(pkg.source.as_deref(), Some("jquery"));
        assert_eq!(
            pkg.install_dir,
            Some(PathBuf::from("/work/app/bower_components/jquery"))
        );
    }

    #[test]
    fn test_malformed_node_aborts_build() {
        let mut bootstrap = node("bootstrap", "3.3.5", vec![]);
        bootstrap
            .dependencies
            .insert("jquery".into(), ListingNode::default());
        let listing = root(vec![node("jquery", "2.1.3", vec![]), bootstrap]);

        let result = PackageFactory::build(&listing, None);
        assert!(matches!(result, Err(EngineError::MalformedListing(_))));
    }

    #[test]
    fn test_flat_build_uses_metadata() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "angular".to_string(),
            node("angular", "1.4.1", vec![]),
        );
        nodes.insert(
            "angular-mocks".to_string(),
            node("angular-mocks", "1.4.1", vec![node("angular", "1.4.1", vec![])]),
        );
        let metadata = [PackageMetadata::new("angular-mocks", DependencyType::Development)];

        let graph = PackageFactory::build_flat(&nodes, &metadata).unwrap();

        let mocks = graph.get("angular-mocks").unwrap();
        assert!(mocks.is_dev_dependency());
        assert!(mocks.is_project_dependency());
        assert_eq!(mocks.manifest_version(), Some("~1.4.1"));
        assert!(!mocks.has_dependencies());

        let angular = graph.get("angular").unwrap();
        assert!(!angular.is_tracked());
        assert!(!angular.is_project_dependency());
        assert!(!angular.has_dependants());
    }
}
