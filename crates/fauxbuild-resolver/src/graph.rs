//! Package graph: an arena of packages with mirrored dependency edges.
//!
//! Packages are addressed by [`PackageId`], a stable index into the arena.
//! Every edge is stored twice: `p.dependencies` holds `q` exactly when
//! `q.required_by` holds `p`. All mutation goes through [`PackageGraph::add_edge`]
//! and [`PackageGraph::remove_edge`], which keep the two sides in step.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};

/// Stable index of a package in a [`PackageGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(usize);

impl PackageId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the package graph, identified by name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: String,
    version: String,
    dependencies: Vec<PackageId>,
    required_by: Vec<PackageId>,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: Vec::new(),
            required_by: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Packages this one requires, in declaration order.
    pub fn dependencies(&self) -> &[PackageId] {
        &self.dependencies
    }

    /// Packages that require this one.
    pub fn required_by(&self) -> &[PackageId] {
        &self.required_by
    }

    /// Dependencies that must commit before this package may start.
    ///
    /// On a resolved graph this is the scheduler's initial counter value.
    pub fn remaining_dependency_count(&self) -> usize {
        self.dependencies.len()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// A package designated as a build goal, with the directory it was declared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: PackageId,
    pub path: String,
}

/// The full package graph plus its designated targets.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    packages: Vec<Package>,
    /// name -> version -> id
    index: HashMap<String, HashMap<String, PackageId>>,
    targets: Vec<Target>,
    target_set: HashSet<PackageId>,
}

impl PackageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a package without edges. Identity uniqueness is the caller's concern.
    pub(crate) fn push(&mut self, package: Package) -> PackageId {
        let id = PackageId(self.packages.len());
        self.index
            .entry(package.name.clone())
            .or_default()
            .insert(package.version.clone(), id);
        self.packages.push(package);
        id
    }

    /// Append a package whose edge lists are already populated (snapshot restore).
    pub(crate) fn push_with_edges(
        &mut self,
        name: String,
        version: String,
        dependencies: Vec<PackageId>,
        required_by: Vec<PackageId>,
    ) -> PackageId {
        let id = self.push(Package::new(name, version));
        let package = &mut self.packages[id.0];
        package.dependencies = dependencies;
        package.required_by = required_by;
        id
    }

    /// Record that `from` depends on `to`, on both sides of the edge.
    pub(crate) fn add_edge(&mut self, from: PackageId, to: PackageId) {
        self.packages[from.0].dependencies.push(to);
        self.packages[to.0].required_by.push(from);
    }

    /// Delete the edge `from -> to` and its mirror. Returns `false` if absent.
    pub(crate) fn remove_edge(&mut self, from: PackageId, to: PackageId) -> bool {
        let deps = &mut self.packages[from.0].dependencies;
        let before = deps.len();
        deps.retain(|&d| d != to);
        if deps.len() == before {
            return false;
        }
        self.packages[to.0].required_by.retain(|&r| r != from);
        true
    }

    /// Designate `id` as a target. A package designated twice keeps its first path.
    pub(crate) fn add_target(&mut self, id: PackageId, path: String) -> bool {
        if !self.target_set.insert(id) {
            return false;
        }
        self.targets.push(Target { id, path });
        true
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, p)| (PackageId(i), p))
    }

    pub fn ids(&self) -> impl Iterator<Item = PackageId> {
        (0..self.packages.len()).map(PackageId)
    }

    /// Look up a package by exact name and version.
    pub fn find(&self, name: &str, version: &str) -> Option<PackageId> {
        self.index.get(name)?.get(version).copied()
    }

    /// All locked versions of `name`, unordered.
    pub fn versions_of(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|versions| versions.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn is_target(&self, id: PackageId) -> bool {
        self.target_set.contains(&id)
    }

    /// Declared directory of a target package.
    pub fn target_path(&self, id: PackageId) -> Option<&str> {
        self.targets
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.path.as_str())
    }

    /// Packages with no unmet dependencies, in arena order.
    pub fn initial_ready(&self) -> Vec<PackageId> {
        self.packages()
            .filter(|(_, p)| p.remaining_dependency_count() == 0)
            .map(|(id, _)| id)
            .collect()
    }

    /// Largest dependency count of any package.
    pub fn max_dependency_count(&self) -> usize {
        self.packages
            .iter()
            .map(Package::remaining_dependency_count)
            .max()
            .unwrap_or(0)
    }

    /// Total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.packages.iter().map(|p| p.dependencies.len()).sum()
    }

    /// Export as a petgraph graph whose node `i` is package `i`, edges pointing
    /// from dependent to dependency.
    pub fn to_digraph(&self) -> DiGraph<PackageId, ()> {
        let mut graph = DiGraph::with_capacity(self.len(), self.edge_count());
        for id in self.ids() {
            graph.add_node(id);
        }
        for (id, package) in self.packages() {
            for dep in &package.dependencies {
                graph.add_edge(NodeIndex::new(id.0), NodeIndex::new(dep.0), ());
            }
        }
        graph
    }

    /// `true` when no dependency cycle (including self-loops) exists.
    pub fn is_acyclic(&self) -> bool {
        !petgraph::algo::is_cyclic_directed(&self.to_digraph())
    }

    /// `true` when `to` is reachable from `from` along dependency edges.
    pub fn reaches(&self, from: PackageId, to: PackageId) -> bool {
        petgraph::algo::has_path_connecting(
            &self.to_digraph(),
            NodeIndex::new(from.0),
            NodeIndex::new(to.0),
            None,
        )
    }

    /// Human-readable labels for a set of packages.
    pub fn labels(&self, ids: &[PackageId]) -> Vec<String> {
        ids.iter().map(|&id| self.package(id).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> (PackageGraph, [PackageId; 4]) {
        let mut g = PackageGraph::new();
        let a = g.push(Package::new("a", "1.0.0"));
        let b = g.push(Package::new("b", "1.0.0"));
        let c = g.push(Package::new("c", "1.0.0"));
        let d = g.push(Package::new("d", "1.0.0"));
        g.add_edge(b, a);
        g.add_edge(c, a);
        g.add_edge(d, b);
        g.add_edge(d, c);
        (g, [a, b, c, d])
    }

    #[test]
    fn edges_are_mirrored() {
        let (g, [a, b, c, d]) = diamond();
        assert_eq!(g.package(d).dependencies(), &[b, c]);
        assert_eq!(g.package(a).required_by(), &[b, c]);
        for (id, p) in g.packages() {
            for &dep in p.dependencies() {
                assert!(g.package(dep).required_by().contains(&id));
            }
        }
    }

    #[test]
    fn remove_edge_updates_both_sides() {
        let (mut g, [a, b, _, _]) = diamond();
        assert!(g.remove_edge(b, a));
        assert!(g.package(b).dependencies().is_empty());
        assert!(!g.package(a).required_by().contains(&b));
        assert!(!g.remove_edge(b, a));
    }

    #[test]
    fn find_by_name_and_version() {
        let (g, [_, b, _, _]) = diamond();
        assert_eq!(g.find("b", "1.0.0"), Some(b));
        assert_eq!(g.find("b", "2.0.0"), None);
        assert_eq!(g.versions_of("b"), vec!["1.0.0"]);
        assert!(g.versions_of("zzz").is_empty());
    }

    #[test]
    fn initial_ready_has_only_leaves() {
        let (g, [a, _, _, _]) = diamond();
        assert_eq!(g.initial_ready(), vec![a]);
        assert_eq!(g.max_dependency_count(), 2);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn targets_keep_first_designation() {
        let (mut g, [_, _, _, d]) = diamond();
        assert!(g.add_target(d, "/work/d".into()));
        assert!(!g.add_target(d, "/elsewhere".into()));
        assert!(g.is_target(d));
        assert_eq!(g.target_path(d), Some("/work/d"));
        assert_eq!(g.targets().len(), 1);
    }

    #[test]
    fn digraph_export_and_cycle_detection() {
        let (mut g, [a, _, _, d]) = diamond();
        assert!(g.is_acyclic());
        assert!(g.reaches(d, a));
        assert!(!g.reaches(a, d));
        g.add_edge(a, d);
        assert!(!g.is_acyclic());
    }

    #[test]
    fn display_is_name_and_version() {
        let p = Package::new("serde", "1.0.195");
        assert_eq!(p.to_string(), "serde v1.0.195");
    }
}
