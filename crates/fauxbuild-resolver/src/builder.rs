use std::collections::HashSet;

use fauxbuild_core::lockfile::{DependencyRef, LockedPackage};
use fauxbuild_core::workspace::{TargetDecl, Workspace};
use tracing::{debug, info};

use crate::cycle::{self, ResolutionReport};
use crate::error::GraphError;
use crate::graph::{Package, PackageGraph, PackageId};
use crate::order::BatchOrder;

/// One package as declared by a manifest source, before references are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    /// `"name"` or `"name version"` references.
    pub dependencies: Vec<String>,
}

impl From<&LockedPackage> for PackageRecord {
    fn from(locked: &LockedPackage) -> Self {
        Self {
            name: locked.name.clone(),
            version: locked.version.clone(),
            dependencies: locked.dependencies.clone(),
        }
    }
}

/// A graph that passed construction and cycle resolution.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    pub graph: PackageGraph,
    pub report: ResolutionReport,
}

/// Collects package records and target designators, then builds a resolved graph.
///
/// ```ignore
/// let resolved = GraphBuilder::new()
///     .package("a", "1.0.0", &[])
///     .package("b", "1.0.0", &["a"])
///     .target("b", "1.0.0", "/work/b")
///     .build(&mut BatchOrder::Declared)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    records: Vec<PackageRecord>,
    targets: Vec<TargetDecl>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every locked package, with the workspace's root package and members as targets.
    pub fn from_workspace(workspace: &Workspace) -> Self {
        Self {
            records: workspace
                .lockfile
                .package
                .iter()
                .map(PackageRecord::from)
                .collect(),
            targets: workspace.targets.clone(),
        }
    }

    pub fn package(mut self, name: &str, version: &str, dependencies: &[&str]) -> Self {
        self.records.push(PackageRecord {
            name: name.to_string(),
            version: version.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        });
        self
    }

    pub fn record(mut self, record: PackageRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn target(mut self, name: &str, version: &str, path: &str) -> Self {
        self.targets.push(TargetDecl {
            name: name.to_string(),
            version: version.to_string(),
            path: path.to_string(),
        });
        self
    }

    /// Index, link, designate targets and resolve cycles.
    ///
    /// `order` decides the arena order of packages, which is also the order
    /// the initial ready set is seeded in.
    pub fn build(mut self, order: &mut BatchOrder) -> Result<ResolvedGraph, GraphError> {
        order.arrange(&mut self.records);

        let mut graph = PackageGraph::new();
        for record in &self.records {
            if graph.find(&record.name, &record.version).is_some() {
                return Err(GraphError::DuplicatePackage {
                    package: format!("{} v{}", record.name, record.version),
                });
            }
            graph.push(Package::new(record.name.as_str(), record.version.as_str()));
        }

        let mut edges = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            let from = PackageId::new(index);
            let mut seen = HashSet::new();
            for raw in &record.dependencies {
                let to = resolve_reference(&graph, from, DependencyRef::parse(raw))?;
                if !seen.insert(to) {
                    return Err(GraphError::DuplicateDependency {
                        package: graph.package(from).to_string(),
                        dependency: graph.package(to).to_string(),
                    });
                }
                edges.push((from, to));
            }
        }
        for (from, to) in edges {
            graph.add_edge(from, to);
        }

        for decl in &self.targets {
            let id = graph
                .find(&decl.name, &decl.version)
                .ok_or_else(|| unknown_target(&graph, decl))?;
            if !graph.add_target(id, decl.path.clone()) {
                debug!(target = %graph.package(id), path = %decl.path, "target designated twice, keeping first path");
            }
        }

        let report = cycle::resolve(&mut graph)?;

        info!(
            packages = graph.len(),
            edges = graph.edge_count(),
            targets = graph.targets().len(),
            broken = report.broken_edges.len(),
            "resolved package graph"
        );

        Ok(ResolvedGraph { graph, report })
    }
}

fn resolve_reference(
    graph: &PackageGraph,
    from: PackageId,
    reference: DependencyRef<'_>,
) -> Result<PackageId, GraphError> {
    let package = || graph.package(from).to_string();
    match reference {
        DependencyRef::Versioned { name, version } => {
            graph.find(name, version).ok_or_else(|| {
                if graph.versions_of(name).is_empty() {
                    GraphError::UnresolvedReference {
                        package: package(),
                        reference: reference.to_string(),
                    }
                } else {
                    GraphError::UnknownVersion {
                        package: package(),
                        name: name.to_string(),
                        version: version.to_string(),
                    }
                }
            })
        }
        DependencyRef::Bare(name) => {
            let mut versions = graph.versions_of(name);
            match versions.len() {
                0 => Err(GraphError::UnresolvedReference {
                    package: package(),
                    reference: name.to_string(),
                }),
                1 => graph.find(name, versions[0]).ok_or_else(|| {
                    GraphError::UnresolvedReference {
                        package: package(),
                        reference: name.to_string(),
                    }
                }),
                _ => {
                    versions.sort_unstable();
                    Err(GraphError::AmbiguousReference {
                        package: package(),
                        name: name.to_string(),
                        candidates: versions.iter().map(|v| format!("{name} v{v}")).collect(),
                    })
                }
            }
        }
    }
}

fn unknown_target(graph: &PackageGraph, decl: &TargetDecl) -> GraphError {
    let reason = if graph.versions_of(&decl.name).is_empty() {
        "is not in the lockfile".to_string()
    } else {
        format!("has no locked version {}", decl.version)
    };
    GraphError::UnknownTarget {
        target: format!("{} v{}", decl.name, decl.version),
        reason,
    }
}
