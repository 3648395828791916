//! Self-loop and cycle resolution.
//!
//! Cargo dev-dependencies let a workspace package be depended upon by one of
//! its own dependencies, which shows up in `Cargo.lock` as a cycle. Such a
//! cycle is tolerated when it passes through a target: the target's edges
//! into the rest of the cycle are deleted. Any cycle that touches no target
//! is a genuine metadata error.

use std::collections::HashSet;

use petgraph::algo::kosaraju_scc;
use tracing::warn;

use crate::error::GraphError;
use crate::graph::{PackageGraph, PackageId};

/// Edits made while resolving a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Targets whose self-dependency was dropped.
    pub dropped_self_loops: Vec<PackageId>,
    /// Deleted `(target, dependency)` edges.
    pub broken_edges: Vec<(PackageId, PackageId)>,
    /// Deleted edges whose dependency the target no longer reaches at all.
    pub unreachable: Vec<(PackageId, PackageId)>,
}

impl ResolutionReport {
    pub fn is_clean(&self) -> bool {
        self.dropped_self_loops.is_empty() && self.broken_edges.is_empty()
    }
}

/// Make `graph` acyclic or explain why it cannot be.
pub fn resolve(graph: &mut PackageGraph) -> Result<ResolutionReport, GraphError> {
    let mut report = ResolutionReport::default();

    drop_self_loops(graph, &mut report)?;

    loop {
        let components = strongly_connected(graph);
        if components.is_empty() {
            break;
        }
        for component in components {
            break_component(graph, &component, &mut report)?;
        }
    }

    for &(target, dependency) in &report.broken_edges {
        if !graph.reaches(target, dependency) {
            warn!(
                target = %graph.package(target),
                dependency = %graph.package(dependency),
                "target no longer reaches a declared dependency after cycle breaking"
            );
            report.unreachable.push((target, dependency));
        }
    }

    Ok(report)
}

fn drop_self_loops(
    graph: &mut PackageGraph,
    report: &mut ResolutionReport,
) -> Result<(), GraphError> {
    let looped: Vec<PackageId> = graph
        .packages()
        .filter(|(id, p)| p.dependencies().contains(id))
        .map(|(id, _)| id)
        .collect();

    for id in looped {
        if !graph.is_target(id) {
            return Err(GraphError::SelfDependency {
                package: graph.package(id).to_string(),
            });
        }
        graph.remove_edge(id, id);
        warn!(package = %graph.package(id), "dropped self-dependency of target");
        report.dropped_self_loops.push(id);
    }
    Ok(())
}

fn break_component(
    graph: &mut PackageGraph,
    component: &[PackageId],
    report: &mut ResolutionReport,
) -> Result<(), GraphError> {
    let (targets, rest): (Vec<PackageId>, Vec<PackageId>) =
        component.iter().partition(|&&id| graph.is_target(id));

    let cycle_error = |graph: &PackageGraph| {
        let mut members = graph.labels(component);
        members.sort();
        GraphError::Cycle { members }
    };

    if targets.is_empty() {
        return Err(cycle_error(graph));
    }

    let rest: HashSet<PackageId> = rest.into_iter().collect();
    let mut removed = 0;
    for target in targets {
        let doomed: Vec<PackageId> = graph
            .package(target)
            .dependencies()
            .iter()
            .copied()
            .filter(|dep| rest.contains(dep))
            .collect();
        for dep in doomed {
            graph.remove_edge(target, dep);
            warn!(
                target = %graph.package(target),
                dependency = %graph.package(dep),
                "breaking dependency cycle by dropping edge"
            );
            report.broken_edges.push((target, dep));
            removed += 1;
        }
    }

    // A cycle made only of targets has nothing to cut.
    if removed == 0 {
        return Err(cycle_error(graph));
    }
    Ok(())
}

/// Strongly connected components with more than one member (Kosaraju).
pub fn strongly_connected(graph: &PackageGraph) -> Vec<Vec<PackageId>> {
    let digraph = graph.to_digraph();
    kosaraju_scc(&digraph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| component.into_iter().map(|node| digraph[node]).collect())
        .collect()
}
