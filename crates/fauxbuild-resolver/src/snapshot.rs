//! Conversion between a resolved [`PackageGraph`] and its index-based snapshot.
//!
//! Loading trusts the snapshot to be already resolved: identities, indices and
//! edge symmetry are checked, cycles are not.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use fauxbuild_core::snapshot::{GraphSnapshot, SnapshotContainer, SnapshotError, SnapshotPackage};
use fauxbuild_core::CARGO_KIND;
use fauxbuild_util::errors::FauxError;
use tracing::debug;

use crate::graph::{PackageGraph, PackageId};

impl PackageGraph {
    /// Encode the graph with arena indices as references.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let packages = self
            .packages()
            .map(|(_, p)| SnapshotPackage {
                name: p.name().to_string(),
                version: p.version().to_string(),
                dependencies: p.dependencies().iter().map(|d| d.index()).collect(),
                required_by: p.required_by().iter().map(|r| r.index()).collect(),
            })
            .collect();
        let (targets, paths) = self
            .targets()
            .iter()
            .map(|t| (t.id.index(), t.path.clone()))
            .unzip();
        GraphSnapshot {
            packages,
            targets,
            paths,
        }
    }

    /// Rebuild a graph from a snapshot, keeping its package order.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, SnapshotError> {
        let len = snapshot.packages.len();
        if snapshot.targets.len() != snapshot.paths.len() {
            return Err(SnapshotError::TargetPathMismatch {
                targets: snapshot.targets.len(),
                paths: snapshot.paths.len(),
            });
        }

        let mut identities: HashMap<(&str, &str), usize> = HashMap::new();
        for (package, p) in snapshot.packages.iter().enumerate() {
            if let Some(&first) = identities.get(&(p.name.as_str(), p.version.as_str())) {
                return Err(SnapshotError::DuplicatePackage {
                    name: p.name.clone(),
                    version: p.version.clone(),
                    first,
                    second: package,
                });
            }
            identities.insert((p.name.as_str(), p.version.as_str()), package);

            let fields = [("dep", &p.dependencies), ("req", &p.required_by)];
            for (field, indices) in fields {
                let mut seen = HashSet::with_capacity(indices.len());
                for &index in indices.iter() {
                    if index >= len {
                        return Err(SnapshotError::DanglingIndex {
                            package,
                            field,
                            index,
                            len,
                        });
                    }
                    // Counters are derived from list lengths, so a repeat would skew them.
                    if !seen.insert(index) {
                        return Err(SnapshotError::DuplicateEdge {
                            package,
                            field,
                            index,
                        });
                    }
                }
            }
        }

        for (package, p) in snapshot.packages.iter().enumerate() {
            for &dependency in &p.dependencies {
                if !snapshot.packages[dependency].required_by.contains(&package) {
                    return Err(SnapshotError::AsymmetricEdge {
                        package,
                        dependency,
                    });
                }
            }
            for &dependent in &p.required_by {
                if !snapshot.packages[dependent].dependencies.contains(&package) {
                    return Err(SnapshotError::AsymmetricEdge {
                        package: dependent,
                        dependency: package,
                    });
                }
            }
        }

        let mut graph = PackageGraph::new();
        for p in snapshot.packages {
            graph.push_with_edges(
                p.name,
                p.version,
                p.dependencies.into_iter().map(PackageId::new).collect(),
                p.required_by.into_iter().map(PackageId::new).collect(),
            );
        }
        for (index, path) in snapshot.targets.into_iter().zip(snapshot.paths) {
            if index >= len {
                return Err(SnapshotError::DanglingTarget { index, len });
            }
            graph.add_target(PackageId::new(index), path);
        }

        debug!(
            packages = graph.len(),
            targets = graph.targets().len(),
            "restored graph from snapshot"
        );
        Ok(graph)
    }

    /// Serialize into the on-disk container format.
    pub fn encode_snapshot(&self, level: u32) -> miette::Result<Vec<u8>> {
        let payload = self.to_snapshot().to_json().map_err(|e| FauxError::Snapshot {
            message: format!("Failed to serialize graph: {e}"),
        })?;
        let bytes = SnapshotContainer::new(CARGO_KIND, payload)
            .encode(level)
            .map_err(|e| FauxError::Snapshot {
                message: format!("Failed to compress graph: {e}"),
            })?;
        Ok(bytes)
    }

    /// Parse bytes in the on-disk container format.
    pub fn decode_snapshot(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let payload = SnapshotContainer::decode(bytes)?.into_payload(CARGO_KIND)?;
        Self::from_snapshot(GraphSnapshot::from_json(&payload)?)
    }

    pub fn write_snapshot(&self, path: &Path, level: u32) -> miette::Result<()> {
        let payload = self.to_snapshot().to_json().map_err(|e| FauxError::Snapshot {
            message: format!("Failed to serialize graph: {e}"),
        })?;
        SnapshotContainer::new(CARGO_KIND, payload).write(path, level)
    }

    pub fn read_snapshot(path: &Path) -> miette::Result<Self> {
        let payload = SnapshotContainer::read(path)?.into_payload(CARGO_KIND)?;
        Ok(Self::from_snapshot(GraphSnapshot::from_json(&payload)?)?)
    }
}
