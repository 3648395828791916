pub mod ops_gen;
pub mod ops_run;

use std::fmt;
use std::path::{Path, PathBuf};

use fauxbuild_core::workspace::Workspace;
use fauxbuild_core::CARGO_KIND;
use fauxbuild_resolver::{BatchOrder, GraphBuilder, PackageGraph};
use fauxbuild_util::errors::FauxResult;
use fauxbuild_util::progress::status_warn;
use tracing::debug;

/// Kind of work a graph describes. Only Cargo package graphs are simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkKind {
    #[default]
    Cargo,
}

impl WorkKind {
    /// Discriminator stored in snapshot headers.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkKind::Cargo => CARGO_KIND,
        }
    }
}

impl fmt::Display for WorkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a package graph comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphSource {
    /// A project directory with `Cargo.toml` and `Cargo.lock`.
    Directory(PathBuf),
    /// A snapshot written by `fauxbuild gen`.
    Snapshot(PathBuf),
}

/// Build and resolve the graph of a project directory, warning about cut edges.
pub fn resolve_project(dir: &Path, order: &mut BatchOrder) -> FauxResult<PackageGraph> {
    let workspace = Workspace::load(dir)?;
    debug!(
        root = %workspace.root_dir.display(),
        targets = workspace.targets.len(),
        virtual_manifest = workspace.is_virtual(),
        "loaded workspace"
    );
    let resolved = GraphBuilder::from_workspace(&workspace).build(order)?;
    let graph = resolved.graph;
    for (target, dependency) in &resolved.report.unreachable {
        status_warn(
            "warning",
            &format!(
                "`{}` no longer depends on `{}` after breaking a dependency cycle",
                graph.package(*target),
                graph.package(*dependency)
            ),
        );
    }
    Ok(graph)
}

/// Load a graph from either source.
pub fn load_graph(source: &GraphSource, order: &mut BatchOrder) -> FauxResult<PackageGraph> {
    match source {
        GraphSource::Directory(dir) => resolve_project(dir, order),
        GraphSource::Snapshot(path) => PackageGraph::read_snapshot(path),
    }
}
