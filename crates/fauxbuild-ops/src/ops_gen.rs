//! Operation: resolve a project's graph and write it as a snapshot.

use std::path::{Path, PathBuf};

use fauxbuild_core::config::GlobalConfig;
use fauxbuild_resolver::BatchOrder;
use fauxbuild_util::errors::{FauxError, FauxResult};
use fauxbuild_util::hash;
use fauxbuild_util::progress::status_info;
use tracing::info;

use crate::{resolve_project, WorkKind};

/// Options for `fauxbuild gen`.
#[derive(Debug, Clone)]
pub struct GenOptions {
    pub output: PathBuf,
    pub kind: WorkKind,
    /// Seed for the package order stored in the snapshot.
    pub seed: Option<u64>,
}

/// What was written.
#[derive(Debug, Clone)]
pub struct GenReport {
    pub output: PathBuf,
    pub kind: WorkKind,
    pub packages: usize,
    pub size: u64,
    pub sha256: String,
}

/// Resolve the project in `project_dir` and write its snapshot to `opts.output`.
pub fn gen(
    project_dir: &Path,
    opts: &GenOptions,
    config: &GlobalConfig,
) -> FauxResult<GenReport> {
    let mut order = BatchOrder::shuffled(opts.seed.or(config.build.seed));
    let graph = resolve_project(project_dir, &mut order)?;
    graph.write_snapshot(&opts.output, config.snapshot.compression)?;

    let output = fauxbuild_util::fs::absolute(&opts.output).map_err(FauxError::Io)?;
    let size = std::fs::metadata(&output).map_err(FauxError::Io)?.len();
    let sha256 = hash::sha256_file(&output).map_err(FauxError::Io)?;
    info!(output = %output.display(), packages = graph.len(), size, "snapshot written");

    status_info("Output", &output.display().to_string());
    status_info("Type", opts.kind.as_str());
    status_info("Size", &format!("{:.2} KiB", size as f64 / 1024.0));
    status_info("SHA-256", &sha256);

    Ok(GenReport {
        output,
        kind: opts.kind,
        packages: graph.len(),
        size,
        sha256,
    })
}
