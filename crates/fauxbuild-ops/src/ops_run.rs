//! Operation: simulate building a package graph.

use std::sync::Arc;

use fauxbuild_compiler::{
    BuildSummary, CargoProgress, CargoTimings, JobQueue, ProgressReporter, SilentProgress,
};
use fauxbuild_core::config::{GlobalConfig, MAX_TIME_SCALE};
use fauxbuild_resolver::BatchOrder;
use fauxbuild_util::errors::{FauxError, FauxResult};
use tracing::info;

use crate::{load_graph, GraphSource, WorkKind};

/// Options for `fauxbuild run`. Unset values fall back to the global config.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub kind: WorkKind,
    pub jobs: Option<usize>,
    pub seed: Option<u64>,
    pub time_scale: Option<f64>,
    /// Suppress progress output.
    pub quiet: bool,
}

/// Load or resolve the graph, then build every package on a worker pool.
pub async fn run(
    source: &GraphSource,
    opts: &RunOptions,
    config: &GlobalConfig,
) -> FauxResult<BuildSummary> {
    let jobs = opts.jobs.unwrap_or(config.build.jobs as usize);
    let seed = opts.seed.or(config.build.seed);
    let time_scale = opts.time_scale.unwrap_or(config.build.time_scale);
    if !(0.0..=MAX_TIME_SCALE).contains(&time_scale) {
        return Err(FauxError::Generic {
            message: format!("time scale must be between 0 and {MAX_TIME_SCALE}, got {time_scale}"),
        }
        .into());
    }

    let mut order = BatchOrder::shuffled(seed);
    let graph = load_graph(source, &mut order)?;
    info!(kind = %opts.kind, packages = graph.len(), jobs, seed, "loaded graph");

    // Timings draw from their own stream, offset from the shuffle seed.
    let durations = CargoTimings::new(&graph, seed.map(|s| s.wrapping_add(1)), time_scale);
    let reporter: Arc<dyn ProgressReporter> = if opts.quiet {
        Arc::new(SilentProgress)
    } else {
        Arc::new(CargoProgress::new())
    };

    let queue = JobQueue::new(jobs, Arc::new(durations), reporter);
    let summary = queue.run(Arc::new(graph), order.fork()).await?;
    Ok(summary)
}
