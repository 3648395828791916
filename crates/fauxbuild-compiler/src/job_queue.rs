//! Concurrent execution of a resolved package graph.
//!
//! The driver pulls batches from the [`Scheduler`] and hands each package to
//! a fixed pool of worker tasks over a channel. Workers "compile" (sleep for
//! the duration model's time) and forward the package to one commit task,
//! which is the only caller of [`Scheduler::commit`]. After each commit the
//! driver is woken to collect newly ready work.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fauxbuild_resolver::{BatchOrder, PackageGraph, PackageId};
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, info};

use crate::error::{BuildError, SchedulerError};
use crate::progress::{ProgressReporter, TaskLabel};
use crate::scheduler::{Next, ScheduleEvent, Scheduler};
use crate::timings::DurationModel;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub total: usize,
    pub committed: usize,
    pub dispatched: usize,
    pub elapsed: Duration,
    /// Dispatch and commit events in the order the scheduler saw them.
    pub timeline: Vec<ScheduleEvent>,
}

/// Dispatched-but-uncommitted work.
#[derive(Default)]
struct Outstanding {
    count: AtomicUsize,
    idle: Notify,
}

impl Outstanding {
    fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn done(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_one();
        }
    }

    async fn wait_idle(&self) {
        while self.count.load(Ordering::SeqCst) != 0 {
            self.idle.notified().await;
        }
    }
}

/// A fixed-size pool of simulated compilers.
pub struct JobQueue {
    jobs: usize,
    durations: Arc<dyn DurationModel>,
    reporter: Arc<dyn ProgressReporter>,
}

impl JobQueue {
    pub fn new(
        jobs: usize,
        durations: Arc<dyn DurationModel>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            jobs,
            durations,
            reporter,
        }
    }

    /// Build every package in `graph` exactly once, dependencies first.
    pub async fn run(
        &self,
        graph: Arc<PackageGraph>,
        order: BatchOrder,
    ) -> Result<BuildSummary, BuildError> {
        if self.jobs == 0 {
            return Err(SchedulerError::InvalidJobs { jobs: self.jobs }.into());
        }

        let started = Instant::now();
        let scheduler = Arc::new(Scheduler::new(Arc::clone(&graph), order));
        let outstanding = Arc::new(Outstanding::default());
        let wakeup = Arc::new(Notify::new());

        let (work_tx, work_rx) = mpsc::channel::<PackageId>(graph.len().max(1));
        let (done_tx, done_rx) = mpsc::unbounded_channel::<PackageId>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        self.reporter.announce_total(graph.len());
        self.reporter.prologue();
        info!(packages = graph.len(), jobs = self.jobs, "starting build");

        let mut workers = JoinSet::new();
        for worker in 0..self.jobs {
            let graph = Arc::clone(&graph);
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let durations = Arc::clone(&self.durations);
            let reporter = Arc::clone(&self.reporter);
            workers.spawn(async move {
                loop {
                    // Hold the lock only while waiting for the next package.
                    let next = work_rx.lock().await.recv().await;
                    let Some(id) = next else { break };
                    reporter.on_start(&TaskLabel::for_package(&graph, id));
                    let elapsed = durations.duration(graph.package(id));
                    debug!(worker, package = %graph.package(id), ?elapsed, "compiling");
                    tokio::time::sleep(elapsed).await;
                    if done_tx.send(id).is_err() {
                        break;
                    }
                }
            });
        }
        drop(done_tx);

        let mut commits = spawn_commit_task(
            Arc::clone(&scheduler),
            done_rx,
            Arc::clone(&self.reporter),
            Arc::clone(&outstanding),
            Arc::clone(&wakeup),
        );

        let mut dispatched = 0;
        loop {
            let batch = match scheduler.next()? {
                Next::Done => break,
                Next::Batch(batch) => batch,
            };
            if batch.is_empty() {
                tokio::select! {
                    _ = wakeup.notified() => continue,
                    joined = &mut commits => return Err(commit_task_ended(joined)),
                    Some(joined) = workers.join_next() => return Err(worker_ended(joined)),
                }
            }
            for id in batch {
                outstanding.add();
                dispatched += 1;
                work_tx.send(id).await.map_err(|_| BuildError::Pool {
                    message: "every worker has exited".to_string(),
                })?;
                let gap = self.durations.dispatch_gap();
                if !gap.is_zero() {
                    tokio::time::sleep(gap).await;
                }
            }
        }

        outstanding.wait_idle().await;
        drop(work_tx);
        while let Some(joined) = workers.join_next().await {
            joined.map_err(|e| BuildError::Pool {
                message: e.to_string(),
            })?;
        }
        commits
            .await
            .map_err(|e| BuildError::Pool {
                message: e.to_string(),
            })??;

        self.reporter.epilogue();

        let summary = BuildSummary {
            total: graph.len(),
            committed: scheduler.committed(),
            dispatched,
            elapsed: started.elapsed(),
            timeline: scheduler.timeline(),
        };
        info!(
            committed = summary.committed,
            elapsed = ?summary.elapsed,
            "build finished"
        );
        Ok(summary)
    }
}

fn spawn_commit_task(
    scheduler: Arc<Scheduler>,
    mut done_rx: mpsc::UnboundedReceiver<PackageId>,
    reporter: Arc<dyn ProgressReporter>,
    outstanding: Arc<Outstanding>,
    wakeup: Arc<Notify>,
) -> JoinHandle<Result<(), SchedulerError>> {
    tokio::spawn(async move {
        while let Some(id) = done_rx.recv().await {
            scheduler.commit(id)?;
            reporter.on_complete(&TaskLabel::for_package(scheduler.graph(), id));
            outstanding.done();
            wakeup.notify_one();
        }
        Ok(())
    })
}

fn commit_task_ended(
    joined: Result<Result<(), SchedulerError>, JoinError>,
) -> BuildError {
    match joined {
        Ok(Err(e)) => e.into(),
        Ok(Ok(())) => BuildError::Pool {
            message: "commit task exited before the build finished".to_string(),
        },
        Err(e) => BuildError::Pool {
            message: e.to_string(),
        },
    }
}

/// Workers only return once the work channel closes, so any earlier exit is a failure.
fn worker_ended(joined: Result<(), JoinError>) -> BuildError {
    match joined {
        Ok(()) => BuildError::Pool {
            message: "worker exited before the build finished".to_string(),
        },
        Err(e) => BuildError::Pool {
            message: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use crate::timings::FixedDuration;

    #[test]
    fn outstanding_counts_down() {
        let outstanding = Outstanding::default();
        outstanding.add();
        outstanding.add();
        outstanding.done();
        assert_eq!(outstanding.count.load(Ordering::SeqCst), 1);
        outstanding.done();
        assert_eq!(outstanding.count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_workers_is_rejected() {
        let queue = JobQueue::new(
            0,
            Arc::new(FixedDuration::default()),
            Arc::new(SilentProgress),
        );
        let err = queue
            .run(Arc::new(PackageGraph::new()), BatchOrder::Declared)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Scheduler(SchedulerError::InvalidJobs { jobs: 0 })
        ));
    }

    #[tokio::test]
    async fn empty_graph_finishes() {
        let queue = JobQueue::new(
            2,
            Arc::new(FixedDuration::default()),
            Arc::new(SilentProgress),
        );
        let summary = queue
            .run(Arc::new(PackageGraph::new()), BatchOrder::Declared)
            .await
            .unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.committed, 0);
        assert!(summary.timeline.is_empty());
    }

    struct PanicsOn(&'static str);

    impl DurationModel for PanicsOn {
        fn duration(&self, package: &fauxbuild_resolver::Package) -> Duration {
            if package.name() == self.0 {
                panic!("no timing for {}", package.name());
            }
            Duration::ZERO
        }
    }

    #[tokio::test]
    async fn panicking_worker_fails_the_run() {
        let graph = fauxbuild_resolver::GraphBuilder::new()
            .package("a", "1.0.0", &[])
            .package("b", "1.0.0", &["a"])
            .build(&mut BatchOrder::Declared)
            .unwrap()
            .graph;
        let queue = JobQueue::new(2, Arc::new(PanicsOn("a")), Arc::new(SilentProgress));
        let outcome = tokio::time::timeout(
            Duration::from_secs(10),
            queue.run(Arc::new(graph), BatchOrder::Declared),
        )
        .await
        .expect("run should not hang");
        match outcome.unwrap_err() {
            BuildError::Pool { message } => assert!(message.contains("panicked"), "got: {message}"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
