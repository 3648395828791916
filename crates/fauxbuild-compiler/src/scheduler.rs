//! Ready-set scheduling over a resolved package graph.
//!
//! [`ReadySet`] is the single owner of all mutable scheduling state: per
//! package remaining-dependency counters, lifecycle states, the queue of
//! ready-but-undispatched packages and the commit count. [`Scheduler`]
//! shares it between the driver and the commit path behind a mutex; the
//! graph itself is immutable and read concurrently through an `Arc`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fauxbuild_resolver::{BatchOrder, PackageGraph, PackageId};
use tracing::debug;

use crate::error::SchedulerError;

/// Lifecycle of a package within one run. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    Pending,
    Ready,
    InProgress,
    Committed,
}

/// One entry of the linearized run history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleEvent {
    Dispatched(PackageId),
    Committed(PackageId),
}

/// Result of [`ReadySet::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Packages to dispatch now. Empty means "wait for a commit".
    Batch(Vec<PackageId>),
    /// Every package is committed. `next()` must not be called again.
    Done,
}

#[derive(Debug)]
pub struct ReadySet {
    states: Vec<PackageState>,
    remaining: Vec<usize>,
    queue: Vec<PackageId>,
    committed: usize,
    in_flight: usize,
    done: bool,
    timeline: Vec<ScheduleEvent>,
    order: BatchOrder,
}

impl ReadySet {
    /// Seed counters from the graph; packages without dependencies start ready.
    pub fn new(graph: &PackageGraph, order: BatchOrder) -> Self {
        let remaining: Vec<usize> = graph
            .packages()
            .map(|(_, p)| p.remaining_dependency_count())
            .collect();
        let states = remaining
            .iter()
            .map(|&n| {
                if n == 0 {
                    PackageState::Ready
                } else {
                    PackageState::Pending
                }
            })
            .collect();
        Self {
            states,
            remaining,
            queue: graph.initial_ready(),
            committed: 0,
            in_flight: 0,
            done: false,
            timeline: Vec::with_capacity(graph.len() * 2),
            order,
        }
    }

    /// Drain the ready queue, in shuffled order, marking every package in progress.
    pub fn next(&mut self) -> Result<Next, SchedulerError> {
        if self.done {
            return Err(SchedulerError::NextAfterEnd);
        }
        if self.is_complete() {
            self.done = true;
            return Ok(Next::Done);
        }
        if self.queue.is_empty() && self.in_flight == 0 {
            return Err(SchedulerError::Stalled {
                committed: self.committed,
                total: self.total(),
            });
        }

        let mut batch = std::mem::take(&mut self.queue);
        self.order.arrange(&mut batch);
        for &id in &batch {
            self.states[id.index()] = PackageState::InProgress;
            self.timeline.push(ScheduleEvent::Dispatched(id));
        }
        self.in_flight += batch.len();
        Ok(Next::Batch(batch))
    }

    /// Record `id` as finished and release dependents whose last dependency it was.
    ///
    /// Returns the newly ready packages.
    pub fn commit(
        &mut self,
        graph: &PackageGraph,
        id: PackageId,
    ) -> Result<Vec<PackageId>, SchedulerError> {
        match self.states[id.index()] {
            PackageState::InProgress => {}
            PackageState::Committed => {
                return Err(SchedulerError::AlreadyCommitted {
                    package: graph.package(id).to_string(),
                })
            }
            PackageState::Pending | PackageState::Ready => {
                return Err(SchedulerError::NotDispatched {
                    package: graph.package(id).to_string(),
                })
            }
        }

        self.states[id.index()] = PackageState::Committed;
        self.committed += 1;
        self.in_flight -= 1;
        self.timeline.push(ScheduleEvent::Committed(id));

        let mut released = Vec::new();
        for &dependent in graph.package(id).required_by() {
            let slot = &mut self.remaining[dependent.index()];
            *slot -= 1;
            if *slot == 0 {
                self.states[dependent.index()] = PackageState::Ready;
                self.queue.push(dependent);
                released.push(dependent);
            }
        }
        debug!(
            package = %graph.package(id),
            released = released.len(),
            committed = self.committed,
            "committed"
        );
        Ok(released)
    }

    pub fn is_complete(&self) -> bool {
        self.committed == self.total()
    }

    pub fn total(&self) -> usize {
        self.states.len()
    }

    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn state(&self, id: PackageId) -> PackageState {
        self.states[id.index()]
    }

    pub fn remaining(&self, id: PackageId) -> usize {
        self.remaining[id.index()]
    }

    pub fn timeline(&self) -> &[ScheduleEvent] {
        &self.timeline
    }
}

/// Thread-safe handle over a [`ReadySet`] and the graph it schedules.
#[derive(Debug)]
pub struct Scheduler {
    graph: Arc<PackageGraph>,
    state: Mutex<ReadySet>,
}

impl Scheduler {
    pub fn new(graph: Arc<PackageGraph>, order: BatchOrder) -> Self {
        let state = Mutex::new(ReadySet::new(&graph, order));
        Self { graph, state }
    }

    pub fn graph(&self) -> &Arc<PackageGraph> {
        &self.graph
    }

    pub fn next(&self) -> Result<Next, SchedulerError> {
        self.lock().next()
    }

    pub fn commit(&self, id: PackageId) -> Result<Vec<PackageId>, SchedulerError> {
        self.lock().commit(&self.graph, id)
    }

    pub fn committed(&self) -> usize {
        self.lock().committed()
    }

    pub fn timeline(&self) -> Vec<ScheduleEvent> {
        self.lock().timeline().to_vec()
    }

    // Every mutation completes before the guard drops; poisoned state is consistent.
    fn lock(&self) -> MutexGuard<'_, ReadySet> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fauxbuild_resolver::GraphBuilder;

    fn diamond() -> PackageGraph {
        GraphBuilder::new()
            .package("a", "1.0.0", &[])
            .package("b", "1.0.0", &["a"])
            .package("c", "1.0.0", &["a"])
            .package("d", "1.0.0", &["b", "c"])
            .target("d", "1.0.0", "/work/d")
            .build(&mut BatchOrder::Declared)
            .unwrap()
            .graph
    }

    fn id(g: &PackageGraph, name: &str) -> PackageId {
        g.find(name, "1.0.0").unwrap()
    }

    fn batch(next: Next) -> Vec<PackageId> {
        match next {
            Next::Batch(mut b) => {
                b.sort();
                b
            }
            Next::Done => panic!("unexpected end of work"),
        }
    }

    #[test]
    fn diamond_releases_in_waves() {
        let g = diamond();
        let (a, b, c, d) = (id(&g, "a"), id(&g, "b"), id(&g, "c"), id(&g, "d"));
        let mut set = ReadySet::new(&g, BatchOrder::shuffled(Some(5)));

        assert_eq!(set.state(d), PackageState::Pending);
        assert_eq!(batch(set.next().unwrap()), vec![a]);
        assert_eq!(set.state(a), PackageState::InProgress);
        // nothing ready while `a` is in flight
        assert_eq!(set.next().unwrap(), Next::Batch(vec![]));

        assert_eq!(set.commit(&g, a).unwrap().len(), 2);
        assert_eq!(batch(set.next().unwrap()), vec![b, c]);

        assert!(set.commit(&g, b).unwrap().is_empty());
        assert_eq!(set.remaining(d), 1);
        assert_eq!(set.commit(&g, c).unwrap(), vec![d]);
        assert_eq!(batch(set.next().unwrap()), vec![d]);
        set.commit(&g, d).unwrap();

        assert_eq!(set.next().unwrap(), Next::Done);
        assert_eq!(set.committed(), 4);
        assert_eq!(set.next().unwrap_err(), SchedulerError::NextAfterEnd);
    }

    #[test]
    fn double_commit_is_rejected() {
        let g = diamond();
        let a = id(&g, "a");
        let mut set = ReadySet::new(&g, BatchOrder::Declared);
        set.next().unwrap();
        set.commit(&g, a).unwrap();
        assert_eq!(
            set.commit(&g, a).unwrap_err(),
            SchedulerError::AlreadyCommitted {
                package: "a v1.0.0".into()
            }
        );
    }

    #[test]
    fn commit_before_dispatch_is_rejected() {
        let g = diamond();
        let mut set = ReadySet::new(&g, BatchOrder::Declared);
        assert!(matches!(
            set.commit(&g, id(&g, "a")).unwrap_err(),
            SchedulerError::NotDispatched { .. }
        ));
        assert!(matches!(
            set.commit(&g, id(&g, "d")).unwrap_err(),
            SchedulerError::NotDispatched { .. }
        ));
    }

    #[test]
    fn cyclic_snapshot_stalls() {
        use fauxbuild_core::snapshot::{GraphSnapshot, SnapshotPackage};

        let snapshot = GraphSnapshot {
            packages: vec![
                SnapshotPackage {
                    name: "x".into(),
                    version: "1.0.0".into(),
                    dependencies: vec![1],
                    required_by: vec![1],
                },
                SnapshotPackage {
                    name: "y".into(),
                    version: "1.0.0".into(),
                    dependencies: vec![0],
                    required_by: vec![0],
                },
            ],
            targets: vec![],
            paths: vec![],
        };
        let g = PackageGraph::from_snapshot(snapshot).unwrap();
        let mut set = ReadySet::new(&g, BatchOrder::Declared);
        assert_eq!(
            set.next().unwrap_err(),
            SchedulerError::Stalled {
                committed: 0,
                total: 2
            }
        );
    }

    #[test]
    fn empty_graph_is_done_immediately() {
        let g = PackageGraph::new();
        let scheduler = Scheduler::new(Arc::new(g), BatchOrder::Declared);
        assert_eq!(scheduler.next().unwrap(), Next::Done);
    }

    #[test]
    fn timeline_records_dispatch_and_commit() {
        let g = Arc::new(diamond());
        let a = id(&g, "a");
        let scheduler = Scheduler::new(Arc::clone(&g), BatchOrder::Declared);
        scheduler.next().unwrap();
        scheduler.commit(a).unwrap();
        assert_eq!(
            scheduler.timeline(),
            vec![ScheduleEvent::Dispatched(a), ScheduleEvent::Committed(a)]
        );
        assert_eq!(scheduler.committed(), 1);
    }
}
