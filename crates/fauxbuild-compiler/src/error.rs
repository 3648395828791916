use miette::Diagnostic;
use thiserror::Error;

/// Contract violations in the ready-set scheduler.
///
/// None of these occur in a correct run; they surface bugs or a graph
/// that was never resolved (e.g. a hand-edited snapshot).
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("`{package}` was committed twice")]
    AlreadyCommitted { package: String },

    #[error("`{package}` was committed before it was dispatched")]
    NotDispatched { package: String },

    #[error("next() called after the scheduler reported end of work")]
    NextAfterEnd,

    #[error("scheduler stalled with {committed} of {total} packages committed and nothing in flight")]
    #[diagnostic(help("The package graph contains a cycle; snapshots are not re-validated on load"))]
    Stalled { committed: usize, total: usize },

    #[error("worker count must be at least 1, got {jobs}")]
    InvalidJobs { jobs: usize },
}

/// Failures of a simulated build run.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("worker pool shut down unexpectedly: {message}")]
    Pool { message: String },
}
