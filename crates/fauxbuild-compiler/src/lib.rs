//! Simulated compilation of a resolved package graph.
//!
//! The [`scheduler`] tracks which packages are ready, the [`job_queue`]
//! runs them on a pool of tokio tasks, [`timings`] decides how long each
//! one takes and [`progress`] reports what is happening.

pub mod error;
pub mod job_queue;
pub mod progress;
pub mod scheduler;
pub mod timings;

pub use error::{BuildError, SchedulerError};
pub use job_queue::{BuildSummary, JobQueue};
pub use progress::{CargoProgress, ProgressReporter, SilentProgress, TaskLabel};
pub use scheduler::{Next, PackageState, ReadySet, ScheduleEvent, Scheduler};
pub use timings::{CargoTimings, DurationModel, FixedDuration};
