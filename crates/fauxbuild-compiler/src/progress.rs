//! Progress reporting around dispatch and commit.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use fauxbuild_resolver::{PackageGraph, PackageId};
use fauxbuild_util::progress::{building_bar, status, status_line};
use indicatif::ProgressBar;

/// What a reporter is told about a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLabel {
    pub name: String,
    pub version: String,
    /// Directory of the package when it is a build target.
    pub path: Option<String>,
}

impl TaskLabel {
    pub fn for_package(graph: &PackageGraph, id: PackageId) -> Self {
        let package = graph.package(id);
        Self {
            name: package.name().to_string(),
            version: package.version().to_string(),
            path: graph.target_path(id).map(str::to_string),
        }
    }
}

impl fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)?;
        if let Some(path) = &self.path {
            write!(f, " ({path})")?;
        }
        Ok(())
    }
}

/// Observer of a build run. Called synchronously from the worker pool.
pub trait ProgressReporter: Send + Sync {
    fn announce_total(&self, total: usize);
    fn on_start(&self, task: &TaskLabel);
    fn on_complete(&self, task: &TaskLabel);
    fn prologue(&self) {}
    fn epilogue(&self) {}
}

/// Reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn announce_total(&self, _total: usize) {}
    fn on_start(&self, _task: &TaskLabel) {}
    fn on_complete(&self, _task: &TaskLabel) {}
}

/// Output shaped like `cargo build --release`.
///
/// ```text
///    Compiling serde v1.0.195
///    Compiling app v0.1.0 (/work/app)
///     Building [=====>                     ] 12/40: tokio, syn
///     Finished `release` profile [optimized] target(s) in 3.21s
/// ```
pub struct CargoProgress {
    bar: ProgressBar,
    state: Mutex<BarState>,
}

#[derive(Default)]
struct BarState {
    started: Option<Instant>,
    /// Names of packages currently compiling, in start order.
    ongoing: Vec<String>,
}

impl CargoProgress {
    pub fn new() -> Self {
        Self {
            bar: building_bar(0),
            state: Mutex::new(BarState::default()),
        }
    }

    fn print(&self, label: &str, message: &str) {
        if self.bar.is_hidden() {
            status(label, message);
        } else {
            self.bar.println(status_line(label, message));
        }
    }

    fn refresh(&self, state: &BarState) {
        self.bar.set_message(state.ongoing.join(", "));
    }
}

impl Default for CargoProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CargoProgress {
    fn announce_total(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_start(&self, task: &TaskLabel) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.ongoing.push(task.name.clone());
        self.print("Compiling", &task.to_string());
        self.bar.inc(1);
        self.refresh(&state);
    }

    fn on_complete(&self, task: &TaskLabel) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = state.ongoing.iter().position(|n| *n == task.name) {
            state.ongoing.remove(pos);
        }
        self.refresh(&state);
    }

    fn prologue(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.started = Some(Instant::now());
    }

    fn epilogue(&self) {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let elapsed = state
            .started
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or_default();
        self.bar.finish_and_clear();
        status(
            "Finished",
            &format!("`release` profile [optimized] target(s) in {elapsed:.2}s"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_target_path() {
        let plain = TaskLabel {
            name: "serde".into(),
            version: "1.0.195".into(),
            path: None,
        };
        assert_eq!(plain.to_string(), "serde v1.0.195");

        let target = TaskLabel {
            path: Some("/work/app".into()),
            ..plain
        };
        assert_eq!(target.to_string(), "serde v1.0.195 (/work/app)");
    }

    #[test]
    fn ongoing_list_tracks_start_and_complete() {
        let progress = CargoProgress::new();
        progress.announce_total(2);
        let a = TaskLabel {
            name: "a".into(),
            version: "1.0.0".into(),
            path: None,
        };
        let b = TaskLabel {
            name: "b".into(),
            ..a.clone()
        };
        progress.on_start(&a);
        progress.on_start(&b);
        progress.on_complete(&a);
        let state = progress.state.lock().unwrap();
        assert_eq!(state.ongoing, vec!["b".to_string()]);
        assert_eq!(progress.bar.position(), 2);
    }
}
