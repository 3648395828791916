//! How long a simulated compilation takes.

use std::f64::consts::{E, PI};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use fauxbuild_resolver::{Package, PackageGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pluggable duration model consulted by the worker pool.
pub trait DurationModel: Send + Sync {
    /// Time spent "compiling" `package`. Called once per dispatch.
    fn duration(&self, package: &Package) -> Duration;

    /// Pause between consecutive dispatches.
    fn dispatch_gap(&self) -> Duration {
        Duration::ZERO
    }
}

/// Every package takes the same time; no pause between dispatches.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDuration(pub Duration);

impl DurationModel for FixedDuration {
    fn duration(&self, _package: &Package) -> Duration {
        self.0
    }
}

/// Crate-sized timings resembling a real `cargo build --release`.
///
/// A crate's size is drawn around the crates.io mean (~102 KiB) and turned
/// into seconds, then scaled by a bell-shaped overhead over its dependency
/// count: crates with about as many dependencies as the heaviest crate in the
/// graph take longest.
#[derive(Debug)]
pub struct CargoTimings {
    rng: Mutex<StdRng>,
    /// Largest dependency count in the graph.
    peak: f64,
    height: f64,
    falloff: f64,
    scale: f64,
}

impl CargoTimings {
    pub fn new(graph: &PackageGraph, seed: Option<u64>, scale: f64) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let peak = graph.max_dependency_count() as f64;
        let height = rng.gen_range(E * E..PI * PI) * (1.0 - (-0.5 * (peak + 1.0)).exp());
        let low = rng.gen_range(E.sqrt()..PI.sqrt());
        let falloff = (height / low).ln();
        Self {
            rng: Mutex::new(rng),
            peak,
            height,
            falloff,
            scale,
        }
    }

    fn overhead(&self, dependencies: usize) -> f64 {
        if self.peak == 0.0 {
            return self.height;
        }
        let d = dependencies as f64 - self.peak;
        self.height * (-self.falloff * d * d / (self.peak * self.peak)).exp()
    }

    /// Saturates at [`Duration::MAX`] instead of overflowing.
    fn scaled(&self, seconds: f64) -> Duration {
        Duration::try_from_secs_f64((seconds * self.scale).max(0.0)).unwrap_or(Duration::MAX)
    }
}

impl DurationModel for CargoTimings {
    fn duration(&self, package: &Package) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let size = normal(&mut *rng, 102.0, 42.0).max(1.0);
        let seconds = normal(&mut *rng, size / 420.0, 0.1).max(0.05);
        drop(rng);
        self.scaled(seconds * self.overhead(package.remaining_dependency_count()))
    }

    fn dispatch_gap(&self) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let millis = normal(&mut *rng, 50.0, 10.0).max(30.0);
        self.scaled(millis / 1000.0)
    }
}

/// Box–Muller sample from N(mean, std_dev²).
fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}
