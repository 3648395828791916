use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use fauxbuild_util::errors::FauxError;

/// Global user configuration loaded from `~/.fauxbuild/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Build settings from `[build]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Number of concurrent simulated compilers.
    #[serde(default = "default_jobs")]
    pub jobs: u32,
    /// Fixed seed for every random choice; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Multiplier applied to every simulated duration.
    #[serde(default = "default_time_scale", rename = "time-scale")]
    pub time_scale: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            seed: None,
            time_scale: default_time_scale(),
        }
    }
}

fn default_jobs() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(4)
}

fn default_time_scale() -> f64 {
    1.0
}

/// Largest accepted `time-scale`.
pub const MAX_TIME_SCALE: f64 = 1000.0;

/// Snapshot settings from `[snapshot]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// gzip level, 0-9.
    #[serde(default = "default_compression")]
    pub compression: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            compression: default_compression(),
        }
    }
}

fn default_compression() -> u32 {
    6
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| FauxError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| FauxError::Config {
            message: format!("Failed to parse {}: {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), FauxError> {
        if self.build.jobs == 0 {
            return Err(FauxError::Config {
                message: "[build] jobs must be at least 1".to_string(),
            });
        }
        if !(0.0..=MAX_TIME_SCALE).contains(&self.build.time_scale) {
            return Err(FauxError::Config {
                message: format!(
                    "[build] time-scale must be between 0 and {MAX_TIME_SCALE}, got {}",
                    self.build.time_scale
                ),
            });
        }
        if self.snapshot.compression > 9 {
            return Err(FauxError::Config {
                message: format!(
                    "[snapshot] compression must be between 0 and 9, got {}",
                    self.snapshot.compression
                ),
            });
        }
        Ok(())
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the fauxbuild data directory (`~/.fauxbuild/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".fauxbuild")
}
