//! CLI argument definitions for fauxbuild.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fauxbuild_ops::WorkKind;

#[derive(Parser, Debug)]
#[command(
    name = "fauxbuild",
    version,
    about = "Pretend to build a Cargo project",
    long_about = "fauxbuild reads a project's Cargo.lock and Cargo.toml, resolves the package \
                  graph and plays back a parallel `cargo build --release` without compiling \
                  anything. Resolved graphs can be saved as snapshots and replayed later."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate a build of a project directory or snapshot
    Run {
        /// Project directory containing Cargo.toml and Cargo.lock
        #[arg(short = 'd', long = "dir", conflicts_with = "snapshot", required_unless_present = "snapshot")]
        dir: Option<PathBuf>,
        /// Snapshot file written by `fauxbuild gen`
        #[arg(short = 'c', long = "config")]
        snapshot: Option<PathBuf>,
        /// Number of concurrent compilers
        #[arg(short = 't', long = "threads")]
        threads: Option<usize>,
        /// Kind of build to simulate
        #[arg(short = 'C', long = "compiler", value_enum, default_value_t = CompilerType::Cargo)]
        compiler: CompilerType,
        /// Seed for every random choice
        #[arg(long)]
        seed: Option<u64>,
        /// Multiplier for simulated durations (0 finishes instantly)
        #[arg(long)]
        time_scale: Option<f64>,
        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resolve a project directory and save its graph as a snapshot
    Gen {
        /// Project directory containing Cargo.toml and Cargo.lock
        #[arg(short = 'd', long = "dir")]
        dir: PathBuf,
        /// Output snapshot path
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
        /// Kind of build the snapshot is for
        #[arg(short = 'C', long = "compiler", value_enum, default_value_t = CompilerType::Cargo)]
        compiler: CompilerType,
        /// Seed for the stored package order
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompilerType {
    Cargo,
}

impl From<CompilerType> for WorkKind {
    fn from(value: CompilerType) -> Self {
        match value {
            CompilerType::Cargo => WorkKind::Cargo,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
