//! Core data types for fauxbuild.
//!
//! This crate defines the plain data a simulated build starts from: the
//! `Cargo.lock` package list, the `Cargo.toml` manifest and the workspace
//! targets it designates, the global configuration, and the on-disk snapshot
//! container.
//!
//! This crate is intentionally free of async code and graph logic.

/// Discriminator written into snapshots of Cargo package graphs.
pub const CARGO_KIND: &str = "cargo";

pub mod config;
pub mod lockfile;
pub mod manifest;
pub mod snapshot;
pub mod workspace;
