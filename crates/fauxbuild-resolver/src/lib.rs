//! Package graph construction and resolution.
//!
//! Turns a lockfile-style package list into a validated, acyclic
//! [`graph::PackageGraph`]: dependency references are resolved to arena
//! indices, self-loops and strongly connected components are detected, and
//! cycles anchored at a workspace target are broken by deleting the target's
//! back-edges. The resolved graph can be dumped to and restored from an
//! index-based snapshot.

pub mod builder;
pub mod cycle;
pub mod error;
pub mod graph;
pub mod order;
pub mod snapshot;

pub use builder::{GraphBuilder, PackageRecord, ResolvedGraph};
pub use cycle::ResolutionReport;
pub use error::GraphError;
pub use graph::{Package, PackageGraph, PackageId, Target};
pub use order::BatchOrder;
