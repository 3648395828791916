//! Shared utilities for fauxbuild.
//!
//! This crate provides cross-cutting concerns used by all other fauxbuild
//! crates: the unified error type, filesystem helpers, hashing, and terminal
//! status lines and progress bars.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
