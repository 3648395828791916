use miette::Diagnostic;
use thiserror::Error;

/// Reasons a package list cannot become a buildable graph.
///
/// All of these are metadata errors: the build never starts.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum GraphError {
    #[error("malformed metadata: package `{package}` is listed more than once")]
    DuplicatePackage { package: String },

    #[error("malformed metadata: `{package}` depends on `{reference}`, which is not in the package list")]
    UnresolvedReference { package: String, reference: String },

    #[error("malformed metadata: `{package}` depends on `{name} {version}`, but that version of `{name}` is not locked")]
    UnknownVersion {
        package: String,
        name: String,
        version: String,
    },

    #[error(
        "malformed metadata: `{package}` depends on `{name}` without a version, but several are locked: {}",
        .candidates.join(", ")
    )]
    #[diagnostic(help("Lockfiles name a version whenever more than one is present; regenerate Cargo.lock"))]
    AmbiguousReference {
        package: String,
        name: String,
        candidates: Vec<String>,
    },

    #[error("malformed metadata: `{package}` lists dependency `{dependency}` twice")]
    DuplicateDependency { package: String, dependency: String },

    #[error("malformed metadata: target `{target}` {reason}")]
    UnknownTarget { target: String, reason: String },

    #[error("malformed metadata: `{package}` depends on itself")]
    #[diagnostic(help("Only workspace packages may carry a self-dependency (e.g. through dev-dependencies)"))]
    SelfDependency { package: String },

    #[error("malformed metadata: dependency cycle among {}", .members.join(", "))]
    #[diagnostic(help(
        "A cycle can only be broken when it passes through a workspace package; \
         none of these packages is one"
    ))]
    Cycle { members: Vec<String> },
}
