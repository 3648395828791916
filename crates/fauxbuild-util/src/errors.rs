use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for fauxbuild operations.
///
/// Subsystems with a richer taxonomy (graph construction, snapshot decoding,
/// scheduling) define their own enums; this type covers everything the
/// operation layer reports directly.
#[derive(Debug, Error, Diagnostic)]
pub enum FauxError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable `Cargo.toml` / `Cargo.lock`.
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check Cargo.toml and Cargo.lock in the project directory"))]
    Manifest { message: String },

    /// Global configuration could not be read or parsed.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.fauxbuild/config.toml for syntax errors"))]
    Config { message: String },

    /// A snapshot file could not be written or read.
    #[error("Snapshot error: {message}")]
    Snapshot { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type FauxResult<T> = miette::Result<T>;
