use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use fauxbuild_util::errors::FauxError;

/// The package list recorded in a `Cargo.lock` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lockfile {
    /// Lockfile format version (`version = 3` / `4`), absent in old lockfiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default)]
    pub package: Vec<LockedPackage>,
}

/// A single `[[package]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Dependency references: `"name"` or `"name version"`, optionally
    /// followed by a parenthesised source that is ignored here.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A parsed dependency reference from a lockfile `dependencies` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyRef<'a> {
    /// Only a name; valid when exactly one version of it is locked.
    Bare(&'a str),
    /// A name with an exact version.
    Versioned { name: &'a str, version: &'a str },
}

impl<'a> DependencyRef<'a> {
    /// Parse `"name"`, `"name version"` or `"name version (source)"`.
    pub fn parse(raw: &'a str) -> Self {
        let mut parts = raw.split_whitespace();
        let name = parts.next().unwrap_or("");
        match parts.next() {
            Some(version) => DependencyRef::Versioned { name, version },
            None => DependencyRef::Bare(name),
        }
    }
}

impl fmt::Display for DependencyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyRef::Bare(name) => write!(f, "{name}"),
            DependencyRef::Versioned { name, version } => write!(f, "{name} {version}"),
        }
    }
}

impl LockedPackage {
    /// Iterate over this package's dependency references.
    pub fn dependency_refs(&self) -> impl Iterator<Item = DependencyRef<'_>> {
        self.dependencies.iter().map(|d| DependencyRef::parse(d))
    }
}

impl Lockfile {
    /// Load and parse a `Cargo.lock` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FauxError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content).map_err(|e| {
            FauxError::Manifest {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Parse lockfile contents.
    pub fn parse_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
