use serde::{Deserialize, Serialize};
use std::path::Path;

use fauxbuild_util::errors::FauxError;

/// The parts of a `Cargo.toml` that designate build targets.
///
/// A manifest may have a `[package]` (the root package), a `[workspace]`
/// (member packages), or both. Everything else in the file is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub package: Option<PackageMetadata>,

    #[serde(default)]
    pub workspace: Option<WorkspaceConfig>,
}

/// Package identity from the `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    #[serde(default)]
    pub version: Option<ManifestVersion>,
}

/// A package version: either a literal or `version.workspace = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestVersion {
    Literal(String),
    Inherited { workspace: bool },
}

/// Workspace configuration from the `[workspace]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub package: Option<WorkspacePackage>,
}

/// Values members may inherit from `[workspace.package]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspacePackage {
    #[serde(default)]
    pub version: Option<String>,
}

/// Version Cargo assumes when `[package]` omits one.
pub const DEFAULT_PACKAGE_VERSION: &str = "0.0.0";

impl Manifest {
    /// Load and parse a `Cargo.toml` file from the given path.
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

    /// Parse manifest contents.
    pub fn parse_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Version inherited by members that declare `version.workspace = true`.
    pub fn workspace_version(&self) -> Option<&str> {
        self.workspace
            .as_ref()
            .and_then(|ws| ws.package.as_ref())
            .and_then(|p| p.version.as_deref())
    }
}

impl PackageMetadata {
    /// The concrete version of this package.
    ///
    /// `inherited` is the workspace root's `[workspace.package] version`, used
    /// when the package declares `version.workspace = true`.
    pub fn resolved_version(&self, inherited: Option<&str>) -> Result<String, String> {
        match &self.version {
            None => Ok(DEFAULT_PACKAGE_VERSION.to_string()),
            Some(ManifestVersion::Literal(v)) => Ok(v.clone()),
            Some(ManifestVersion::Inherited { workspace: true }) => inherited
                .map(str::to_string)
                .ok_or_else(|| {
                    format!(
                        "package `{}` inherits its version from the workspace, \
                         but [workspace.package] has no version",
                        self.name
                    )
                }),
            Some(ManifestVersion::Inherited { workspace: false }) => Err(format!(
                "package `{}` has `version.workspace = false`, which is not a version",
                self.name
            )),
        }
    }
}
