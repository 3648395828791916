use std::path::{Path, PathBuf};

use fauxbuild_util::errors::FauxError;
use tracing::debug;

use crate::lockfile::Lockfile;
use crate::manifest::Manifest;

/// A package the user asked to build, as opposed to one pulled in as a dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDecl {
    pub name: String,
    pub version: String,
    /// Directory of the target's `Cargo.toml`, absolute, no trailing slash.
    pub path: String,
}

/// A Cargo project directory: its lockfile plus the targets its manifests designate.
///
/// `Cargo.toml` at the root may describe:
/// - a root package alone,
/// - a root package plus workspace members,
/// - workspace members alone (a virtual manifest).
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root_dir: PathBuf,
    pub lockfile: Lockfile,
    pub targets: Vec<TargetDecl>,
}

impl Workspace {
    /// Read `Cargo.lock`, the root `Cargo.toml` and every member `Cargo.toml`.
    pub fn load(dir: &Path) -> miette::Result<Self> {
        let root_dir = fauxbuild_util::fs::absolute(dir).map_err(FauxError::Io)?;
        let lockfile = Lockfile::from_path(&root_dir.join("Cargo.lock"))?;
        let manifest = Manifest::from_path(&root_dir.join("Cargo.toml"))?;
        let inherited = manifest.workspace_version();

        let mut targets = Vec::new();

        if let Some(pkg) = &manifest.package {
            let version = pkg
                .resolved_version(inherited)
                .map_err(|message| FauxError::Manifest { message })?;
            targets.push(TargetDecl {
                name: pkg.name.clone(),
                version,
                path: root_dir.display().to_string(),
            });
        }

        let members = manifest
            .workspace
            .as_ref()
            .map(|ws| ws.members.as_slice())
            .unwrap_or_default();
        for member in members {
            let member_dir = root_dir.join(member);
            let member_manifest = Manifest::from_path(&member_dir.join("Cargo.toml"))?;
            // Nested workspaces are not supported: a member must be a package.
            let Some(pkg) = member_manifest.package else {
                return Err(FauxError::Manifest {
                    message: format!(
                        "workspace member `{member}` has a Cargo.toml without a [package] section"
                    ),
                }
                .into());
            };
            let version = pkg
                .resolved_version(inherited)
                .map_err(|message| FauxError::Manifest { message })?;
            targets.push(TargetDecl {
                name: pkg.name,
                version,
                path: member_dir.display().to_string(),
            });
        }

        debug!(
            root = %root_dir.display(),
            packages = lockfile.package.len(),
            targets = targets.len(),
            "loaded workspace"
        );

        Ok(Self {
            root_dir,
            lockfile,
            targets,
        })
    }

    /// Returns `true` if the root manifest has no package of its own.
    pub fn is_virtual(&self) -> bool {
        let root = self.root_dir.display().to_string();
        !self.targets.iter().any(|t| t.path == root)
    }
}
