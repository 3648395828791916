use std::path::{Path, PathBuf};

/// Absolute form of `path`, joined onto the current directory when relative.
///
/// The result never carries a trailing separator (except for the filesystem
/// root), which is the form recorded for target package paths.
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    Ok(std::path::absolute(path)?.components().collect())
}

/// Ensure the parent directory of `path` exists, creating it if needed.
pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}
