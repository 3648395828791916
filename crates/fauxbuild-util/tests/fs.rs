use fauxbuild_util::fs::{absolute, ensure_parent};
use tempfile::TempDir;

#[test]
fn test_absolute_keeps_absolute_paths() {
    let tmp = TempDir::new().unwrap();
    let abs = absolute(tmp.path()).unwrap();
    assert!(abs.is_absolute());
    assert_eq!(abs, tmp.path());
}

#[test]
fn test_absolute_joins_relative_onto_cwd() {
    let abs = absolute(std::path::Path::new("some/project")).unwrap();
    assert!(abs.is_absolute());
    assert!(abs.ends_with("some/project"));
    assert!(!abs.to_string_lossy().ends_with('/'));
}

#[test]
fn test_ensure_parent_creates_nested() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("x").join("y").join("graph.fxb");
    ensure_parent(&file).unwrap();
    assert!(tmp.path().join("x").join("y").is_dir());
    assert!(!file.exists());
}

#[test]
fn test_ensure_parent_idempotent() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("graph.fxb");
    ensure_parent(&file).unwrap();
    ensure_parent(&file).unwrap();
    assert!(tmp.path().is_dir());
}

#[test]
fn test_ensure_parent_bare_file_name() {
    ensure_parent(std::path::Path::new("graph.fxb")).unwrap();
}
