use fauxbuild_core::workspace::{TargetDecl, Workspace};
use std::fs;
use tempfile::TempDir;

const LOCK: &str = r#"
version = 3

[[package]]
name = "app"
version = "0.1.0"
dependencies = ["shared"]

[[package]]
name = "shared"
version = "0.2.0"
"#;

#[test]
fn single_package_is_its_own_target() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Cargo.lock"), LOCK).unwrap();
    fs::write(
        tmp.path().join("Cargo.toml"),
        "[package]\nname = \"app\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();

    let ws = Workspace::load(tmp.path()).unwrap();
    assert_eq!(ws.lockfile.package.len(), 2);
    assert_eq!(
        ws.targets,
        vec![TargetDecl {
            name: "app".into(),
            version: "0.1.0".into(),
            path: tmp.path().display().to_string(),
        }]
    );
    assert!(!ws.is_virtual());
}

#[test]
fn workspace_members_become_targets() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Cargo.lock"), LOCK).unwrap();
    fs::write(
        tmp.path().join("Cargo.toml"),
        "[workspace]\nmembers = [\"app\", \"shared\"]\n\n[workspace.package]\nversion = \"0.2.0\"\n",
    )
    .unwrap();
    fs::create_dir_all(tmp.path().join("app")).unwrap();
    fs::create_dir_all(tmp.path().join("shared")).unwrap();
    fs::write(
        tmp.path().join("app/Cargo.toml"),
        "[package]\nname = \"app\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join("shared/Cargo.toml"),
        "[package]\nname = \"shared\"\nversion.workspace = true\n",
    )
    .unwrap();

    let ws = Workspace::load(tmp.path()).unwrap();
    assert!(ws.is_virtual());
    assert_eq!(ws.targets.len(), 2);
    assert_eq!(ws.targets[0].name, "app");
    assert_eq!(ws.targets[1].name, "shared");
    assert_eq!(ws.targets[1].version, "0.2.0");
    assert!(ws.targets[1].path.ends_with("shared"));
}

#[test]
fn member_without_package_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Cargo.lock"), LOCK).unwrap();
    fs::write(
        tmp.path().join("Cargo.toml"),
        "[workspace]\nmembers = [\"nested\"]\n",
    )
    .unwrap();
    fs::create_dir_all(tmp.path().join("nested")).unwrap();
    fs::write(
        tmp.path().join("nested/Cargo.toml"),
        "[workspace]\nmembers = []\n",
    )
    .unwrap();

    let err = Workspace::load(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("without a [package]"), "got: {err}");
}

#[test]
fn missing_lockfile_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("Cargo.toml"),
        "[package]\nname = \"app\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();
    assert!(Workspace::load(tmp.path()).is_err());
}
