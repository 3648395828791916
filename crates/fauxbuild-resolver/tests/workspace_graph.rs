use std::fs;

use fauxbuild_core::workspace::Workspace;
use fauxbuild_resolver::{BatchOrder, GraphBuilder, GraphError, PackageGraph};
use tempfile::TempDir;

const LOCK: &str = r#"
version = 3

[[package]]
name = "cli"
version = "0.3.0"
dependencies = [
 "core 0.3.0",
 "serde",
]

[[package]]
name = "core"
version = "0.3.0"
dependencies = [
 "serde 1.0.195 (registry+https://github.com/rust-lang/crates.io-index)",
 "testkit",
]

[[package]]
name = "serde"
version = "1.0.195"
source = "registry+https://github.com/rust-lang/crates.io-index"
checksum = "63261df402c67811e9ac6def069e4786148c4563f4b50fd4bf30aa370d626b02"

[[package]]
name = "testkit"
version = "0.1.0"
dependencies = ["core"]
"#;

fn write_project(dir: &std::path::Path) {
    fs::write(dir.join("Cargo.lock"), LOCK).unwrap();
    fs::write(
        dir.join("Cargo.toml"),
        "[workspace]\nmembers = [\"cli\", \"core\"]\n\n[workspace.package]\nversion = \"0.3.0\"\n",
    )
    .unwrap();
    for member in ["cli", "core"] {
        fs::create_dir_all(dir.join(member)).unwrap();
        fs::write(
            dir.join(member).join("Cargo.toml"),
            format!("[package]\nname = \"{member}\"\nversion.workspace = true\n"),
        )
        .unwrap();
    }
}

#[test]
fn dev_dependency_cycle_through_member_is_broken() {
    let tmp = TempDir::new().unwrap();
    write_project(tmp.path());

    let ws = Workspace::load(tmp.path()).unwrap();
    let resolved = GraphBuilder::from_workspace(&ws)
        .build(&mut BatchOrder::shuffled(Some(9)))
        .unwrap();
    let g = &resolved.graph;

    assert_eq!(g.len(), 4);
    assert_eq!(g.targets().len(), 2);
    assert!(g.is_acyclic());

    let core = g.find("core", "0.3.0").unwrap();
    let testkit = g.find("testkit", "0.1.0").unwrap();
    assert_eq!(resolved.report.broken_edges, vec![(core, testkit)]);
    assert_eq!(g.package(testkit).dependencies(), &[core]);

    let root = tmp.path().display().to_string();
    assert_eq!(g.target_path(core), Some(format!("{root}/core").as_str()));
}

#[test]
fn snapshot_file_round_trip() {
    let tmp = TempDir::new().unwrap();
    write_project(tmp.path());
    let ws = Workspace::load(tmp.path()).unwrap();
    let graph = GraphBuilder::from_workspace(&ws)
        .build(&mut BatchOrder::Declared)
        .unwrap()
        .graph;

    let path = tmp.path().join("target").join("project.fxb");
    graph.write_snapshot(&path, 6).unwrap();
    let restored = PackageGraph::read_snapshot(&path).unwrap();

    assert_eq!(restored.to_snapshot(), graph.to_snapshot());
    assert_eq!(restored.initial_ready(), graph.initial_ready());
}

#[test]
fn member_missing_from_lockfile_is_reported() {
    let tmp = TempDir::new().unwrap();
    write_project(tmp.path());
    fs::write(
        tmp.path().join("cli").join("Cargo.toml"),
        "[package]\nname = \"cli\"\nversion = \"9.0.0\"\n",
    )
    .unwrap();

    let ws = Workspace::load(tmp.path()).unwrap();
    let err = GraphBuilder::from_workspace(&ws)
        .build(&mut BatchOrder::Declared)
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownTarget { .. }));
}
