use fauxbuild_core::config::{dirs_path, GlobalConfig};
use tempfile::TempDir;

#[test]
fn test_global_config_default_jobs_nonzero() {
    let config = GlobalConfig::default();
    assert!(config.build.jobs > 0, "jobs should be > 0");
}

#[test]
fn test_global_config_default_no_seed() {
    let config = GlobalConfig::default();
    assert!(config.build.seed.is_none());
    assert_eq!(config.build.time_scale, 1.0);
    assert_eq!(config.snapshot.compression, 6);
}

#[test]
fn test_global_config_empty_toml_uses_defaults() {
    let config: GlobalConfig = toml::from_str("").unwrap();
    assert!(config.build.jobs > 0);
    assert_eq!(config.build.time_scale, 1.0);
}

#[test]
fn test_dirs_path_contains_fauxbuild() {
    assert!(dirs_path().ends_with(".fauxbuild"));
}

#[test]
fn test_global_config_parse_from_toml() {
    let toml = r#"
[build]
jobs = 3
seed = 42
time-scale = 0.25

[snapshot]
compression = 9
"#;
    let config: GlobalConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.build.jobs, 3);
    assert_eq!(config.build.seed, Some(42));
    assert_eq!(config.build.time_scale, 0.25);
    assert_eq!(config.snapshot.compression, 9);
}

#[test]
fn test_load_from_missing_file_is_default() {
    let tmp = TempDir::new().unwrap();
    let config = GlobalConfig::load_from(&tmp.path().join("config.toml")).unwrap();
    assert!(config.build.seed.is_none());
}

#[test]
fn test_load_from_rejects_zero_jobs() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[build]\njobs = 0\n").unwrap();
    let err = GlobalConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("jobs"), "got: {err}");
}

#[test]
fn test_load_from_rejects_bad_compression() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[snapshot]\ncompression = 12\n").unwrap();
    assert!(GlobalConfig::load_from(&path).is_err());
}

#[test]
fn test_load_from_rejects_negative_time_scale() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[build]\ntime-scale = -1.0\n").unwrap();
    assert!(GlobalConfig::load_from(&path).is_err());
}

#[test]
fn test_load_from_rejects_oversized_time_scale() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[build]\ntime-scale = 1e300\n").unwrap();
    let err = GlobalConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("time-scale must be between 0 and 1000"));
}
