use std::path::PathBuf;

use fauxbuild_core::config::GlobalConfig;
use fauxbuild_ops::ops_run::{self, RunOptions};
use fauxbuild_ops::GraphSource;
use fauxbuild_util::errors::FauxError;
use miette::Result;

pub async fn exec(dir: Option<PathBuf>, snapshot: Option<PathBuf>, opts: &RunOptions) -> Result<()> {
    let source = match (dir, snapshot) {
        (Some(dir), None) => GraphSource::Directory(dir),
        (None, Some(path)) => GraphSource::Snapshot(path),
        _ => {
            return Err(FauxError::Generic {
                message: "pass exactly one of --dir or --config".to_string(),
            }
            .into())
        }
    };
    let config = GlobalConfig::load()?;
    ops_run::run(&source, opts, &config).await?;
    Ok(())
}
