use std::path::{Path, PathBuf};

use fauxbuild_core::config::GlobalConfig;
use fauxbuild_ops::ops_gen::{self, GenOptions};
use fauxbuild_ops::WorkKind;
use miette::Result;

pub fn exec(dir: &Path, output: PathBuf, kind: WorkKind, seed: Option<u64>) -> Result<()> {
    let config = GlobalConfig::load()?;
    ops_gen::gen(dir, &GenOptions { output, kind, seed }, &config)?;
    Ok(())
}
