//! Command dispatch and handler modules.

mod gen;
mod run;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            dir,
            snapshot,
            threads,
            compiler,
            seed,
            time_scale,
            quiet,
        } => {
            let opts = fauxbuild_ops::ops_run::RunOptions {
                kind: compiler.into(),
                jobs: threads,
                seed,
                time_scale,
                quiet,
            };
            run::exec(dir, snapshot, &opts).await
        }
        Command::Gen {
            dir,
            output,
            compiler,
            seed,
        } => gen::exec(&dir, output, compiler.into(), seed),
    }
}
