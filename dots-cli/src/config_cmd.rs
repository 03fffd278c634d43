//! Config command - write an engine configuration file

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::engine_args::EngineArgs;

#[derive(Args)]
pub struct ConfigArgs {
    /// Output JSON file
    #[arg(long, short, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Resolve the configuration exactly as `play` would and save it.
pub fn run(args: ConfigArgs, seed: Option<u64>) -> Result<()> {
    let config = args.engine.resolve(seed)?;
    config.save(&args.output)?;

    tracing::info!("Wrote engine config to {}", args.output.display());
    Ok(())
}
