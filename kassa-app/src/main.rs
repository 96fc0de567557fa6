use anyhow::Result;
use clap::Parser;
use kassa_common::observability::{init_logging, LogConfig};
use kassa_config::{KassaConfig, KassaConfigLoader};
use std::path::PathBuf;
use tether::{build_from_config, Tether};
mod feeders;
mod tether;

/// Headless checkout-form runtime: reads JSON events on stdin, prints
/// state snapshots on stdout.
#[derive(Parser)]
struct Args {
    /// Configuration file (YAML); `KASSA_`-prefixed env vars override it.
    #[arg(long, default_value = "kassa.yaml")]
    config: PathBuf,

    /// Also emit log events to stderr.
    #[arg(long)]
    log_stderr: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1) Load config (env wins)
    let cfg: KassaConfig = KassaConfigLoader::new().with_file(&args.config).load()?;

    init_logging(LogConfig {
        emit_stderr: args.log_stderr,
        ..LogConfig::default()
    })?;

    let mut tether = Tether::new();
    build_from_config(&mut tether, cfg).await?;

    tether.run().await
}
