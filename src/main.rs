mod cli;

use anyhow::Result;
use clap::Parser;
use cli::runner::Runner;
use mvtokv::MvtoStore;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mvtokv")]
#[command(about = "Run transaction scripts against an in-memory MVTO key-value store")]
struct Cli {
    /// Script file; read from stdin when omitted
    script: Option<PathBuf>,

    /// JSON store configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop at the first refused operation
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Cli::parse();

    let config = cli::load_config(args.config.as_deref())?;
    let source = cli::load_script(args.script.as_deref())?;

    let store = MvtoStore::with_config(config)?;
    let mut runner = Runner::new(store, args.fail_fast);
    runner.run_script(&source, &mut io::stdout().lock())?;

    let stats = runner.store().stats();
    info!(
        committed = stats.committed,
        rollbacks = stats.rollbacks,
        active = stats.active_transactions,
        "script finished"
    );
    Ok(())
}
