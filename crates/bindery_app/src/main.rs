mod app;
mod cli;
mod effects;
mod persistence;
mod render;

use anyhow::Context;
use bindery_engine::ensure_state_dir;
use bindery_logging::{level_from_verbosity, LogDestination};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let state_dir = cli
        .state_dir
        .clone()
        .unwrap_or_else(persistence::default_state_dir);

    let destination = if cli.log_file {
        ensure_state_dir(&state_dir)
            .with_context(|| format!("cannot use state directory {}", state_dir.display()))?;
        LogDestination::Both(state_dir.join("bindery.log"))
    } else {
        LogDestination::Terminal
    };
    bindery_logging::initialize(destination, level_from_verbosity(cli.verbose));

    app::run(cli, state_dir)
}
