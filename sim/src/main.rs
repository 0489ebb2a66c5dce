mod cli;
mod movement;
mod resultlog;
mod tick;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(cli::Cli::parse().into_config());

    if let Err(e) = tick::run(config) {
        tracing::error!(error = %e, "run aborted");
        std::process::exit(e.exit_code());
    }
}
