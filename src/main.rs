//! `cardscan` command-line interface.

mod app;
mod cli;
mod error;

use crate::app::App;
use crate::cli::{CacheCommand, Cli, Command};
use crate::error::{ErrorKind, Result};
use cardscan_config::Config;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).map_err(ErrorKind::config)?;
    let app = App::new(config).await?;
    match cli.command {
        Command::Scan { image, quiet } => app.scan(&image, quiet).await,
        Command::Resolve { file } => app.resolve(file.as_deref()).await,
        Command::Search { term, limit } => app.search(&term, limit).await,
        Command::Cache(CacheCommand::Install(args)) => app.install(args.version).await,
        Command::Cache(CacheCommand::Status) => app.status().await,
        Command::Cache(CacheCommand::Fetch { url }) => app.fetch(&url).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("error: {}", *err);
            ExitCode::FAILURE
        },
    }
}
