use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cardscan", version, about = "Identify collectible cards from photographs and look up their prices")]
pub struct Cli {
    /// Configuration file; replaces the one in the platform config directory.
    #[arg(long, global = true, env = "CARDSCAN_CONFIG")]
    pub config: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Identify the card in a photograph and show its prices.
    Scan {
        image: PathBuf,
        /// Print only the result, without progress.
        #[arg(long, short)]
        quiet: bool,
    },
    /// Resolve a card name from recognised text, without any lookups.
    Resolve {
        /// Text file to read; standard input when omitted.
        file: Option<PathBuf>,
    },
    /// Search the catalog by card name.
    Search {
        term: String,
        /// Maximum number of results; defaults to the configured limit.
        #[arg(long, short)]
        limit: Option<u32>,
    },
    /// Manage the offline cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Download every manifest resource into a new generation and activate it.
    Install(InstallArgs),
    /// Show the cache lifecycle and the generations on disk.
    Status,
    /// Fetch a URL through the offline cache.
    Fetch {
        url: String,
    },
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Generation version to install; defaults to the configured version.
    #[arg(long)]
    pub version: Option<u32>,
}
