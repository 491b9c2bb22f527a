//! WbMedia CLI - Command-line interface
//!
//! Resolves marketplace articles to their CDN photos and video using the
//! `wbmedia` library.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::resolve::ResolveArgs;
use commands::video::VideoArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "wbmedia", version, about = "Discover marketplace product media on the CDN")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve photos and video of an article
    Resolve(ResolveArgs),

    /// Search only the video of an article, with progress
    Video(VideoArgs),

    /// Print derived CDN coordinates and URL shapes of an article
    Coords {
        /// Article number or product link
        article: String,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = commands::common::load_config(cli.config.as_deref())?;

    // Config commands print to stdout and need no logging.
    let _log_guard = match cli.command {
        Commands::Config(_) => None,
        _ => commands::common::init_logging(&config, cli.verbose)?,
    };

    match cli.command {
        Commands::Resolve(args) => commands::resolve::run(args, &config).await,
        Commands::Video(args) => commands::video::run(args, &config).await,
        Commands::Coords { article } => commands::coords::run(&article, &config),
        Commands::Config(command) => commands::config::run(command, config),
    }
}
