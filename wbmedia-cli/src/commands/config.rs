//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show`, `config init`, `config get` and
//! `config set`.

use clap::Subcommand;
use wbmedia::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective configuration as INI
    Show,

    /// Write a configuration file populated with the current values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., shards.hot_zone)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., shards.hot_zone)
        key: String,

        /// Value to set
        value: String,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config: ConfigFile) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(&config),
        ConfigCommands::Show => run_show(&config),
        ConfigCommands::Init { force } => run_init(&config, force),
        ConfigCommands::Get { key } => run_get(&config, &key),
        ConfigCommands::Set { key, value } => run_set(config, &key, &value),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'wbmedia config show' to see available keys.",
            key
        ))
    })
}

fn run_path(config: &ConfigFile) -> Result<(), CliError> {
    let path = config.path().map(|p| p.to_path_buf()).unwrap_or_else(config_file_path);
    println!("{}", path.display());
    Ok(())
}

fn run_show(config: &ConfigFile) -> Result<(), CliError> {
    print!("{}", config.to_ini_string());
    Ok(())
}

fn run_init(config: &ConfigFile, force: bool) -> Result<(), CliError> {
    let path = config.path().map(|p| p.to_path_buf()).unwrap_or_else(config_file_path);
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    config.save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_get(config: &ConfigFile, key: &str) -> Result<(), CliError> {
    let value = parse_key(key)?.get(config);
    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(mut config: ConfigFile, key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    config_key.set(&mut config, value)?;
    config.save()?;
    println!("Set {} = {}", config_key, value);
    Ok(())
}
