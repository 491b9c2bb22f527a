//! Common utilities shared across CLI commands.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use wbmedia::app::{AppConfig, MediaApp};
use wbmedia::config::ConfigFile;
use wbmedia::logging::{self, WorkerGuard};
use wbmedia::{extract_article, ProductId};

use crate::error::CliError;

/// Load the configuration file from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Install the tracing subscriber. `--verbose` forces debug output.
pub fn init_logging(config: &ConfigFile, verbose: bool) -> Result<Option<WorkerGuard>, CliError> {
    let mut logging = config.logging.clone();
    if verbose {
        logging = logging.with_level("debug");
    }
    logging::init_logging(&logging).map_err(CliError::Logging)
}

/// Parse a bare article or a product link.
pub fn parse_article(input: &str) -> Result<ProductId, CliError> {
    Ok(extract_article(input)?)
}

/// Start the application along with the token of the command's request,
/// which Ctrl-C cancels.
pub async fn start_app(config: &ConfigFile) -> Result<(MediaApp, CancellationToken), CliError> {
    let app = MediaApp::start(AppConfig::from_config_file(config)).await?;
    let request = app.request_token();

    let cancel = request.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Interrupted, cancelling search...");
        cancel.cancel();
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }
    debug!("Application started");

    Ok((app, request))
}
