//! CLI error type.

use std::fmt;

use wbmedia::app::AppError;
use wbmedia::config::ConfigError;
use wbmedia::logging::LoggingError;
use wbmedia::{ArticleError, MediaError};

/// Errors surfaced to the user by the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, parsed or saved.
    Config(String),

    /// The argument is neither an article nor a product link.
    Article(ArticleError),

    /// Logging could not be initialised.
    Logging(LoggingError),

    /// The application failed to start.
    Startup(AppError),

    /// Media discovery failed.
    Media(MediaError),

    /// The user interrupted the search.
    Cancelled,

    /// Output could not be rendered.
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Article(e) => write!(f, "Invalid article: {}", e),
            CliError::Logging(e) => write!(f, "Failed to initialise logging: {}", e),
            CliError::Startup(e) => write!(f, "{}", e),
            CliError::Media(e) => write!(f, "Media discovery failed: {}", e),
            CliError::Cancelled => write!(f, "Interrupted"),
            CliError::Output(msg) => write!(f, "Failed to render output: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Article(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Startup(e) => Some(e),
            CliError::Media(e) => Some(e),
            CliError::Config(_) | CliError::Cancelled | CliError::Output(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ArticleError> for CliError {
    fn from(e: ArticleError) -> Self {
        CliError::Article(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::Startup(e)
    }
}

impl From<MediaError> for CliError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::Cancelled => CliError::Cancelled,
            e => CliError::Media(e),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = CliError::from(ArticleError::Empty);
        assert_eq!(err.to_string(), "Invalid article: article is empty");

        let err = CliError::from(MediaError::Transport("dns".into()));
        assert!(err.to_string().starts_with("Media discovery failed"));
    }

    #[test]
    fn test_cancelled_search_is_an_interrupt() {
        let err = CliError::from(MediaError::Cancelled);
        assert!(matches!(err, CliError::Cancelled));
        assert_eq!(err.to_string(), "Interrupted");
    }

    #[test]
    fn test_config_error_conversion() {
        let err = CliError::from(ConfigError::UnknownKey("x.y".into()));
        assert!(matches!(err, CliError::Config(_)));
    }
}
