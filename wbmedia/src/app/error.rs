//! Application error types.

use std::fmt;

use crate::cdn::HttpError;
use crate::config::ConfigError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// The HTTP client could not be built.
    HttpClient(HttpError),

    /// The configuration file could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::HttpClient(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

impl From<HttpError> for AppError {
    fn from(e: HttpError) -> Self {
        AppError::HttpClient(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(ConfigError::UnknownKey("video.speed".to_string()));
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("video.speed"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_app_error_from_http_error() {
        let app_err: AppError = HttpError::ClientBuild("no tls".to_string()).into();
        assert!(matches!(app_err, AppError::HttpClient(_)));
    }
}
