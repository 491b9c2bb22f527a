//! Engine error type.
//!
//! Only bad input, an unreachable CDN and caller cancellation surface as
//! errors. An absent shard, a missing video or a passed deadline is a
//! normal outcome expressed in the return type.

use thiserror::Error;

use crate::article::ArticleError;
use crate::cdn::HttpError;

/// Errors returned by media discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The caller supplied an unusable request.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The CDN could not be reached at all.
    #[error("CDN unreachable: {0}")]
    Transport(String),

    /// The caller cancelled the request before it concluded.
    #[error("search cancelled")]
    Cancelled,
}

impl From<ArticleError> for MediaError {
    fn from(err: ArticleError) -> Self {
        MediaError::InvalidInput(err.to_string())
    }
}

impl From<HttpError> for MediaError {
    fn from(err: HttpError) -> Self {
        MediaError::Transport(err.to_string())
    }
}
