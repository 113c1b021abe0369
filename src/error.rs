//! Error types for content fetching and projection

use thiserror::Error;

/// Errors raised while talking to the content source or shaping its documents
#[derive(Error, Debug)]
pub enum BlogError {
    /// Transport error or non-success response from the content source
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// `load_next` was called on a listing with no cursor left
    #[error("No more pages to load")]
    NoMorePages,

    /// A document did not match the expected post shape
    #[error("Invalid document {uid}: {message}")]
    InvalidDocument { uid: String, message: String },

    /// A cursor that was not issued by the configured content source
    #[error("Cursor does not belong to the content source: {0}")]
    ForeignCursor(String),

    /// No post exists with the requested uid
    #[error("Post not found: {0}")]
    NotFound(String),
}

impl BlogError {
    pub(crate) fn invalid(uid: &str, message: impl Into<String>) -> Self {
        BlogError::InvalidDocument {
            uid: uid.to_string(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for BlogError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => BlogError::FetchFailed(format!("{} ({})", status, err)),
            None => BlogError::FetchFailed(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for BlogError {
    fn from(err: serde_json::Error) -> Self {
        BlogError::FetchFailed(format!("Malformed response body: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
