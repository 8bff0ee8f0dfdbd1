//! Error types for lintgate-github

use lintgate_core::{SourceError, StoreError};
use thiserror::Error;

/// Errors that can occur while talking to the GitHub API
#[derive(Error, Debug)]
pub enum GithubError {
    /// HTTP client could not be built or the request failed in flight
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("GitHub API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The GraphQL endpoint reported errors
    #[error("GraphQL query failed: {0}")]
    GraphQl(String),

    /// The token cannot be sent as an HTTP header
    #[error("Token is not a valid HTTP header value")]
    InvalidToken,

    /// Response body did not match the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<GithubError> for SourceError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::Decode(_) => SourceError::Malformed(err.to_string()),
            _ => SourceError::Transport(err.to_string()),
        }
    }
}

impl From<GithubError> for StoreError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::Decode(_) => StoreError::Malformed(err.to_string()),
            _ => StoreError::Transport(err.to_string()),
        }
    }
}
