//! lintgate-github: GitHub collaborators for lintgate
//!
//! Implements `PullRequestSource` with the GraphQL API and `CheckRunStore`
//! with the check-runs REST API, both on a single [`GithubClient`].

pub mod checks;
pub mod client;
pub mod error;
pub mod pull_request;

pub use client::{GithubClient, GithubConfig, DEFAULT_API_URL, DEFAULT_GRAPHQL_URL};
pub use error::GithubError;
pub use pull_request::{FILES_PAGE_SIZE, MAX_CHANGED_FILES};

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GithubError>;
