//! Error types for lintgate-core

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a pull request metadata source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request never produced a usable response
    #[error("Pull request query failed: {0}")]
    Transport(String),

    /// The response arrived but did not have the expected shape
    #[error("Malformed pull request response: {0}")]
    Malformed(String),
}

/// Errors raised by a check-run store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a usable response
    #[error("Check run request failed: {0}")]
    Transport(String),

    /// No check run exists with the given id
    #[error("Check run not found: {id}")]
    NotFound { id: u64 },

    /// The check run is not in a state that accepts the operation
    #[error("Check run {id} is {status}, expected in_progress")]
    InvalidState { id: u64, status: String },

    /// The response arrived but did not have the expected shape
    #[error("Malformed check run response: {0}")]
    Malformed(String),
}

/// Errors raised by the lint engine itself, as opposed to lint findings.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine process could not be started
    #[error("Failed to start lint engine `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine exited in a way that does not describe lint results
    #[error("Lint engine exited with {}: {stderr}", describe_exit(.code))]
    Crashed { code: Option<i32>, stderr: String },

    /// The engine produced output that could not be read as a report
    #[error("Lint engine produced an unreadable report: {0}")]
    InvalidReport(String),

    /// IO error while talking to the engine
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine-specific failure carrying only a message
    #[error("{0}")]
    Internal(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

/// Errors that abort a gate invocation before a check run is finalized.
#[derive(Error, Debug)]
pub enum GateError {
    #[error(transparent)]
    PullRequest(#[from] SourceError),

    #[error(transparent)]
    CheckRun(#[from] StoreError),

    /// The ignore file exists but could not be read
    #[error("Failed to read ignore file {path:?}: {source}")]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An ignore pattern is not a valid glob
    #[error("Invalid ignore pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Walking the repository tree failed
    #[error("Failed to walk repository tree: {0}")]
    Walk(#[from] walkdir::Error),
}
