//! Error types for diff synthesis.

use thiserror::Error;

/// Errors raised by a [`ContentRetriever`](crate::ContentRetriever).
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The backend has no content for this path at this revision.
    #[error("no content for {path} at {revision}")]
    NotFound { path: String, revision: String },

    /// The backend failed (command exited non-zero, server refused, ...).
    #[error("backend failure: {0}")]
    Backend(String),

    /// I/O error while reading retrieved content.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`LineDiff`](crate::LineDiff) primitive.
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// The diff program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The diff program reported trouble rather than a comparison result.
    #[error("{program} exited with {status}: {stderr}")]
    Status {
        program: String,
        status: String,
        stderr: String,
    },

    /// The diff output does not have the shape of a unified diff.
    #[error("unexpected diff output: {0}")]
    Output(String),
}

/// Errors that abort a whole synthesis run. There is no partial output.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An input line does not follow the change record grammar.
    #[error("malformed change record {line:?}: {reason}")]
    MalformedRecord { line: String, reason: String },

    /// The change type letter is not one of `A`, `C`, `M`, `D`.
    #[error("don't know how to handle change type {code:?} in {line:?}")]
    UnknownChangeType { code: String, line: String },

    /// Content for one side of a diff could not be fetched.
    #[error("failed to retrieve {path} at {revision}: {source}")]
    Retrieval {
        path: String,
        revision: String,
        #[source]
        source: RetrievalError,
    },

    /// The line diff primitive failed or produced output it should not.
    #[error("diff failed for {path}: {source}")]
    DiffPrimitive {
        path: String,
        #[source]
        source: PrimitiveError,
    },

    /// Temporary snapshot storage could not be created or written.
    #[error("staging error: {0}")]
    Staging(#[from] std::io::Error),
}

/// Convenience alias for synthesis results.
pub type CoreResult<T> = Result<T, CoreError>;
