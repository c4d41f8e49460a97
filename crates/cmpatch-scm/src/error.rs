//! Error types for the `cm` adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScmError {
    /// The `cm` program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A `cm` command exited unsuccessfully.
    #[error("`{command}` failed (exit code {exit_code:?}): {stderr}")]
    Command {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Neither a changeset nor a branch was named.
    #[error("no diff target given: expected a changeset (cs:<N>) or a branch")]
    MissingTarget,

    /// The request is valid for other tools but not for this one.
    #[error("not supported: {0}")]
    Unsupported(String),
}

pub type ScmResult<T> = Result<T, ScmError>;
