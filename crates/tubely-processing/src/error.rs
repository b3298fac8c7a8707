use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failure of an external media tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{tool} timed out after {limit:?}")]
    Timeout {
        tool: &'static str,
        limit: Duration,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Exit {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("failed to parse {tool} output: {message}")]
    Parse { tool: &'static str, message: String },
}

impl ToolError {
    /// Diagnostic output captured from the tool, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ToolError::Exit { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Inspection and remux failures.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("probe failed: {0}")]
    ProbeFailure(#[source] ToolError),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("invalid video geometry {width}x{height}")]
    InvalidGeometry { width: i64, height: i64 },

    #[error("remux failed: {0}")]
    RemuxFailure(#[source] ToolError),
}

/// Failures of the staging area (temp files on local disk).
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create staging file: {0}")]
    Create(#[source] io::Error),

    #[error("failed to write staging file: {0}")]
    Write(#[source] io::Error),

    #[error("upload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("upload stream aborted: {0}")]
    BodyAborted(String),

    #[error("failed to swap remuxed file into place: {0}")]
    SwapFailure(#[source] io::Error),

    #[error("failed to reopen staged file: {0}")]
    Reopen(#[source] io::Error),
}
