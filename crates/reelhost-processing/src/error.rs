use std::path::PathBuf;
use thiserror::Error;

/// Failures from the external media tools.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Invalid {tool} path: {reason}")]
    InvalidToolPath { tool: &'static str, reason: String },

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("Failed to parse ffprobe output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("No video streams found")]
    NoStreams,

    #[error("Could not stat processed file {path}: {source}")]
    MissingOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Processed file {0} is empty")]
    EmptyOutput(PathBuf),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Reject tool paths that could be interpreted by a shell or escape via `..`.
pub(crate) fn validate_tool_path(tool: &'static str, path: &str) -> ProcessingResult<()> {
    if path.is_empty() {
        return Err(ProcessingError::InvalidToolPath {
            tool,
            reason: "path is empty".to_string(),
        });
    }

    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\' | ':'))
    {
        return Err(ProcessingError::InvalidToolPath {
            tool,
            reason: "contains unsafe characters".to_string(),
        });
    }

    if path.contains("..") {
        return Err(ProcessingError::InvalidToolPath {
            tool,
            reason: "contains directory traversal".to_string(),
        });
    }

    Ok(())
}
