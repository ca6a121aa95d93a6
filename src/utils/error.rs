use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Trimming failed ({status}): {stderr}")]
    ClipExtraction { status: ExitStatus, stderr: String },

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} could not be started from '{}': {source}", .path.display())]
    ToolNotFound {
        tool: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Settings file error: {0}")]
    Settings(String),
}

impl ClipError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClipError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClipError>;
