//! Core error types for PCPE

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for PCPE operations
#[derive(Error, Debug)]
pub enum PcpeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An archive could not be read, or one of its outputs could not be written
    #[error("Archive error for {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed header at line {line}: {header:?}")]
    MalformedHeader { line: usize, header: String },

    #[error("Incomplete record at line {line}: header {header:?} has no sequence")]
    IncompleteRecord { line: usize, header: String },

    #[error("Format error: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A worker task panicked while processing an archive
    #[error("Worker failed on {}: {message}", path.display())]
    Worker { path: PathBuf, message: String },

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for PCPE operations
pub type PcpeResult<T> = Result<T, PcpeError>;

impl PcpeError {
    /// Wrap an I/O error with the archive path it concerns
    pub fn archive(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PcpeError::Archive {
            path: path.into(),
            source,
        }
    }

    /// Process exit code used by the command line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            PcpeError::Configuration(_) => 2,
            PcpeError::Io(_) | PcpeError::Archive { .. } => 3,
            PcpeError::MalformedHeader { .. }
            | PcpeError::IncompleteRecord { .. }
            | PcpeError::Format(_) => 4,
            PcpeError::Worker { .. } => 5,
            PcpeError::InvalidInput(_) | PcpeError::Other(_) => 1,
        }
    }
}

impl From<anyhow::Error> for PcpeError {
    fn from(err: anyhow::Error) -> Self {
        PcpeError::Other(err.to_string())
    }
}
