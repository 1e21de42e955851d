//! Error types for mirror operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a download or validation run.
///
/// Checksum mismatches and missing dataset directories are not errors;
/// they are reported through [`crate::verify::ValidationReport`].
#[derive(Error, Debug)]
pub enum MirrorError {
    /// I/O error during file operations.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// FTP control or data connection failure.
    #[error(transparent)]
    FtpError(#[from] suppaftp::FtpError),

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    /// The lookup table could not be read or parsed.
    #[error("Failed to load lookup table {path}: {reason}")]
    Lookup { path: PathBuf, reason: String },

    /// The manifest could not be opened or decompressed.
    #[error("Failed to read manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A manifest line does not have exactly three fields.
    #[error("Malformed line {line} in {path}: {content:?}")]
    MalformedManifest {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// A blocking task panicked or was cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
