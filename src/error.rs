//! Error types for `stagepack`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `stagepack` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Stage Errors ====================
    /// The stage file does not exist on disk.
    #[error("stage file not found: {path}")]
    StageNotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The stage file exists but could not be parsed into a layer.
    #[error("failed to open stage {path}: {message}")]
    StageOpenFailed {
        /// The path that was opened.
        path: PathBuf,
        /// The parse error message.
        message: String,
    },

    /// An anonymous layer has no on-disk location to save to.
    #[error("cannot save anonymous layer: {identifier}")]
    AnonymousLayerSave {
        /// The layer identifier.
        identifier: String,
    },

    // ==================== Packaging Errors ====================
    /// The root asset to package does not exist; nothing was copied.
    #[error("package source not found: {path}")]
    PackageSourceMissing {
        /// The missing source path.
        path: PathBuf,
    },

    /// The packaged copy scheduled for rewriting does not exist.
    #[error("packaged stage not found for rewrite: {path}")]
    PackagedStageMissing {
        /// The missing packaged copy.
        path: PathBuf,
    },

    // ==================== Batch Errors ====================
    /// The batch root is not a directory.
    #[error("not a folder: {path}")]
    NotAFolder {
        /// The offending path.
        path: PathBuf,
    },

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `stagepack` operations.
pub type Result<T> = std::result::Result<T, Error>;
