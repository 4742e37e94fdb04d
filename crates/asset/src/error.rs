//! Asset loading errors.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {reason}")]
    ParseMismatch { line: usize, reason: String },

    #[error("line {line}: index {index} out of range (pool size {len})")]
    IndexOutOfRange { line: usize, index: i64, len: usize },

    #[error("no triangles in {0}")]
    NoGeometry(String),

    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl AssetError {
    /// Map an `open` failure, keeping "not found" distinct from other I/O errors.
    pub fn from_open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            AssetError::FileNotFound(path)
        } else {
            AssetError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::FileNotFound(_))
    }
}

pub type AssetResult<T> = Result<T, AssetError>;
