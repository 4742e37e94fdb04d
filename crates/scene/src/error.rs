//! Scene loading errors.

use std::{io, path::PathBuf};

use asset::AssetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene config not found (tried {})", display_paths(.tried))]
    ConfigNotFound { tried: Vec<PathBuf> },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Asset(#[from] AssetError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type SceneResult<T> = Result<T, SceneError>;
