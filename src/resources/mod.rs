//! Static game resources loaded from JSON at startup

pub mod manifest;
pub mod map;

pub use manifest::AssetManifest;
pub use map::GameMap;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

/// Read and parse a JSON resource file
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ResourceError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ResourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&text).map_err(|source| ResourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resource loading errors
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Asset manifest has no image group")]
    MissingImages,
}
