use std::path::PathBuf;
use thiserror::Error;

/// Failures at the I/O edges of the crate. The interpreter, layout, animation
/// and routing are total and never produce one of these.
#[derive(Debug, Error)]
pub enum DepictError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to rasterize svg: {0}")]
    Raster(String),
}

pub type Result<T, E = DepictError> = std::result::Result<T, E>;
