//! Error type for fallible asset and resource operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or saving scene assets.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load OBJ {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("mesh has no usable {0}")]
    EmptyMesh(&'static str),

    #[error("image {width}x{height} does not match {len} bytes of RGB data")]
    BufferSize { width: u32, height: u32, len: usize },

    #[error("unknown resource id: {0}")]
    UnknownResource(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
