use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn one file into a [`RasterImage`](crate::loader::RasterImage).
///
/// These never leave the cache entry they belong to except at startup and on
/// manual reload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no decoder for {0}")]
    Unsupported(PathBuf),

    #[error("no active image in {0}")]
    NoActive(PathBuf),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Directory-level and startup failures. Any of these ends the session.
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("cannot resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} has no parent directory")]
    NoParent(PathBuf),

    #[error("cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not a supported image")]
    NotAnImage(PathBuf),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
}
