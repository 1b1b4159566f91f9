use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the caller. A basemap rendering failure is not listed
/// here: it is absorbed by the pipeline (see `gpxmap-cli`), which substitutes
/// a blank canvas instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {0}")]
    MissingFile(PathBuf),

    #[error("invalid track file: {0}")]
    Parse(#[from] gpx::errors::GpxError),

    #[error("track contains no points")]
    EmptyTrack,

    #[error("cannot decode raster image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
