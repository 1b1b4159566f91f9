pub mod basemap;
pub mod bounds;
pub mod error;
pub mod overlay;
pub mod render;
pub mod track;
pub mod viewport;

pub use basemap::{BasemapProvider, OsmBasemap};
pub use bounds::{BoundingRegion, compute_bounds};
pub use error::{Error, Result};
pub use overlay::{DEFAULT_BLEND_WEIGHT, blend_files, blend_rasters, write_png_atomic};
pub use render::{TrackStyle, overlay_track, render_track_raster};
pub use track::{GpxTrackSource, Track, TrackSource};
pub use viewport::{MIN_VIEWPORT_RADIUS, MapViewport};
