use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo_types::Point;
use gpx::read;

use crate::error::{Error, Result};

/// An ordered, non-empty sequence of recorded GPS fixes.
///
/// Points are WGS84 lon/lat (`x` = longitude, `y` = latitude), in recording
/// order. Duplicate and out-of-order fixes are kept as recorded.
#[derive(Debug, Clone)]
pub struct Track {
    points: Vec<Point<f64>>,
}

impl Track {
    pub fn new(points: Vec<Point<f64>>) -> Result<Track> {
        if points.is_empty() {
            return Err(Error::EmptyTrack);
        }
        Ok(Track { points })
    }

    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    /// Number of fixes; at least 1 by construction.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; an empty `Track` cannot be constructed.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Source of track data, so the pipeline can be exercised without real files.
pub trait TrackSource {
    fn load_track(&self, path: &Path) -> Result<Track>;
}

/// Loads tracks from GPX files.
pub struct GpxTrackSource;

impl TrackSource for GpxTrackSource {
    fn load_track(&self, path: &Path) -> Result<Track> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::MissingFile(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let reader = BufReader::new(file);

        let gpx = read(reader)?;

        let mut points: Vec<Point<f64>> = Vec::new();
        for track in gpx.tracks {
            for segment in track.segments {
                for waypoint in &segment.points {
                    points.push(waypoint.point());
                }
            }
        }

        Track::new(points)
    }
}
