use geo::{Distance, Geodesic};
use geo_types::Point;

use crate::error::{Error, Result};

/// A geographic region: center point plus the radius (meters) of a circle
/// covering every point it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    /// WGS84 lon/lat.
    pub center: Point<f64>,
    /// Meters, >= 0. A single-point track yields 0.
    pub radius: f64,
}

/// Computes the covering region of a point set: the center of the lat/lon
/// bounding box, and the maximum geodesic distance from that center to any
/// point.
///
/// This is deliberately not a minimal enclosing circle; the rendering radius
/// downstream is tuned to this approximation. Longitudes are compared as
/// plain floats, so a track crossing the antimeridian gets a nonsensical
/// center. Known limitation, acceptable for recreational tracks.
pub fn compute_bounds(points: &[Point<f64>]) -> Result<BoundingRegion> {
    if points.is_empty() {
        return Err(Error::EmptyTrack);
    }

    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    for p in points {
        min_lat = min_lat.min(p.y());
        max_lat = max_lat.max(p.y());
        min_lon = min_lon.min(p.x());
        max_lon = max_lon.max(p.x());
    }

    let center = Point::new((min_lon + max_lon) / 2.0, (min_lat + max_lat) / 2.0);

    let radius = points
        .iter()
        .map(|p| Geodesic.distance(center, *p))
        .fold(0.0, f64::max);

    Ok(BoundingRegion { center, radius })
}
