use std::f64::consts::PI;

use geo_types::Point;

use crate::bounds::BoundingRegion;

/// EPSG:3857 sphere radius.
const EARTH_RADIUS: f64 = 6378137.0;

/// Web mercator is undefined at the poles; standard cutoff.
const MAX_MERCATOR_LAT: f64 = 85.06;

/// Web mercator resolution at zoom 17, the deepest level we render at.
/// 2 * pi * R / (256 * 2^17).
const MIN_RESOLUTION: f64 = 2.0 * PI * EARTH_RADIUS / (256.0 * 131072.0);

/// Smallest viewport radius, meters. Keeps a single-point track (covering
/// radius 0) from collapsing to a degenerate view.
pub const MIN_VIEWPORT_RADIUS: f64 = 100.0;

/// How the geographic region maps onto the output canvas. Both the basemap
/// provider and the track overlay derive pixel positions from the same
/// viewport, so the stroked path lines up with the rendered tiles.
#[derive(Debug, Clone, Copy)]
pub struct MapViewport {
    /// Region center projected to EPSG:3857.
    pub center: (f64, f64),
    /// Projection meters per pixel.
    pub resolution: f64,
    pub width: u32,
    pub height: u32,
}

fn mercator(point: Point<f64>) -> (f64, f64) {
    let lat = point.y().clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = EARTH_RADIUS * point.x().to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

impl MapViewport {
    /// Fits `region` into a `width` x `height` canvas with a 10% margin.
    pub fn from_region(region: &BoundingRegion, width: u32, height: u32) -> MapViewport {
        let center = mercator(region.center);

        // Mercator stretches ground distance by 1/cos(lat).
        let ground_radius = region.radius.max(MIN_VIEWPORT_RADIUS);
        let projected_radius = ground_radius / region.center.y().to_radians().cos();

        let fit = width.min(height).max(1) as f64;
        let resolution = (2.0 * projected_radius * 1.1 / fit).max(MIN_RESOLUTION);

        MapViewport {
            center,
            resolution,
            width,
            height,
        }
    }

    /// Canvas pixel position of a lon/lat point, y axis pointing down.
    pub fn project(&self, point: Point<f64>) -> (f32, f32) {
        let (mx, my) = mercator(point);
        let px = (mx - self.center.0) / self.resolution + self.width as f64 / 2.0;
        let py = (self.center.1 - my) / self.resolution + self.height as f64 / 2.0;
        (px as f32, py as f32)
    }
}
