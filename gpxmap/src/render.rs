use image::{ImageBuffer, RgbaImage};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapMut, Stroke, Transform};

use crate::track::Track;
use crate::viewport::MapViewport;

/// Stroke styling for the recorded path.
#[derive(Debug, Clone, Copy)]
pub struct TrackStyle {
    pub color: [u8; 3],
    /// Typographic points; converted to pixels with the output dpi.
    pub width: f32,
    /// 0.0 transparent .. 1.0 opaque.
    pub opacity: f32,
}

impl Default for TrackStyle {
    fn default() -> TrackStyle {
        TrackStyle {
            color: [255, 0, 0],
            width: 2.0,
            opacity: 1.0,
        }
    }
}

impl TrackStyle {
    fn width_px(&self, dpi: u32) -> f32 {
        (self.width * dpi as f32 / 72.0).max(1.0)
    }

    fn alpha(&self) -> u8 {
        (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

fn stroke_track(
    pixmap: &mut PixmapMut,
    track: &Track,
    viewport: &MapViewport,
    style: &TrackStyle,
    dpi: u32,
) {
    let mut paint = Paint::default();
    paint.set_color_rgba8(style.color[0], style.color[1], style.color[2], style.alpha());
    paint.anti_alias = true;

    let width = style.width_px(dpi);
    let points = track.points();

    if points.len() == 1 {
        // A single fix gets a dot of the stroke width.
        let (x, y) = viewport.project(points[0]);
        let mut pb = PathBuilder::new();
        pb.push_circle(x, y, width / 2.0);
        if let Some(path) = pb.finish() {
            pixmap.fill_path(
                &path,
                &paint,
                tiny_skia::FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        return;
    }

    // The connected polyline, fix by fix as recorded. No simplification or
    // deduplication: duplicate fixes just re-stroke the same pixel.
    let mut pb = PathBuilder::new();
    let (x, y) = viewport.project(points[0]);
    pb.move_to(x, y);
    for p in &points[1..] {
        let (x, y) = viewport.project(*p);
        pb.line_to(x, y);
    }
    let Some(path) = pb.finish() else {
        return;
    };

    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Strokes the track on top of an existing canvas (e.g. a rendered basemap).
pub fn overlay_track(
    canvas: &mut RgbaImage,
    track: &Track,
    viewport: &MapViewport,
    style: &TrackStyle,
    dpi: u32,
) {
    let (width, height) = (canvas.width(), canvas.height());
    let Some(mut pixmap) = PixmapMut::from_bytes(&mut *canvas, width, height) else {
        return;
    };
    stroke_track(&mut pixmap, track, viewport, style, dpi);
}

/// Renders the track alone on an opaque white canvas.
pub fn render_track_raster(
    track: &Track,
    viewport: &MapViewport,
    style: &TrackStyle,
    dpi: u32,
) -> Option<RgbaImage> {
    let mut pixmap = Pixmap::new(viewport.width, viewport.height)?;
    pixmap.fill(tiny_skia::Color::WHITE);
    stroke_track(&mut pixmap.as_mut(), track, viewport, style, dpi);

    ImageBuffer::from_raw(viewport.width, viewport.height, pixmap.take())
}
