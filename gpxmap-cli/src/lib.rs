use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use image::RgbaImage;
use log::warn;

use gpxmap::basemap::BasemapProvider;
use gpxmap::bounds::{BoundingRegion, compute_bounds};
use gpxmap::render::{TrackStyle, overlay_track, render_track_raster};
use gpxmap::track::TrackSource;
use gpxmap::viewport::MapViewport;
use gpxmap::write_png_atomic;

/// Viewport half-size used when basemap rendering fails: a small fixed
/// window around the track center, not the computed covering radius.
pub const FALLBACK_VIEWPORT_RADIUS: f64 = 500.0;

/// One rendering invocation, as resolved from the command line.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub track_file: PathBuf,
    /// Overrides the default `<stem>_map.png` / `<stem>_track.png` naming.
    pub output: Option<PathBuf>,
    /// Render the basemap without the track stroked on top.
    pub no_overlay: bool,
    /// Skip the basemap entirely; produce the standalone track raster.
    pub track_only: bool,
    pub dpi: u32,
    /// Figure size in inches; pixel dimensions are size * dpi.
    pub size: (f64, f64),
}

impl RenderJob {
    fn pixel_size(&self) -> Result<(u32, u32)> {
        if self.size.0 <= 0.0 || self.size.1 <= 0.0 {
            bail!("figure size must be positive, got {}x{}", self.size.0, self.size.1);
        }
        if self.dpi == 0 {
            bail!("dpi must be positive");
        }
        let w = (self.size.0 * self.dpi as f64).round().max(1.0) as u32;
        let h = (self.size.1 * self.dpi as f64).round().max(1.0) as u32;
        Ok((w, h))
    }

    fn output_path(&self, suffix: &str) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => default_output(&self.track_file, suffix),
        }
    }
}

/// `ride.gpx` -> `ride_map.png` / `ride_track.png`, next to the input.
fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string());
    input.with_file_name(format!("{stem}{suffix}.png"))
}

/// Runs the whole pipeline: load, bounds, basemap (with fallback), overlay,
/// write. Returns the path of the written image.
pub fn run(
    job: &RenderJob,
    source: &dyn TrackSource,
    basemap: &dyn BasemapProvider,
) -> Result<PathBuf> {
    let track = source.load_track(&job.track_file)?;
    let region = compute_bounds(track.points())?;
    let (width, height) = job.pixel_size()?;

    let style = TrackStyle::default();

    if job.track_only {
        let viewport = MapViewport::from_region(&region, width, height);
        let raster = render_track_raster(&track, &viewport, &style, job.dpi)
            .ok_or_else(|| anyhow!("cannot allocate {width}x{height} canvas"))?;

        let out = job.output_path("_track");
        write_png_atomic(&raster, &out)?;
        return Ok(out);
    }

    let viewport = MapViewport::from_region(&region, width, height);
    let (mut canvas, viewport) = match basemap.render_basemap(&viewport) {
        Ok(img) => (img, viewport),
        Err(e) => {
            warn!("basemap rendering failed, falling back to blank canvas: {e:#}");
            // Degraded mode: blank canvas over a small fixed window around
            // the center. A single substitution; no retry.
            let degraded = BoundingRegion {
                center: region.center,
                radius: FALLBACK_VIEWPORT_RADIUS,
            };
            let blank = RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
            (blank, MapViewport::from_region(&degraded, width, height))
        }
    };

    if !job.no_overlay {
        overlay_track(&mut canvas, &track, &viewport, &style, job.dpi);
    }

    let out = job.output_path("_map");
    write_png_atomic(&canvas, &out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use gpxmap::track::GpxTrackSource;
    use tempdir::TempDir;

    use super::*;

    const RIDE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="gpxmap-test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="40.00" lon="-105.00"></trkpt>
      <trkpt lat="40.02" lon="-105.00"></trkpt>
      <trkpt lat="40.01" lon="-104.98"></trkpt>
    </trkseg>
  </trk>
</gpx>
"#;

    struct FlatBasemap;

    impl BasemapProvider for FlatBasemap {
        fn render_basemap(&self, viewport: &MapViewport) -> Result<RgbaImage> {
            Ok(RgbaImage::from_pixel(
                viewport.width,
                viewport.height,
                image::Rgba([220, 220, 210, 255]),
            ))
        }
    }

    struct FailingBasemap;

    impl BasemapProvider for FailingBasemap {
        fn render_basemap(&self, _viewport: &MapViewport) -> Result<RgbaImage> {
            bail!("no gpu adapter")
        }
    }

    fn write_ride(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("ride.gpx");
        File::create(&path)
            .unwrap()
            .write_all(RIDE_GPX.as_bytes())
            .unwrap();
        path
    }

    fn job(track_file: PathBuf) -> RenderJob {
        RenderJob {
            track_file,
            output: None,
            no_overlay: false,
            track_only: false,
            dpi: 30,
            size: (10.0, 10.0),
        }
    }

    #[test]
    fn track_only_writes_stem_track_png() {
        let dir = TempDir::new("gpxmap").unwrap();
        let mut job = job(write_ride(&dir));
        job.track_only = true;

        let out = run(&job, &GpxTrackSource, &FlatBasemap).unwrap();
        assert_eq!(out, dir.path().join("ride_track.png"));

        let img = image::open(&out).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (300, 300));
        assert!(img.pixels().any(|p| p.0 != [255, 255, 255, 255]));
    }

    #[test]
    fn map_render_writes_stem_map_png_with_overlay() {
        let dir = TempDir::new("gpxmap").unwrap();
        let job = job(write_ride(&dir));

        let out = run(&job, &GpxTrackSource, &FlatBasemap).unwrap();
        assert_eq!(out, dir.path().join("ride_map.png"));

        let img = image::open(&out).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (300, 300));
        // Basemap background plus some stroked track pixels.
        assert!(img.pixels().any(|p| p.0 == [220, 220, 210, 255]));
        assert!(img.pixels().any(|p| p.0 != [220, 220, 210, 255]));
    }

    #[test]
    fn no_overlay_leaves_basemap_untouched() {
        let dir = TempDir::new("gpxmap").unwrap();
        let mut job = job(write_ride(&dir));
        job.no_overlay = true;

        let out = run(&job, &GpxTrackSource, &FlatBasemap).unwrap();
        let img = image::open(&out).unwrap().to_rgba8();
        assert!(img.pixels().all(|p| p.0 == [220, 220, 210, 255]));
    }

    #[test]
    fn basemap_failure_falls_back_to_blank_canvas() {
        let dir = TempDir::new("gpxmap").unwrap();
        let job = job(write_ride(&dir));

        let out = run(&job, &GpxTrackSource, &FailingBasemap).unwrap();
        let img = image::open(&out).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (300, 300));
        // Blank canvas with the track stroked on top.
        assert!(img.pixels().any(|p| p.0 == [255, 255, 255, 255]));
        assert!(img.pixels().any(|p| p.0 != [255, 255, 255, 255]));
    }

    #[test]
    fn missing_input_fails_without_output() {
        let dir = TempDir::new("gpxmap").unwrap();
        let mut job = job(dir.path().join("absent.gpx"));
        job.track_only = true;

        assert!(run(&job, &GpxTrackSource, &FlatBasemap).is_err());
        assert!(!dir.path().join("absent_track.png").exists());
    }

    #[test]
    fn output_flag_overrides_default_naming() {
        let dir = TempDir::new("gpxmap").unwrap();
        let mut job = job(write_ride(&dir));
        job.track_only = true;
        job.output = Some(dir.path().join("custom.png"));

        let out = run(&job, &GpxTrackSource, &FlatBasemap).unwrap();
        assert_eq!(out, dir.path().join("custom.png"));
        assert!(out.exists());
        assert!(!dir.path().join("ride_track.png").exists());
    }

    #[test]
    fn default_output_replaces_extension() {
        assert_eq!(
            default_output(Path::new("/rides/morning.gpx"), "_map"),
            PathBuf::from("/rides/morning_map.png")
        );
        assert_eq!(
            default_output(Path::new("loop.gpx"), "_track"),
            PathBuf::from("loop_track.png")
        );
    }
}
