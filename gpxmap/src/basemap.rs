use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use galileo::layer::raster_tile_layer::RasterTileLayerBuilder;
use galileo::render::WgpuRenderer;
use galileo::{Map, MapView, Messenger};
use galileo_types::cartesian::{Point2, Size};
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::viewport::MapViewport;

/// Produces a basemap raster for a viewport. The real provider talks to a
/// tile server and a GPU; tests substitute an in-memory one.
///
/// Failure here is recoverable: the pipeline falls back to a blank canvas
/// instead of aborting (see `gpxmap-cli`).
pub trait BasemapProvider {
    fn render_basemap(&self, viewport: &MapViewport) -> Result<RgbaImage>;
}

/// OSM raster-tile basemap rendered offscreen through galileo.
pub struct OsmBasemap {
    tile_cache: PathBuf,
}

impl Default for OsmBasemap {
    fn default() -> OsmBasemap {
        OsmBasemap {
            tile_cache: PathBuf::from(".tile_cache"),
        }
    }
}

impl BasemapProvider for OsmBasemap {
    fn render_basemap(&self, viewport: &MapViewport) -> Result<RgbaImage> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(anyhow!("error building basemap: invalid image size"));
        }

        let image_size = Size::<u32>::new(viewport.width, viewport.height);

        let mut osm = RasterTileLayerBuilder::new_osm()
            .with_file_cache_checked(&self.tile_cache)
            .build()
            .map_err(|e| anyhow!("error creating OSM layer: {e}"))?;
        // Without this, the first render can be partially transparent due to fade-in.
        osm.set_fade_in_duration(Duration::default());

        let center = Point2::new(viewport.center.0, viewport.center.1);
        let map_view =
            MapView::new_projected(&center, viewport.resolution).with_size(image_size.cast());

        // Galileo tile loading & rendering are async; keep this module usable
        // from sync callers.
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            osm.load_tiles(&map_view).await;
        });

        let map = Map::new(map_view, vec![Box::new(osm)], None::<Box<dyn Messenger>>);

        let renderer = runtime
            .block_on(async { WgpuRenderer::new_with_texture_rt(image_size).await })
            .ok_or(anyhow!("error creating renderer"))?;

        renderer
            .render(&map)
            .map_err(|e| anyhow!("error rendering basemap: {e}"))?;

        let bitmap = runtime
            .block_on(async { renderer.get_image().await })
            .map_err(|e| anyhow!("error retrieving rendered bitmap: {e}"))?;

        ImageBuffer::<Rgba<u8>, _>::from_raw(viewport.width, viewport.height, bitmap)
            .ok_or(anyhow!("error creating image buffer"))
    }
}

// NOTE: no render test here (requires wgpu/GPU and network tiles).
