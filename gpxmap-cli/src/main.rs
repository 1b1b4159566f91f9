use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use gpxmap::basemap::OsmBasemap;
use gpxmap::track::GpxTrackSource;
use gpxmap_cli::{RenderJob, run};

#[derive(Parser, Debug)]
#[command(version, about = "Render a GPX track over an OSM basemap")]
struct Opts {
    /// Path to the input GPX file.
    track_file: PathBuf,

    /// Render the basemap without drawing the track on it.
    #[arg(long)]
    no_overlay: bool,

    /// Skip basemap rendering entirely; produce a track-only raster.
    #[arg(long, conflicts_with = "no_overlay")]
    track_only: bool,

    /// Output path; defaults to the input with a _map/_track suffix.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Raster resolution.
    #[arg(long, default_value_t = 300)]
    dpi: u32,

    /// Figure size in inches.
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [10.0, 10.0])]
    size: Vec<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    let job = RenderJob {
        track_file: opts.track_file,
        output: opts.output,
        no_overlay: opts.no_overlay,
        track_only: opts.track_only,
        dpi: opts.dpi,
        size: (opts.size[0], opts.size[1]),
    };

    let out = run(&job, &GpxTrackSource, &OsmBasemap::default())?;
    println!("Wrote {}.", out.display());
    Ok(())
}
