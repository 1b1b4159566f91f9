use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};

/// Mixing weight used when the caller does not pick one; the overlay shows
/// through at 30%.
pub const DEFAULT_BLEND_WEIGHT: f32 = 0.3;

/// Per-channel weighted average of two rasters.
///
/// The overlay is first resampled (Lanczos3) to the reference's exact pixel
/// dimensions when they differ; the output always has the reference's size.
/// Non-uniform scaling is accepted, aspect distortion and all.
pub fn blend_rasters(reference: &RgbaImage, overlay: &RgbaImage, weight: f32) -> RgbaImage {
    let (width, height) = (reference.width(), reference.height());

    let resampled;
    let overlay = if overlay.dimensions() == (width, height) {
        overlay
    } else {
        resampled = image::imageops::resize(overlay, width, height, FilterType::Lanczos3);
        &resampled
    };

    let weight = weight.clamp(0.0, 1.0);
    let mut out = RgbaImage::new(width, height);
    for (dst, (a, b)) in out
        .pixels_mut()
        .zip(reference.pixels().zip(overlay.pixels()))
    {
        for c in 0..4 {
            let mixed = a.0[c] as f32 * (1.0 - weight) + b.0[c] as f32 * weight;
            dst.0[c] = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Opens a raster file as RGBA.
pub fn open_rgba(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            Error::MissingFile(path.to_path_buf())
        }
        source => Error::Decode {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(img.to_rgba8())
}

/// Writes a PNG via a temp file in the same directory, then renames it over
/// the destination. A failed encode never leaves anything at `path`.
pub fn write_png_atomic(image: &RgbaImage, path: &Path) -> Result<()> {
    let tmp = tmp_path(path);
    if let Err(e) = image.save_with_format(&tmp, ImageFormat::Png) {
        let _ = fs::remove_file(&tmp);
        return Err(match e {
            image::ImageError::IoError(io) => Error::Io(io),
            other => Error::Io(std::io::Error::other(other)),
        });
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Blends a basemap raster with a separately rendered track raster and
/// writes the result. The file-level compositing utility; callable with
/// explicit arguments, no CLI surface of its own.
pub fn blend_files(
    reference_path: &Path,
    overlay_path: &Path,
    output_path: &Path,
    weight: f32,
) -> Result<()> {
    let reference = open_rgba(reference_path)?;
    let overlay = open_rgba(overlay_path)?;

    let blended = blend_rasters(&reference, &overlay, weight);
    write_png_atomic(&blended, output_path)
}
