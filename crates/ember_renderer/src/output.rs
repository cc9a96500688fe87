//! Writing finished images to disk.
//!
//! Pixel values are expected on the display scale produced by the
//! integrators (gamma-corrected, roughly 0..256).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::framebuffer::{Framebuffer, Image};
use thiserror::Error;

/// Errors that can occur while saving an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

pub type OutputResult<T> = Result<T, OutputError>;

const PPM_MAX_VALUE: u32 = 65535;

/// Truncate a display value to an integer channel.
fn channel(value: f32) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.min(u32::MAX as f32) as u32
    } else {
        0
    }
}

/// Write a plain-text `P3` PPM.
///
/// With `range` unset the header's max value is the brightest channel,
/// so HDR values above 255 survive. The max value is kept within 1..=65535
/// and every channel is clamped to it.
pub fn write_ppm_to<W: Write>(out: &mut W, image: &Image, range: Option<u32>) -> std::io::Result<()> {
    let (width, height) = (image.width(), image.height());
    let max_value = match range {
        Some(r) => r,
        None => image
            .pixels()
            .iter()
            .map(|c| channel(c.x).max(channel(c.y)).max(channel(c.z)))
            .max()
            .unwrap_or(0),
    }
    .clamp(1, PPM_MAX_VALUE);

    writeln!(out, "P3")?;
    writeln!(out, "{} {}", width, height)?;
    writeln!(out, "{}", max_value)?;

    // Row 0 is the bottom of the image, PPM starts at the top.
    for y in (0..height).rev() {
        for x in 0..width {
            let c = image.load(x, y);
            writeln!(
                out,
                "{} {} {}",
                channel(c.x).min(max_value),
                channel(c.y).min(max_value),
                channel(c.z).min(max_value)
            )?;
        }
    }
    Ok(())
}

/// Append `ext` unless the path already ends with it.
fn with_extension(path: &Path, ext: &str) -> PathBuf {
    match path.extension() {
        Some(e) if e.eq_ignore_ascii_case(ext) => path.to_path_buf(),
        _ => {
            let mut name = path.as_os_str().to_owned();
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        }
    }
}

/// Write `image` as a PPM file, adding the `.ppm` extension if missing.
pub fn write_ppm(path: impl AsRef<Path>, image: &Image, range: Option<u32>) -> OutputResult<PathBuf> {
    let path = with_extension(path.as_ref(), "ppm");
    let mut out = BufWriter::new(File::create(&path)?);
    write_ppm_to(&mut out, image, range)?;
    out.flush()?;
    log::info!("Result written to {}", path.display());
    Ok(path)
}

/// Write `image` as an 8-bit PNG, adding the `.png` extension if missing.
pub fn write_png(path: impl AsRef<Path>, image: &Image) -> OutputResult<PathBuf> {
    let path = with_extension(path.as_ref(), "png");
    let (width, height) = (image.width(), image.height());
    let buffer = image::RgbImage::from_fn(width, height, |x, y| {
        let c = image.load(x, height - 1 - y);
        image::Rgb([
            channel(c.x).min(255) as u8,
            channel(c.y).min(255) as u8,
            channel(c.z).min(255) as u8,
        ])
    });
    buffer.save(&path)?;
    log::info!("Result written to {}", path.display());
    Ok(path)
}

/// Save by extension: `.png` or `.ppm`. A path without extension becomes PPM.
pub fn save_image(path: impl AsRef<Path>, image: &Image) -> OutputResult<PathBuf> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "png" => write_png(path, image),
        Some(ext) if ext == "ppm" => write_ppm(path, image, None),
        None => write_ppm(path, image, None),
        Some(ext) => Err(OutputError::UnsupportedFormat(ext)),
    }
}
