//! Pixel storage shared by render workers.

use std::sync::atomic::{AtomicU32, Ordering};

use ember_math::Color;

/// Destination for finished pixel values.
///
/// `store` takes `&self`: each pixel is written by exactly one worker, so
/// implementations only need per-pixel atomicity, never a lock.
pub trait Framebuffer: Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn store(&self, x: u32, y: u32, color: Color);
}

/// In-memory image holding each channel as `f32` bits in an atomic.
///
/// Row 0 is the bottom of the picture. Out-of-range coordinates are clamped
/// to the nearest edge pixel.
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<[AtomicU32; 3]>,
}

impl Image {
    /// Create a new image filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        let count = width as usize * height as usize;
        let pixels = (0..count)
            .map(|_| {
                [
                    AtomicU32::new(0.0f32.to_bits()),
                    AtomicU32::new(0.0f32.to_bits()),
                    AtomicU32::new(0.0f32.to_bits()),
                ]
            })
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if self.pixels.is_empty() {
            return None;
        }
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        Some(y * self.width as usize + x)
    }

    /// Get the pixel at (x, y).
    pub fn load(&self, x: u32, y: u32) -> Color {
        match self.index(x, y) {
            Some(i) => {
                let [r, g, b] = &self.pixels[i];
                Color::new(
                    f32::from_bits(r.load(Ordering::Relaxed)),
                    f32::from_bits(g.load(Ordering::Relaxed)),
                    f32::from_bits(b.load(Ordering::Relaxed)),
                )
            }
            None => Color::ZERO,
        }
    }

    /// Snapshot of every pixel in row-major order, bottom row first.
    pub fn pixels(&self) -> Vec<Color> {
        let mut out = Vec::with_capacity(self.pixels.len());
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.load(x, y));
            }
        }
        out
    }
}

impl Framebuffer for Image {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn store(&self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            let [r, g, b] = &self.pixels[i];
            r.store(color.x.to_bits(), Ordering::Relaxed);
            g.store(color.y.to_bits(), Ordering::Relaxed);
            b.store(color.z.to_bits(), Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_load() {
        let image = Image::new(4, 3);
        assert_eq!(image.load(2, 1), Color::ZERO);

        image.store(2, 1, Color::new(1.0, 2.5, 255.99));
        assert_eq!(image.load(2, 1), Color::new(1.0, 2.5, 255.99));
        assert_eq!(image.pixels()[4 + 2], Color::new(1.0, 2.5, 255.99));
    }

    #[test]
    fn test_coordinates_are_clamped() {
        let image = Image::new(2, 2);
        image.store(10, 10, Color::ONE);
        assert_eq!(image.load(1, 1), Color::ONE);
        assert_eq!(image.load(99, 99), Color::ONE);
    }

    #[test]
    fn test_empty_image_ignores_writes() {
        let image = Image::new(0, 5);
        image.store(0, 0, Color::ONE);
        assert_eq!(image.load(0, 0), Color::ZERO);
        assert!(image.pixels().is_empty());
    }
}
