//! Bucket generation for the work scheduler.
//!
//! Divides the image into tiles (buckets) that workers claim one at a time.
//! The list is computed once before any worker starts, so a claimed index
//! maps to exactly one bucket.

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's first column
    pub x: u32,
    /// Y coordinate of bucket's first row
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Pixel coordinates covered by this bucket, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> {
        let Bucket {
            x, y, width, height, ..
        } = *self;
        (y..y + height).flat_map(move |row| (x..x + width).map(move |col| (col, row)))
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 16;

/// Granularity of one scheduling claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkUnit {
    /// Square tiles of the given edge length, clipped at the image border
    Tiles(u32),
    /// One pixel per claim
    Pixels,
}

impl WorkUnit {
    fn size(self) -> u32 {
        match self {
            WorkUnit::Tiles(size) => size.max(1),
            WorkUnit::Pixels => 1,
        }
    }
}

impl Default for WorkUnit {
    fn default() -> Self {
        WorkUnit::Tiles(DEFAULT_BUCKET_SIZE)
    }
}

/// Order in which buckets are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketOrder {
    /// Row by row from the bottom-left bucket
    Raster,
    /// Outward from the center bucket
    #[default]
    Spiral,
}

/// Generate buckets for an image in the requested order.
pub fn generate_buckets(width: u32, height: u32, unit: WorkUnit, order: BucketOrder) -> Vec<Bucket> {
    let size = unit.size();
    let cols = width.div_ceil(size);
    let rows = height.div_ceil(size);

    let cells: Vec<(u32, u32)> = match order {
        BucketOrder::Raster => (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (col, row)))
            .collect(),
        BucketOrder::Spiral => spiral_order(cols, rows),
    };

    cells
        .into_iter()
        .enumerate()
        .map(|(index, (col, row))| {
            let x = col * size;
            let y = row * size;
            Bucket::new(x, y, size.min(width - x), size.min(height - y), index)
        })
        .collect()
}

/// Visit every cell of a `cols` x `rows` grid once, spiralling out from the
/// center. The first step goes left, turns happen at the corners of the
/// growing square, and positions outside the grid are skipped.
pub fn spiral_order(cols: u32, rows: u32) -> Vec<(u32, u32)> {
    let (w, h) = (cols as i64, rows as i64);
    let total = (w * h) as usize;
    let mut cells = Vec::with_capacity(total);

    let side = w.max(h);
    let (mut x, mut y) = (0i64, 0i64);
    let (mut dx, mut dy) = (0i64, -1i64);

    for _ in 0..side * side {
        if cells.len() == total {
            break;
        }
        if -w < 2 * x && 2 * x <= w && -h < 2 * y && 2 * y <= h {
            // Mirror x so the walk starts towards the left.
            let col = w / 2 - x;
            let row = (h - 1) / 2 + y;
            cells.push((col as u32, row as u32));
        }
        if x == y || (x < 0 && x == -y) || (x > 0 && x == 1 - y) {
            (dx, dy) = (-dy, dx);
        }
        x += dx;
        y += dy;
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, WorkUnit::Tiles(64), BucketOrder::Raster);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 70, WorkUnit::Tiles(64), BucketOrder::Spiral);
        assert_eq!(buckets.len(), 4); // 2x2 grid with clipped edge buckets

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);
        assert!(buckets.iter().any(|b| b.width == 36 && b.height == 6));
    }

    #[test]
    fn test_spiral_starts_at_center() {
        let buckets = generate_buckets(192, 192, WorkUnit::Tiles(64), BucketOrder::Spiral);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        let first = &buckets[0];
        assert_eq!((first.x, first.y), (64, 64));
        // Then one step to the left.
        assert_eq!((buckets[1].x, buckets[1].y), (0, 64));
    }

    #[test]
    fn test_spiral_is_bijection() {
        for (cols, rows) in [(1, 1), (1, 7), (6, 1), (2, 2), (3, 5), (8, 3), (16, 9), (10, 10)] {
            let cells = spiral_order(cols, rows);
            assert_eq!(cells.len(), (cols * rows) as usize, "{}x{}", cols, rows);
            let unique: HashSet<_> = cells.iter().copied().collect();
            assert_eq!(unique.len(), cells.len(), "{}x{}", cols, rows);
            assert!(cells.iter().all(|&(c, r)| c < cols && r < rows));
        }
    }

    #[test]
    fn test_pixel_mode_covers_every_pixel() {
        let buckets = generate_buckets(7, 5, WorkUnit::Pixels, BucketOrder::Spiral);
        assert_eq!(buckets.len(), 35);
        let pixels: HashSet<_> = buckets.iter().flat_map(|b| b.pixels()).collect();
        assert_eq!(pixels.len(), 35);
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_empty_image() {
        assert!(generate_buckets(0, 10, WorkUnit::Tiles(16), BucketOrder::Spiral).is_empty());
        assert!(spiral_order(0, 0).is_empty());
    }
}
