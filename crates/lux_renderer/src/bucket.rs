//! Bucket-based tile rendering.
//!
//! The frame is cut into square tiles. Each tile is an independent job for
//! the worker pool; the driver stitches finished tiles back into the image.

use crate::renderer::{render_pixel, RenderConfig};
use crate::{Camera, Color, Scene};

/// Default bucket edge in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// A rectangular tile of the image. Edge tiles may be smaller than the
/// configured bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Absolute pixel coordinates covered by this bucket, row-major.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height).flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }

    /// Squared distance from the bucket's middle to `(cx, cy)`.
    fn distance_sq(&self, cx: f32, cy: f32) -> f32 {
        let dx = self.x as f32 + 0.5 * self.width as f32 - cx;
        let dy = self.y as f32 + 0.5 * self.height as f32 - cy;
        dx * dx + dy * dy
    }
}

/// Tile a `width` x `height` image, nearest-to-center first.
///
/// A `bucket_size` of zero is treated as one.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);

    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width)
                .step_by(size as usize)
                .map(move |x| Bucket::new(x, y, size.min(width - x), size.min(height - y), 0))
        })
        .collect();

    let (cx, cy) = (0.5 * width as f32, 0.5 * height as f32);
    buckets.sort_by(|a, b| a.distance_sq(cx, cy).total_cmp(&b.distance_sq(cx, cy)));
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// How many buckets touch each pixel. A valid tiling is all ones.
pub fn coverage_mask(width: u32, height: u32, buckets: &[Bucket]) -> Vec<u32> {
    let mut mask = vec![0u32; (width * height) as usize];
    for (x, y) in buckets.iter().flat_map(Bucket::pixels) {
        if x < width && y < height {
            mask[(y * width + x) as usize] += 1;
        }
    }
    mask
}

/// Render every pixel of one bucket.
pub fn render_bucket(bucket: &Bucket, camera: &Camera, scene: &Scene, config: &RenderConfig) -> BucketResult {
    let pixels = bucket
        .pixels()
        .map(|(x, y)| render_pixel(camera, scene, x, y, config))
        .collect();
    BucketResult::new(*bucket, pixels)
}

/// Colors of a finished bucket, row-major within the bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_cover_image() {
        let exact = generate_buckets(128, 128, 64);
        assert_eq!(exact.len(), 4);

        let ragged = generate_buckets(100, 70, 64);
        assert_eq!(ragged.len(), 4);
        let total: u32 = ragged.iter().map(Bucket::pixel_count).sum();
        assert_eq!(total, 100 * 70);
    }

    #[test]
    fn test_center_bucket_first() {
        let buckets = generate_buckets(192, 192, 64);

        assert_eq!(buckets.len(), 9);
        assert_eq!((buckets[0].x, buckets[0].y), (64, 64));
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_bucket_pixels_row_major() {
        let coords: Vec<_> = Bucket::new(3, 5, 2, 2, 0).pixels().collect();
        assert_eq!(coords, vec![(3, 5), (4, 5), (3, 6), (4, 6)]);
    }

    #[test]
    fn test_coverage_is_exactly_once() {
        for (w, h, size) in [(1, 1, 64), (20, 20, 7), (333, 17, 64), (64, 65, 16)] {
            let buckets = generate_buckets(w, h, size);
            let mask = coverage_mask(w, h, &buckets);
            assert!(mask.iter().all(|&c| c == 1), "{w}x{h} / {size}");
        }
    }

    #[test]
    fn test_zero_bucket_size_does_not_hang() {
        assert_eq!(generate_buckets(3, 2, 0).len(), 6);
    }
}
