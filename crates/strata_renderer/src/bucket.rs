//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use rand::RngCore;
use strata_math::Colour;

use crate::renderer::{render_pixel, RenderConfig};
use crate::{RayStats, Raytracer};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
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

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Generate buckets covering the image, sorted in spiral order from the centre.
///
/// # Panics
/// If `bucket_size` is zero.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    assert!(bucket_size > 0, "bucket size must be positive");
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance of their centres from the image centre.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let centre_x = width as f32 / 2.0;
    let centre_y = height as f32 / 2.0;
    let distance = |b: &Bucket| {
        let x = b.x as f32 + b.width as f32 / 2.0;
        let y = b.y as f32 + b.height as f32 / 2.0;
        (x - centre_x).powi(2) + (y - centre_y).powi(2)
    };

    // Stable, so equidistant buckets keep row-major order
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colours in row-major order
    pub pixels: Vec<Colour>,
    /// Rays cast while rendering this bucket
    pub stats: RayStats,
}

/// Render every pixel of one bucket.
pub fn render_bucket(
    bucket: &Bucket,
    raytracer: &Raytracer,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> BucketResult {
    let mut stats = RayStats::default();
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            pixels.push(render_pixel(
                raytracer,
                config,
                bucket.x + local_x,
                bucket.y + local_y,
                rng,
                &mut stats,
            ));
        }
    }

    BucketResult {
        bucket: *bucket,
        pixels,
        stats,
    }
}
