//! Whole-image render driver.
//!
//! Buckets are traced in parallel with rayon. Each bucket owns its RNG and
//! ray statistics, so results do not depend on thread scheduling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strata_core::Image;
use strata_math::{Colour, Vec2};

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::{RayStats, Raytracer, Sampler};

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub sampler: Sampler,
    /// Colour of pixels whose camera rays hit nothing
    pub background: Colour,
    pub bucket_size: u32,
    /// Output gamma; 1.0 leaves colours linear
    pub gamma: f32,
    /// Base seed for per-bucket random number generators
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            sampler: Sampler::Single,
            background: Colour::BLACK,
            bucket_size: DEFAULT_BUCKET_SIZE,
            gamma: 1.0,
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_background(mut self, background: Colour) -> Self {
        self.background = background;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Normalized coordinates of the centre of pixel (x, y).
    ///
    /// Row 0 is the top of the image, which is the top of the view.
    pub fn pixel_centre(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / self.width as f32,
            1.0 - (y as f32 + 0.5) / self.height as f32,
        )
    }

    /// Size of one pixel in normalized coordinates.
    pub fn pixel_footprint(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }
}

/// Linear colour of pixel (x, y), falling back to the background on a miss.
pub fn render_pixel(
    raytracer: &Raytracer,
    config: &RenderConfig,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
    stats: &mut RayStats,
) -> Colour {
    let centre = config.pixel_centre(x, y);
    config
        .sampler
        .sample(raytracer, centre.x, centre.y, config.pixel_footprint(), rng, stats)
        .unwrap_or(config.background)
}

/// A finished (or stopped) render.
pub struct RenderOutput {
    pub image: Image,
    pub stats: RayStats,
    /// False when the stop flag cut the render short
    pub completed: bool,
    pub elapsed: Duration,
}

/// Render the whole image.
///
/// `stop` is checked before each bucket; buckets not yet started when it is
/// set are left at the background colour.
///
/// # Panics
/// If either dimension or the bucket size is zero.
pub fn render(raytracer: &Raytracer, config: &RenderConfig, stop: &AtomicBool) -> RenderOutput {
    let start = Instant::now();
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);
    log::info!(
        "Rendering {}x{} in {} buckets, {:?}",
        config.width,
        config.height,
        buckets.len(),
        config.sampler
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .filter_map(|bucket| {
            if stop.load(Ordering::Relaxed) {
                return None;
            }
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(bucket.index as u64));
            Some(render_bucket(bucket, raytracer, config, &mut rng))
        })
        .collect();

    let completed = results.len() == buckets.len();
    let mut image = Image::new(config.width, config.height, config.background);
    let mut stats = RayStats::default();
    for result in &results {
        let clamped: Vec<Colour> = result.pixels.iter().map(|c| c.clamp()).collect();
        image.blit(result.bucket.x, result.bucket.y, result.bucket.width, &clamped);
        stats.merge(&result.stats);
    }
    if config.gamma != 1.0 {
        image.gamma_correct(config.gamma);
    }

    let elapsed = start.elapsed();
    if completed {
        log::info!("Render finished in {:.2?}: {}", elapsed, stats);
    } else {
        log::warn!(
            "Render stopped after {}/{} buckets in {:.2?}: {}",
            results.len(),
            buckets.len(),
            elapsed,
            stats
        );
    }

    RenderOutput {
        image,
        stats,
        completed,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingShape, Camera, Rect, Shape, Sphere};
    use strata_core::{Material, PointLight};
    use strata_math::{Aabb, Vec3};

    fn scene() -> Raytracer {
        let camera = Camera::new(
            Vec3::new(0.0, 300.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            Rect::new(-400.0, 400.0, -400.0, 400.0),
            500.0,
        );
        let mut raytracer = Raytracer::new(camera);
        let red = Material::new(Colour::new(0.8, 0.2, 0.2)).with_intensities(0.5, 1.0, 0.0, 1.0);
        let shapes: Vec<Box<dyn Shape>> =
            vec![Box::new(Sphere::new(Vec3::new(250.0, 250.0, -1000.0), 150.0).with_material(red))];
        raytracer.set_root_shape(Box::new(BoundingShape::new(
            shapes,
            Aabb::new(Vec3::splat(-5000.0), Vec3::splat(5000.0)),
        )));
        raytracer.add_light(PointLight::ambient_only(Vec3::new(0.0, 1000.0, 0.0), Colour::WHITE));
        raytracer
    }

    fn config() -> RenderConfig {
        RenderConfig::default()
            .with_resolution(64, 64)
            .with_bucket_size(16)
            .with_background(Colour::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn test_pixel_centre_mapping() {
        let config = RenderConfig::default().with_resolution(4, 2);

        assert_eq!(config.pixel_centre(0, 0), Vec2::new(0.125, 0.75));
        assert_eq!(config.pixel_centre(3, 1), Vec2::new(0.875, 0.25));
        assert_eq!(config.pixel_footprint(), Vec2::new(0.25, 0.5));
    }

    #[test]
    fn test_render_places_sphere() {
        let output = render(&scene(), &config(), &AtomicBool::new(false));
        assert!(output.completed);

        // Normalized (0.65625, 0.46875) is pixel (42, 34)
        let hit = output.image.get(42, 34).unwrap();
        assert!((hit.r - 0.4).abs() < 1e-5);
        assert_eq!(output.image.get(2, 2), Some(Colour::new(0.0, 0.0, 1.0)));
        assert_eq!(output.stats.primary, 64 * 64);
    }

    #[test]
    fn test_render_is_deterministic() {
        let config = config().with_sampler(Sampler::Random {
            samples: 3,
            jitter: 0.002,
        });
        let raytracer = scene();
        let a = render(&raytracer, &config, &AtomicBool::new(false));
        let b = render(&raytracer, &config, &AtomicBool::new(false));

        assert_eq!(a.image.pixels(), b.image.pixels());
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn test_stop_flag_skips_buckets() {
        let output = render(&scene(), &config(), &AtomicBool::new(true));

        assert!(!output.completed);
        assert_eq!(output.stats.total(), 0);
        assert!(output.image.pixels().iter().all(|&c| c == Colour::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_gamma_applied() {
        let config = config().with_gamma(2.0);
        let output = render(&scene(), &config, &AtomicBool::new(false));

        let hit = output.image.get(42, 34).unwrap();
        assert!((hit.r - 0.4f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_config_json_defaults() {
        let json = r#"{"width": 320, "sampler": {"kind": "uniform", "grid": 2}}"#;
        let config: RenderConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.width, 320);
        assert_eq!(config.height, 800);
        assert_eq!(config.sampler, Sampler::Uniform { grid: 2 });
    }
}
