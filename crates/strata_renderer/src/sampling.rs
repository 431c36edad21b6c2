//! Per-pixel sampling strategies.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use strata_math::{Colour, Vec2, Vec3};

use crate::{RayStats, Raytracer};

/// Uniform random float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Random unit vector by rejection sampling.
///
/// Candidates are drawn from the [-1, 1] cube and kept only when their
/// length lies in (0.1, 1], then normalized.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let length = candidate.length();
        if length > 0.1 && length <= 1.0 {
            return candidate / length;
        }
    }
}

/// How camera rays are distributed over a pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sampler {
    /// One ray through the pixel centre.
    #[default]
    Single,
    /// A `grid` x `grid` lattice of rays over the pixel footprint.
    Uniform { grid: u32 },
    /// `samples` rays through the pixel centre, directions jittered by up
    /// to `jitter`.
    Random { samples: u32, jitter: f32 },
}

impl Sampler {
    /// Camera rays cast per pixel.
    pub fn samples_per_pixel(&self) -> u32 {
        match *self {
            Sampler::Single => 1,
            Sampler::Uniform { grid } => grid * grid,
            Sampler::Random { samples, .. } => samples,
        }
    }

    /// Colour of the pixel centred on normalized (x, y) with the given
    /// normalized footprint, or `None` when every ray missed.
    ///
    /// # Panics
    /// If the strategy casts no rays.
    pub fn sample(
        &self,
        raytracer: &Raytracer,
        x: f32,
        y: f32,
        footprint: Vec2,
        rng: &mut dyn RngCore,
        stats: &mut RayStats,
    ) -> Option<Colour> {
        match *self {
            Sampler::Single => raytracer.raytrace(x, y, stats),
            Sampler::Uniform { grid } => {
                assert!(grid > 0, "uniform sampling needs a non-empty grid");
                let step = footprint / grid as f32;
                let start = Vec2::new(x, y) - footprint / 2.0 + step / 2.0;
                let mut sum = Colour::BLACK;
                let mut hits = 0u32;
                for j in 0..grid {
                    for i in 0..grid {
                        let at = start + step * Vec2::new(i as f32, j as f32);
                        if let Some(colour) = raytracer.raytrace(at.x, at.y, stats) {
                            sum += colour;
                            hits += 1;
                        }
                    }
                }
                (hits > 0).then(|| sum / hits as f32)
            }
            Sampler::Random { samples, jitter } => {
                raytracer.multisample(x, y, jitter, samples, rng, stats)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Camera, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use strata_core::{Material, PointLight};

    fn lit_sphere() -> Raytracer {
        let mut raytracer = Raytracer::new(Camera::default());
        let material = Material::new(Colour::WHITE).with_intensities(1.0, 0.0, 0.0, 1.0);
        raytracer.set_root_shape(Box::new(
            Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0).with_material(material),
        ));
        raytracer.add_light(PointLight::ambient_only(Vec3::ZERO, Colour::WHITE));
        raytracer
    }

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut mean = Vec3::ZERO;
        for _ in 0..2000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-5);
            mean += v;
        }
        // Roughly isotropic
        assert!((mean / 2000.0).length() < 0.1);
    }

    #[test]
    fn test_samples_per_pixel() {
        assert_eq!(Sampler::Single.samples_per_pixel(), 1);
        assert_eq!(Sampler::Uniform { grid: 3 }.samples_per_pixel(), 9);
        assert_eq!(
            Sampler::Random {
                samples: 5,
                jitter: 0.001
            }
            .samples_per_pixel(),
            5
        );
    }

    #[test]
    fn test_strategies_agree_inside_flat_region() {
        let raytracer = lit_sphere();
        let mut rng = StdRng::seed_from_u64(3);
        let footprint = Vec2::splat(0.01);

        for sampler in [
            Sampler::Single,
            Sampler::Uniform { grid: 2 },
            Sampler::Random {
                samples: 4,
                jitter: 0.001,
            },
        ] {
            let mut stats = RayStats::default();
            let colour = sampler
                .sample(&raytracer, 0.5, 0.5, footprint, &mut rng, &mut stats)
                .unwrap();
            assert!((colour.r - 1.0).abs() < 1e-5);
            assert_eq!(stats.primary, u64::from(sampler.samples_per_pixel()));
        }
    }

    #[test]
    fn test_uniform_edge_pixel_averages_hits_only() {
        let raytracer = lit_sphere();
        let mut rng = StdRng::seed_from_u64(3);
        // Sphere edge passes through this wide footprint; misses are dropped
        let colour = Sampler::Uniform { grid: 4 }
            .sample(&raytracer, 0.6, 0.5, Vec2::splat(0.1), &mut rng, &mut RayStats::default())
            .unwrap();

        assert!((colour.r - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_all_miss_is_none() {
        let raytracer = lit_sphere();
        let mut rng = StdRng::seed_from_u64(3);
        let colour = Sampler::Uniform { grid: 2 }.sample(
            &raytracer,
            0.05,
            0.05,
            Vec2::splat(0.01),
            &mut rng,
            &mut RayStats::default(),
        );
        assert!(colour.is_none());
    }

    #[test]
    #[should_panic]
    fn test_zero_samples_panics() {
        let raytracer = lit_sphere();
        let mut rng = StdRng::seed_from_u64(3);
        Sampler::Random {
            samples: 0,
            jitter: 0.001,
        }
        .sample(&raytracer, 0.5, 0.5, Vec2::ONE, &mut rng, &mut RayStats::default());
    }

    #[test]
    fn test_sampler_json() {
        let json = r#"{"kind":"random","samples":8,"jitter":0.002}"#;
        let sampler: Sampler = serde_json::from_str(json).unwrap();
        assert_eq!(
            sampler,
            Sampler::Random {
                samples: 8,
                jitter: 0.002
            }
        );
    }
}
