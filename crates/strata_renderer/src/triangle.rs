//! Triangle primitive for ray tracing.
//!
//! Intersection solves the 3x3 system `O + tD = p0 + β(p1 - p0) + γ(p2 - p0)`
//! by Cramer's rule, which is the same computation as Möller-Trumbore.

use std::ops::{Add, Mul};

use strata_core::Material;
use strata_math::{Aabb, Interval, Ray, Vec2, Vec3};

use crate::shape::{HitRecord, Shape};

/// Determinants smaller than this are treated as a ray parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-10;

/// Padding added to triangle bounds so flat triangles keep a volume.
const BOX_PADDING: f32 = 1e-4;

/// Solution of a ray/triangle system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    pub t: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl Barycentric {
    pub fn alpha(&self) -> f32 {
        1.0 - self.beta - self.gamma
    }

    /// Weighted combination `α·a + β·b + γ·c`.
    pub fn interpolate<T>(&self, [a, b, c]: [T; 3]) -> T
    where
        T: Mul<f32, Output = T> + Add<Output = T>,
    {
        a * self.alpha() + b * self.beta + c * self.gamma
    }
}

/// Intersect a ray with the triangle `p0 p1 p2` within `ray_t`.
pub fn intersect(positions: [Vec3; 3], ray: &Ray, ray_t: Interval) -> Option<Barycentric> {
    let [p0, p1, p2] = positions;
    let a = p0 - p1;
    let b = p0 - p2;
    let d = ray.direction();
    let r = p0 - ray.origin();

    let b_cross_d = b.cross(d);
    let denominator = a.dot(b_cross_d);
    if denominator.abs() < PARALLEL_EPSILON || !denominator.is_finite() {
        return None;
    }

    let beta = r.dot(b_cross_d) / denominator;
    if !(0.0..=1.0).contains(&beta) {
        return None;
    }
    let gamma = a.dot(r.cross(d)) / denominator;
    if !(0.0..=1.0).contains(&gamma) || beta + gamma > 1.0 {
        return None;
    }
    let t = a.dot(b.cross(r)) / denominator;
    if !ray_t.contains(t) {
        return None;
    }

    Some(Barycentric { t, beta, gamma })
}

/// Bounds of three points, padded on every axis.
pub(crate) fn padded_bounds(positions: [Vec3; 3]) -> Aabb {
    let bbox = Aabb::enclosing(positions);
    Aabb::new(
        bbox.min() - Vec3::splat(BOX_PADDING),
        bbox.max() + Vec3::splat(BOX_PADDING),
    )
}

/// A free-standing triangle with a flat normal.
pub struct Triangle {
    positions: [Vec3; 3],
    tex_coords: [Vec2; 3],
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    material: Option<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The normal follows the counter-clockwise winding `p0 → p1 → p2`.
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let positions = [p0, p1, p2];
        Self {
            positions,
            tex_coords: [Vec2::ZERO; 3],
            normal: (p1 - p0).cross(p2 - p0).normalize_or_zero(),
            material: None,
            bbox: padded_bounds(positions),
        }
    }

    /// Set per-vertex texture coordinates.
    pub fn with_tex_coords(mut self, tex_coords: [Vec2; 3]) -> Self {
        self.tex_coords = tex_coords;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn positions(&self) -> [Vec3; 3] {
        self.positions
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Shape for Triangle {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let bary = intersect(self.positions, ray, ray_t)?;
        Some(HitRecord::new(
            ray,
            bary.t,
            self.normal,
            bary.interpolate(self.tex_coords),
            self,
        ))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<&dyn Shape> {
        intersect(self.positions, ray, ray_t).map(|_| self as &dyn Shape)
    }

    fn centre(&self) -> Vec3 {
        (self.positions[0] + self.positions[1] + self.positions[2]) / 3.0
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const WINDOW: Interval = Interval::new(1e-4, 1e6);

    fn unit_triangle() -> Triangle {
        // Triangle in XY plane at z=-1
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = tri.hit(&ray, WINDOW).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
        assert!(tri.shadow_hit(&ray, WINDOW).is_some());
    }

    #[test]
    fn test_triangle_miss() {
        let tri = unit_triangle();

        // Ray pointing away
        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(tri.hit(&away, WINDOW).is_none());

        // Passes beside the triangle
        let beside = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&beside, WINDOW).is_none());
        assert!(tri.shadow_hit(&beside, WINDOW).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 0.0));

        assert!(tri.hit(&ray, WINDOW).is_none());
    }

    #[test]
    fn test_normal_faces_ray_from_behind() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));

        let rec = tri.hit(&ray, WINDOW).unwrap();
        assert!((rec.normal + Vec3::Z).length() < 1e-5);
        assert!(!rec.front_face);
    }

    #[test]
    fn test_barycentric_reconstructs_hit_point() {
        let mut rng = StdRng::seed_from_u64(7);
        let positions = [
            Vec3::new(-3.0, 0.5, -4.0),
            Vec3::new(2.0, -1.0, -6.0),
            Vec3::new(0.5, 3.0, -5.0),
        ];
        let mut hits = 0;

        for _ in 0..500 {
            let target = Vec3::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-1.5..3.5),
                -5.0,
            );
            let origin = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 2.0);
            let ray = Ray::new(origin, target - origin);

            if let Some(bary) = intersect(positions, &ray, WINDOW) {
                hits += 1;
                let reconstructed = bary.interpolate(positions);
                assert!(
                    (reconstructed - ray.at(bary.t)).length() < 1e-3,
                    "{reconstructed:?} vs {:?}",
                    ray.at(bary.t)
                );
                assert!((bary.alpha() + bary.beta + bary.gamma - 1.0).abs() < 1e-6);
            }
        }
        assert!(hits > 20);
    }

    #[test]
    fn test_tex_coords_interpolated() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
        .with_tex_coords([Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]);

        let ray = Ray::new(Vec3::new(0.25, 0.5, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = tri.hit(&ray, WINDOW).unwrap();
        assert!((rec.tex_coord - Vec2::new(0.25, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_centre_and_bounds() {
        let tri = unit_triangle();

        assert!((tri.centre() - Vec3::new(0.0, -1.0 / 3.0, -1.0)).length() < 1e-6);
        // Flat in z but the box keeps a thickness
        assert!(tri.bounding_box().max().z > tri.bounding_box().min().z);
    }
}
