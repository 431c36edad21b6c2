//! Sphere primitive for ray tracing.

use std::f32::consts::PI;

use strata_core::Material;
use strata_math::{Aabb, Interval, Ray, Vec2, Vec3};

use crate::shape::{HitRecord, Shape};

/// A sphere primitive.
pub struct Sphere {
    centre: Vec3,
    radius: f32,
    material: Option<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(centre: Vec3, radius: f32) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(centre - rvec, centre + rvec);

        Self {
            centre,
            radius,
            material: None,
            bbox,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Spherical texture mapping for a point on the unit sphere.
    fn sphere_uv(d: Vec3) -> Vec2 {
        let u = 0.5 + d.z.atan2(d.x) / (2.0 * PI);
        let v = 0.5 - d.y.clamp(-1.0, 1.0).asin() / PI;
        Vec2::new(u, v)
    }

    /// Near root of the ray/sphere quadratic, if it lies within `ray_t`.
    ///
    /// The far root is never used: a ray starting inside the sphere misses it.
    fn near_root(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let oc = ray.origin() - self.centre;
        let a = ray.direction().length_squared();
        let b = 2.0 * ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        // Tangent rays count as misses
        let discriminant = b * b - 4.0 * a * c;
        if discriminant <= 0.0 || a == 0.0 {
            return None;
        }

        let t = (-b - discriminant.sqrt()) / (2.0 * a);
        ray_t.contains(t).then_some(t)
    }
}

impl Shape for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let t = self.near_root(ray, ray_t)?;
        let outward_normal = (ray.at(t) - self.centre) / self.radius;
        Some(HitRecord::new(
            ray,
            t,
            outward_normal,
            Self::sphere_uv(outward_normal),
            self,
        ))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<&dyn Shape> {
        self.near_root(ray, ray_t).map(|_| self as &dyn Shape)
    }

    fn centre(&self) -> Vec3 {
        self.centre
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

    const WINDOW: Interval = Interval::new(1e-4, 1e6);

    #[test]
    fn test_sphere_hit_near_surface() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere.hit(&ray, WINDOW).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
        assert!((rec.point - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        assert!(rec.front_face);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);

        // Offset ray passes at distance 2 from the centre
        let ray = Ray::new(Vec3::new(2.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&ray, WINDOW).is_none());
        assert!(sphere.shadow_hit(&ray, WINDOW).is_none());
    }

    #[test]
    fn test_tangent_ray_misses() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(1.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        assert!(sphere.hit(&ray, WINDOW).is_none());
    }

    #[test]
    fn test_near_root_only() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);

        // Origin inside the sphere: the near root is behind the ray
        let inside = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&inside, WINDOW).is_none());

        // Window ends before the near surface
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&ray, Interval::new(1e-4, 3.5)).is_none());
    }

    #[test]
    fn test_shadow_hit_reports_self() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let occluder = sphere.shadow_hit(&ray, WINDOW).unwrap();
        assert_eq!(occluder.centre(), sphere.centre());
    }

    #[test]
    fn test_texture_coordinates() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);

        // Straight down onto the north pole
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = sphere.hit(&ray, WINDOW).unwrap();
        assert!(rec.tex_coord.y.abs() < 1e-5);

        // Along -X onto the +X equator
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let rec = sphere.hit(&ray, WINDOW).unwrap();
        assert!((rec.tex_coord - Vec2::new(0.5, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_material_is_optional() {
        let plain = Sphere::new(Vec3::ZERO, 1.0);
        assert!(plain.material().is_none());

        let red = plain.with_material(Material::new(strata_math::Colour::new(1.0, 0.0, 0.0)));
        assert_eq!(red.material().unwrap().colour.r, 1.0);
    }
}
