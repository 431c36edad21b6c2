//! Shape trait and HitRecord for ray-object intersection.

use std::fmt;

use strata_core::Material;
use strata_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Unit surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Texture coordinate at the intersection
    pub tex_coord: Vec2,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Primitive that was hit
    pub shape: &'a dyn Shape,
}

impl<'a> HitRecord<'a> {
    /// Build a record, orienting `outward_normal` against the ray.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        tex_coord: Vec2,
        shape: &'a dyn Shape,
    ) -> Self {
        // If the ray and normal point in the same direction, we're inside
        let front_face = ray.direction().dot(outward_normal) <= 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        Self {
            t,
            point: ray.at(t),
            normal,
            tex_coord,
            front_face,
            shape,
        }
    }

    /// Identity of the primitive that was hit.
    pub fn handle(&self) -> ShapeHandle {
        ShapeHandle::of(self.shape)
    }
}

impl fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitRecord")
            .field("t", &self.t)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .field("tex_coord", &self.tex_coord)
            .field("front_face", &self.front_face)
            .field("shape", &self.handle())
            .finish()
    }
}

/// Anything a ray can be intersected with: primitives and aggregates alike.
pub trait Shape: Send + Sync {
    /// Nearest intersection of the ray within `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Any primitive blocking the ray within `ray_t`.
    ///
    /// Aggregates return the first occluder found rather than the nearest.
    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<&dyn Shape>;

    /// Representative point used for spatial partitioning.
    fn centre(&self) -> Vec3;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Surface material, or `None` to shade with the renderer's default.
    fn material(&self) -> Option<&Material> {
        None
    }
}

/// Identity of a shape, taken from its address.
///
/// Boxed shapes never move, so the handle of a shape stays valid for as long
/// as the box lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapeHandle(usize);

impl ShapeHandle {
    pub fn of(shape: &dyn Shape) -> Self {
        Self(shape as *const dyn Shape as *const () as usize)
    }
}

/// Nearest hit over a list of shapes, narrowing the interval as hits are found.
pub(crate) fn nearest_hit<'a>(
    shapes: &'a [Box<dyn Shape>],
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let mut closest: Option<HitRecord<'a>> = None;
    for shape in shapes {
        let interval = closest.map_or(ray_t, |rec| ray_t.with_max(rec.t));
        if let Some(rec) = shape.hit(ray, interval) {
            closest = Some(rec);
        }
    }
    closest
}

/// First occluder in a list of shapes.
pub(crate) fn first_occluder<'a>(
    shapes: &'a [Box<dyn Shape>],
    ray: &Ray,
    ray_t: Interval,
) -> Option<&'a dyn Shape> {
    shapes.iter().find_map(|shape| shape.shadow_hit(ray, ray_t))
}
