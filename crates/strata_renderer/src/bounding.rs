//! Flat aggregate of shapes behind a single bounding box.

use strata_math::{Aabb, Interval, Ray, Vec3};

use crate::shape::{first_occluder, nearest_hit, HitRecord, Shape, ShapeHandle};

/// A list of shapes pruned by one caller-supplied bounding box.
///
/// Children are owned; the aggregate can grow and shrink after construction.
pub struct BoundingShape {
    children: Vec<Box<dyn Shape>>,
    bbox: Aabb,
}

impl BoundingShape {
    /// Create an aggregate over `children` bounded by `bbox`.
    pub fn new(children: Vec<Box<dyn Shape>>, bbox: Aabb) -> Self {
        Self { children, bbox }
    }

    /// Create an aggregate bounded by the union of its children's boxes.
    pub fn from_shapes(children: Vec<Box<dyn Shape>>) -> Self {
        let bbox = children
            .iter()
            .fold(Aabb::EMPTY, |acc, c| Aabb::surrounding(&acc, &c.bounding_box()));
        Self { children, bbox }
    }

    /// Add a child, returning the handle that removes it again.
    pub fn add(&mut self, shape: Box<dyn Shape>) -> ShapeHandle {
        let handle = ShapeHandle::of(shape.as_ref());
        self.children.push(shape);
        handle
    }

    /// Remove and return the child with `handle`; unknown handles are ignored.
    pub fn remove(&mut self, handle: ShapeHandle) -> Option<Box<dyn Shape>> {
        let index = self
            .children
            .iter()
            .position(|c| ShapeHandle::of(c.as_ref()) == handle)?;
        Some(self.children.remove(index))
    }

    pub fn children(&self) -> &[Box<dyn Shape>] {
        &self.children
    }

    /// Get the number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if the aggregate is empty.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Shape for BoundingShape {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        if !self.bbox.intersects(ray, ray_t) {
            return None;
        }
        nearest_hit(&self.children, ray, ray_t)
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<&dyn Shape> {
        if !self.bbox.intersects(ray, ray_t) {
            return None;
        }
        first_occluder(&self.children, ray, ray_t)
    }

    fn centre(&self) -> Vec3 {
        self.bbox.centre()
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
