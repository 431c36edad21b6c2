//! Triangles that index into a shared mesh.

use std::sync::Arc;

use strata_core::{Material, Mesh};
use strata_math::{Aabb, Interval, Ray, Vec3};

use crate::shape::{HitRecord, Shape};
use crate::triangle::{intersect, padded_bounds};

/// One triangle of an `Arc<Mesh>`.
///
/// Normals and texture coordinates are interpolated from the mesh vertices.
pub struct MeshTriangle {
    mesh: Arc<Mesh>,
    index: usize,
    bbox: Aabb,
}

impl MeshTriangle {
    /// # Panics
    /// If `index` is not a triangle of `mesh`.
    pub fn new(mesh: Arc<Mesh>, index: usize) -> Self {
        assert!(
            index < mesh.triangle_count(),
            "triangle {index} out of range for mesh with {} triangles",
            mesh.triangle_count()
        );
        let bbox = padded_bounds(Self::positions_of(&mesh, index));
        Self { mesh, index, bbox }
    }

    fn positions_of(mesh: &Mesh, index: usize) -> [Vec3; 3] {
        mesh.triangle(index).map(|v| v.position)
    }

    pub fn positions(&self) -> [Vec3; 3] {
        Self::positions_of(&self.mesh, self.index)
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Shape for MeshTriangle {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let vertices = self.mesh.triangle(self.index);
        let bary = intersect(vertices.map(|v| v.position), ray, ray_t)?;

        let normal = bary.interpolate(vertices.map(|v| v.normal));
        let normal = normal.try_normalize().unwrap_or_else(|| {
            let [p0, p1, p2] = vertices.map(|v| v.position);
            (p1 - p0).cross(p2 - p0).normalize_or_zero()
        });
        let tex_coord = bary.interpolate(vertices.map(|v| v.tex_coord));

        Some(HitRecord::new(ray, bary.t, normal, tex_coord, self))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> Option<&dyn Shape> {
        intersect(self.positions(), ray, ray_t).map(|_| self as &dyn Shape)
    }

    fn centre(&self) -> Vec3 {
        let [p0, p1, p2] = self.positions();
        (p0 + p1 + p2) / 3.0
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn material(&self) -> Option<&Material> {
        Some(self.mesh.material())
    }
}

/// One boxed `MeshTriangle` per triangle of the mesh.
pub fn mesh_shapes(mesh: &Arc<Mesh>) -> Vec<Box<dyn Shape>> {
    (0..mesh.triangle_count())
        .map(|index| Box::new(MeshTriangle::new(Arc::clone(mesh), index)) as Box<dyn Shape>)
        .collect()
}
