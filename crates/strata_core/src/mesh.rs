//! Triangle mesh geometry shared by many mesh triangles.
//!
//! A `Mesh` owns its vertex buffer and one material. The renderer wraps it in
//! an `Arc` and hands a clone to every triangle that indexes into it, so the
//! vertex data is stored once however many triangles refer to it.

use strata_math::{Aabb, Vec2, Vec3};

use crate::Material;

/// A mesh vertex with per-vertex normal and texture coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coord: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    /// Vertex with only a position; normal and texture coordinate are zero.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// Indexed triangle mesh with a single material.
#[derive(Clone, Debug)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    /// Counter-clockwise vertex index triples
    triangles: Vec<[u32; 3]>,
    material: Material,
    bounds: Aabb,
}

impl Mesh {
    /// Create a mesh, dropping any triangle that indexes past the vertex buffer.
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<[u32; 3]>, material: Material) -> Self {
        let vertex_count = vertices.len();
        let total = triangles.len();
        let triangles: Vec<[u32; 3]> = triangles
            .into_iter()
            .filter(|tri| tri.iter().all(|&i| (i as usize) < vertex_count))
            .collect();
        if triangles.len() != total {
            log::warn!(
                "Dropped {} triangles with out-of-range indices (vertex count: {})",
                total - triangles.len(),
                vertex_count
            );
        }
        let bounds = Aabb::enclosing(vertices.iter().map(|v| v.position));
        Self {
            vertices,
            triangles,
            material,
            bounds,
        }
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Each vertex normal is the normalized sum of the (area-weighted) normals
    /// of the faces sharing it. Vertices used by no face get +Y.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for &[i0, i1, i2] in &self.triangles {
            let p0 = self.vertices[i0 as usize].position;
            let p1 = self.vertices[i1 as usize].position;
            let p2 = self.vertices[i2 as usize].position;
            let face_normal = (p1 - p0).cross(p2 - p0);

            normals[i0 as usize] += face_normal;
            normals[i1 as usize] += face_normal;
            normals[i2 as usize] += face_normal;
        }

        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// The three vertices of triangle `index`.
    #[inline]
    pub fn triangle(&self, index: usize) -> [&Vertex; 3] {
        let [a, b, c] = self.triangles[index];
        [
            &self.vertices[a as usize],
            &self.vertices[b as usize],
            &self.vertices[c as usize],
        ]
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Get the mesh center (center of bounding box).
    pub fn centre(&self) -> Vec3 {
        self.bounds.centre()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let vertices = vec![
            Vertex::at(Vec3::new(0.0, 0.0, 0.0)),
            Vertex::at(Vec3::new(1.0, 0.0, 0.0)),
            Vertex::at(Vec3::new(0.0, 1.0, 0.0)),
            Vertex::at(Vec3::new(1.0, 1.0, 0.0)),
        ];
        Mesh::new(vertices, vec![[0, 1, 2], [1, 3, 2]], Material::default())
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = quad();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.bounds().max(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.centre(), Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_invalid_triangles_dropped() {
        let vertices = vec![Vertex::at(Vec3::ZERO); 3];
        let mesh = Mesh::new(vertices, vec![[0, 1, 2], [0, 1, 3]], Material::default());

        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_compute_normals_ccw() {
        let mut mesh = quad();
        mesh.compute_normals();

        // CCW winding viewed from +Z gives +Z normals
        for vertex in mesh.vertices() {
            assert!((vertex.normal - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_triangle_lookup() {
        let mesh = quad();
        let [a, b, c] = mesh.triangle(1);

        assert_eq!(a.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(b.position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(c.position, Vec3::new(0.0, 1.0, 0.0));
    }
}
