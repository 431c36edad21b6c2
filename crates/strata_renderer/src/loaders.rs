//! Scene assembly helpers: terrain shapes, sky boxes and debug lines.

use std::sync::Arc;

use strata_core::{Material, Mesh, Texture};
use strata_math::{Aabb, Colour, Vec2, Vec3};

use crate::mesh_triangle::mesh_shapes;
use crate::{BoundingShape, Octree, Shape, Triangle};

/// Padding added around mesh bounds so every triangle box fits inside.
const BOUNDS_PADDING: f32 = 1e-3;

fn padded(bbox: Aabb, amount: f32) -> Aabb {
    if bbox.is_empty() {
        return bbox;
    }
    Aabb::new(bbox.min() - Vec3::splat(amount), bbox.max() + Vec3::splat(amount))
}

/// Wrap every triangle of a terrain mesh in one shape.
///
/// With `use_octree` the triangles go into an [`Octree`] over the mesh
/// bounds, otherwise into a flat [`BoundingShape`].
pub fn terrain_shape(mesh: &Arc<Mesh>, use_octree: bool) -> Box<dyn Shape> {
    if use_octree {
        return Box::new(terrain_octree(mesh));
    }
    let shapes = mesh_shapes(mesh);
    log::debug!("Built flat terrain shape: {} triangles", shapes.len());
    Box::new(BoundingShape::new(shapes, padded(mesh.bounds(), BOUNDS_PADDING)))
}

/// Octree over every triangle of a mesh, bounded by the mesh bounds.
pub fn terrain_octree(mesh: &Arc<Mesh>) -> Octree {
    Octree::from_shapes(padded(mesh.bounds(), BOUNDS_PADDING), mesh_shapes(mesh))
}

/// Sky box faces in texture order.
pub const SKYBOX_FACES: [&str; 6] = ["front", "right", "back", "left", "up", "down"];

/// Build a textured cube of half-size `size` around `centre`, seen from inside.
///
/// `textures` follow [`SKYBOX_FACES`]; each texture is upright when seen from
/// the centre. `material` is the template for every face: textured faces
/// take their texture, untextured faces are flat grey.
pub fn skybox(
    centre: Vec3,
    size: f32,
    textures: [Option<Arc<dyn Texture>>; 6],
    material: &Material,
) -> BoundingShape {
    let s = size;
    // Bottom-left, bottom-right, top-right, top-left of each face
    let corners: [[Vec3; 4]; 6] = [
        [
            Vec3::new(-s, -s, -s),
            Vec3::new(s, -s, -s),
            Vec3::new(s, s, -s),
            Vec3::new(-s, s, -s),
        ],
        [
            Vec3::new(s, -s, -s),
            Vec3::new(s, -s, s),
            Vec3::new(s, s, s),
            Vec3::new(s, s, -s),
        ],
        [
            Vec3::new(s, -s, s),
            Vec3::new(-s, -s, s),
            Vec3::new(-s, s, s),
            Vec3::new(s, s, s),
        ],
        [
            Vec3::new(-s, -s, s),
            Vec3::new(-s, -s, -s),
            Vec3::new(-s, s, -s),
            Vec3::new(-s, s, s),
        ],
        [
            Vec3::new(-s, s, -s),
            Vec3::new(s, s, -s),
            Vec3::new(s, s, s),
            Vec3::new(-s, s, s),
        ],
        [
            Vec3::new(-s, -s, s),
            Vec3::new(s, -s, s),
            Vec3::new(s, -s, -s),
            Vec3::new(-s, -s, -s),
        ],
    ];
    // Image row 0 is the top of the picture
    let uv = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];

    let mut shapes: Vec<Box<dyn Shape>> = Vec::with_capacity(12);
    for (face, texture) in corners.iter().zip(textures) {
        let face_material = match texture {
            Some(texture) => material.clone().with_texture(texture),
            None => {
                let mut grey = material.clone();
                grey.texture = None;
                grey.colour = Colour::splat(0.5);
                grey
            }
        };
        let [bl, br, tr, tl] = face.map(|corner| centre + corner);
        shapes.push(Box::new(
            Triangle::new(bl, br, tr)
                .with_tex_coords([uv[0], uv[1], uv[2]])
                .with_material(face_material.clone()),
        ));
        shapes.push(Box::new(
            Triangle::new(bl, tr, tl)
                .with_tex_coords([uv[0], uv[2], uv[3]])
                .with_material(face_material),
        ));
    }

    BoundingShape::from_shapes(shapes)
}

/// A straight line segment in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Vec3,
    pub end: Vec3,
}

impl Line {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// The twelve edges of a box.
    pub fn box_edges(bbox: &Aabb) -> [Line; 12] {
        let corner = |i: usize| {
            Vec3::new(
                bbox.bounds[i & 1].x,
                bbox.bounds[(i >> 1) & 1].y,
                bbox.bounds[(i >> 2) & 1].z,
            )
        };
        // Four edges per axis, joining corners that differ only in that bit
        std::array::from_fn(|i| {
            let axis = i / 4;
            let low = i % 4;
            let start = ((low >> axis) << (axis + 1)) | (low & ((1 << axis) - 1));
            Line::new(corner(start), corner(start | (1 << axis)))
        })
    }
}

/// Turn each line into a thin ribbon of two triangles, `thickness` wide.
///
/// Ribbons are widened along Y, or along X for lines that run mostly along Y.
pub fn line_shapes(
    lines: &[Line],
    thickness: f32,
    material: Option<&Material>,
) -> Vec<Box<dyn Shape>> {
    let half = thickness / 2.0;
    let mut shapes: Vec<Box<dyn Shape>> = Vec::with_capacity(lines.len() * 2);

    for line in lines {
        let direction = (line.end - line.start).normalize_or_zero();
        let axis = if direction.y.abs() > 0.9 { Vec3::X } else { Vec3::Y };
        let widen = axis * half;
        let quad = [
            line.start - widen,
            line.start + widen,
            line.end - widen,
            line.end + widen,
        ];

        let mut first = Triangle::new(quad[0], quad[1], quad[2]);
        let mut second = Triangle::new(quad[1], quad[3], quad[2]);
        if let Some(material) = material {
            first = first.with_material(material.clone());
            second = second.with_material(material.clone());
        }
        shapes.push(Box::new(first));
        shapes.push(Box::new(second));
    }

    shapes
}
