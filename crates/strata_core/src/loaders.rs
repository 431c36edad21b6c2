//! Mesh builders for heightmap terrain and Wavefront OBJ files.

use std::path::Path;

use strata_math::{Vec2, Vec3};

use crate::{CoreError, CoreResult, Image, Material, Mesh, Vertex};

/// Height of the highest terrain point in world units.
pub const TERRAIN_MAX_HEIGHT: f32 = 100.0;
/// Size of one cell of the terrain vertex grid.
pub const TERRAIN_CELL_SIZE: f32 = 10.0;
/// Length of one side of the sky box.
pub const SKYBOX_SIZE: f32 = 200.0;

/// Build a terrain grid from a heightmap.
///
/// Pixel (x, y) becomes the vertex `offset + (x * cell_size, max_height * red,
/// y * cell_size)`. Each grid cell is split into two triangles wound
/// counter-clockwise seen from above, and texture coordinates span [0, 1]
/// across the grid.
pub fn terrain_mesh(
    heightmap: &Image,
    cell_size: f32,
    max_height: f32,
    offset: Vec3,
    material: Material,
) -> CoreResult<Mesh> {
    let columns = heightmap.width();
    let rows = heightmap.height();
    if columns < 2 || rows < 2 {
        return Err(CoreError::EmptyMesh("terrain cells"));
    }

    let mut vertices = Vec::with_capacity((columns * rows) as usize);
    for y in 0..rows {
        for x in 0..columns {
            let height = heightmap.get(x, y).map_or(0.0, |c| c.r);
            let position = offset
                + Vec3::new(x as f32 * cell_size, max_height * height, y as f32 * cell_size);
            let tex_coord = Vec2::new(
                x as f32 / (columns - 1) as f32,
                y as f32 / (rows - 1) as f32,
            );
            vertices.push(Vertex::new(position, Vec3::Y, tex_coord));
        }
    }

    let mut triangles = Vec::with_capacity(((columns - 1) * (rows - 1) * 2) as usize);
    for y in 0..rows - 1 {
        for x in 0..columns - 1 {
            let i = y * columns + x;
            triangles.push([i, i + columns, i + 1]);
            triangles.push([i + 1, i + columns, i + columns + 1]);
        }
    }

    let mut mesh = Mesh::new(vertices, triangles, material);
    mesh.compute_normals();
    log::debug!(
        "Built terrain mesh: {}x{} grid, {} triangles",
        columns,
        rows,
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load the first model of an OBJ file, scaled then translated.
///
/// Missing normals are computed from the faces; missing texture coordinates
/// are left at zero.
pub fn obj_mesh(
    path: impl AsRef<Path>,
    translation: Vec3,
    scale: f32,
    material: Material,
) -> CoreResult<Mesh> {
    let path = path.as_ref();
    let (models, _materials) =
        tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| CoreError::Obj {
            path: path.to_path_buf(),
            source,
        })?;
    let model = models.first().ok_or(CoreError::EmptyMesh("models"))?;
    let source = &model.mesh;

    // Trailing values that don't form a full vector are ignored
    let positions: Vec<Vec3> = source
        .positions
        .chunks_exact(3)
        .map(|p| translation + Vec3::new(p[0], p[1], p[2]) * scale)
        .collect();
    if positions.is_empty() {
        return Err(CoreError::EmptyMesh("vertices"));
    }
    let has_normals = source.normals.len() == source.positions.len();
    let has_tex_coords = source.texcoords.len() / 2 == positions.len();

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let normal = if has_normals {
                Vec3::from_slice(&source.normals[3 * i..3 * i + 3]).normalize_or_zero()
            } else {
                Vec3::ZERO
            };
            let tex_coord = if has_tex_coords {
                Vec2::from_slice(&source.texcoords[2 * i..2 * i + 2])
            } else {
                Vec2::ZERO
            };
            Vertex::new(position, normal, tex_coord)
        })
        .collect();

    let triangles: Vec<[u32; 3]> = source
        .indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();
    if triangles.is_empty() {
        return Err(CoreError::EmptyMesh("triangles"));
    }

    let mut mesh = Mesh::new(vertices, triangles, material);
    if !has_normals {
        mesh.compute_normals();
    }
    log::info!(
        "Loaded OBJ {} ({}): {} vertices, {} triangles",
        path.display(),
        model.name,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_math::Colour;

    #[test]
    fn test_terrain_grid() {
        let mut heightmap = Image::new(3, 2, Colour::BLACK);
        heightmap.set(1, 1, Colour::WHITE);

        let offset = Vec3::new(-5.0, 0.0, 0.0);
        let mesh = terrain_mesh(&heightmap, 10.0, 100.0, offset, Material::default()).unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 4);
        // Vertex (1, 1) is raised to full height
        assert_eq!(mesh.vertices()[4].position, Vec3::new(5.0, 100.0, 10.0));
        assert_eq!(mesh.vertices()[5].tex_coord, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_flat_terrain_normals_point_up() {
        let heightmap = Image::new(4, 4, Colour::splat(0.5));
        let mesh = terrain_mesh(&heightmap, 1.0, 10.0, Vec3::ZERO, Material::default()).unwrap();

        for vertex in mesh.vertices() {
            assert!((vertex.normal - Vec3::Y).length() < 1e-5);
            assert_eq!(vertex.position.y, 5.0);
        }
    }

    #[test]
    fn test_terrain_needs_two_rows() {
        let heightmap = Image::new(5, 1, Colour::BLACK);
        assert!(matches!(
            terrain_mesh(&heightmap, 1.0, 1.0, Vec3::ZERO, Material::default()),
            Err(CoreError::EmptyMesh(_))
        ));
    }

    #[test]
    fn test_obj_mesh() {
        let path = std::env::temp_dir().join(format!("strata_loader_{}.obj", std::process::id()));
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 3 4\n",
        )
        .unwrap();

        let mesh = obj_mesh(&path, Vec3::new(0.0, 0.0, -2.0), 2.0, Material::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.bounds().min(), Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(mesh.bounds().max(), Vec3::new(2.0, 2.0, -2.0));
        assert!((mesh.vertices()[0].normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_obj_missing_file() {
        let result = obj_mesh("/nonexistent/strata.obj", Vec3::ZERO, 1.0, Material::default());
        assert!(matches!(result, Err(CoreError::Obj { .. })));
    }
}
