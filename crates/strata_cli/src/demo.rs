//! The demo scene: four spheres, a textured sky box, heightmap terrain and
//! two point lights, seen from one of three cameras.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use strata_core::loaders::{
    obj_mesh, terrain_mesh, SKYBOX_SIZE, TERRAIN_CELL_SIZE, TERRAIN_MAX_HEIGHT,
};
use strata_core::{Image, Material, PointLight, ResourceManager, TerrainHeightTexture, Texture};
use strata_math::{Aabb, Colour, Interval, Vec3};
use strata_renderer::{
    line_shapes, mesh_shapes, skybox, terrain_octree, terrain_shape, BoundingShape, Camera, Octree,
    Raytracer, Rect, Shape, ShapeHandle, Sphere,
};

use crate::settings::TerrainVariant;

const SCENE_EXTENT: f32 = 10000.0;
const DEBUG_LINE_THICKNESS: f32 = 0.3;

const TERRAIN_IMAGES: [&str; 4] = ["terrain_dirt", "terrain_grass", "terrain_rock", "terrain_snow"];
const SKYBOX_IMAGES: [&str; 6] = [
    "miramar_ft",
    "miramar_rt",
    "miramar_bk",
    "miramar_lf",
    "miramar_up",
    "miramar_dn",
];

/// Scene content plus the pieces the command line can swap in and out.
pub struct DemoScene {
    pub root: BoundingShape,
    pub cameras: Vec<Camera>,
    pub lights: Vec<PointLight>,
    pub resources: ResourceManager,
    /// Flat and octree terrain; `None` while placed in the root
    terrain: [Option<Box<dyn Shape>>; 2],
    active_terrain: Option<(ShapeHandle, usize)>,
    debug: Option<Octree>,
}

fn scene_boundary() -> Aabb {
    Aabb::new(Vec3::splat(-SCENE_EXTENT), Vec3::splat(SCENE_EXTENT))
}

fn spheres() -> Vec<Box<dyn Shape>> {
    let blue = Material::new(Colour::new(0.4, 0.4, 0.8)).with_intensities(0.5, 1.2, 0.5, 20.0);
    let mirror = Material::default()
        .with_intensities(0.5, 3.0, 1.0, 20.0)
        .with_reflectivity(1.0);
    let glass = Material::new(Colour::new(0.8, 0.2, 0.2))
        .with_intensities(0.5, 1.2, 0.5, 20.0)
        .with_reflectivity(0.5)
        .with_refractive_index(1.6666);
    let lamp = Material::new(Colour::new(0.9, 0.65, 0.0))
        .with_intensities(5.0, 0.0, 0.0, 0.0)
        .with_reflectivity(0.4);

    vec![
        Box::new(Sphere::new(Vec3::new(0.0, 8.0, -25.0), 2.0).with_material(blue)),
        Box::new(Sphere::new(Vec3::new(-4.0, 10.0, -20.0), 2.0).with_material(mirror)),
        Box::new(Sphere::new(Vec3::new(0.0, 5.0, -15.0), 2.0).with_material(glass)),
        Box::new(Sphere::new(Vec3::new(3.0, 5.0, -26.5), 1.0).with_material(lamp)),
    ]
}

fn cameras() -> Vec<Camera> {
    let rect = Rect::new(-100.0, 100.0, -100.0, 100.0);
    [
        (Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
        (Vec3::new(-10.0, 3.0, -10.0), Vec3::new(1.0, 0.2, -1.0)),
        (Vec3::new(5.0, 30.0, -50.0), Vec3::new(0.0, -0.6, 1.0)),
    ]
    .into_iter()
    .map(|(position, direction)| Camera::new(position, direction, Vec3::Y, rect, 200.0))
    .collect()
}

fn lights() -> Vec<PointLight> {
    vec![
        PointLight::new(
            Vec3::new(-100.0, 70.0, 100.0),
            Colour::splat(0.2),
            Colour::splat(0.4),
            Colour::WHITE,
        ),
        // Sits inside the lamp sphere
        PointLight::new(
            Vec3::new(3.0, 5.0, -26.5),
            Colour::BLACK,
            Colour::new(0.6, 0.76, 0.0),
            Colour::new(1.0, 0.3, 0.0),
        ),
    ]
}

/// Load `dir/<name>.tga` into the resource manager, or warn and skip it.
fn optional_image(resources: &mut ResourceManager, dir: &Path, name: &str) -> Option<Arc<Image>> {
    let path = dir.join(format!("{name}.tga"));
    match resources.load_image(name, &path) {
        Ok(image) => Some(image),
        Err(err) => {
            log::warn!("Skipping {}: {}", path.display(), err);
            None
        }
    }
}

fn sky_textures(resources: &mut ResourceManager, dir: &Path) -> [Option<Arc<dyn Texture>>; 6] {
    SKYBOX_IMAGES.map(|name| {
        optional_image(resources, dir, name)?;
        resources.create_texture(format!("{name}_texture"), name).ok()
    })
}

fn terrain_material(resources: &mut ResourceManager, dir: &Path) -> Material {
    let material = Material::new(Colour::new(0.35, 0.5, 0.25)).with_intensities(1.0, 1.0, 0.0, 1.0);
    let layers: Vec<Arc<Image>> = TERRAIN_IMAGES
        .iter()
        .filter_map(|name| optional_image(resources, dir, name))
        .collect();
    match <[Arc<Image>; 4]>::try_from(layers) {
        Ok(layers) => {
            let texture = TerrainHeightTexture::new(layers, Interval::new(0.0, TERRAIN_MAX_HEIGHT));
            material.with_texture(resources.insert_texture("terrain", Arc::new(texture)))
        }
        Err(_) => {
            log::warn!("Terrain layers incomplete, using a flat colour");
            material
        }
    }
}

impl DemoScene {
    /// Assemble the scene from the images in `resource_dir`.
    ///
    /// Missing images degrade the scene (grey sky, untextured or absent
    /// terrain) instead of failing.
    pub fn build(resource_dir: &Path) -> Self {
        let mut resources = ResourceManager::new();

        let mut root = BoundingShape::new(spheres(), scene_boundary());
        // Ambient-only; the key light's ambient term brings textures to full brightness
        let sky_material = Material::new(Colour::WHITE).with_intensities(5.0, 0.0, 0.0, 1.0);
        let sky = skybox(
            Vec3::ZERO,
            SKYBOX_SIZE,
            sky_textures(&mut resources, resource_dir),
            &sky_material,
        );
        root.add(Box::new(sky));

        let mut terrain: [Option<Box<dyn Shape>>; 2] = [None, None];
        let mut debug = None;
        if let Some(heightmap) = optional_image(&mut resources, resource_dir, "heightmap") {
            let material = terrain_material(&mut resources, resource_dir);
            let offset = Vec3::new(
                -(TERRAIN_CELL_SIZE * heightmap.width() as f32) / 2.0,
                0.0,
                -(TERRAIN_CELL_SIZE * heightmap.height() as f32) / 2.0,
            );
            let mesh =
                terrain_mesh(&heightmap, TERRAIN_CELL_SIZE, TERRAIN_MAX_HEIGHT, offset, material);
            match mesh {
                Ok(mesh) => {
                    let mesh = resources.create_mesh("terrain", mesh);
                    let tree = terrain_octree(&mesh);
                    debug = Some(debug_overlay(&tree));
                    terrain = [Some(terrain_shape(&mesh, false)), Some(Box::new(tree))];
                }
                Err(err) => log::warn!("Skipping terrain: {}", err),
            }
        }

        Self {
            root,
            cameras: cameras(),
            lights: lights(),
            resources,
            terrain,
            active_terrain: None,
            debug,
        }
    }

    /// Add a red OBJ model to the scene.
    pub fn add_model(&mut self, path: &Path, translation: Vec3, scale: f32) -> Result<ShapeHandle> {
        let material =
            Material::new(Colour::new(0.8, 0.2, 0.2)).with_intensities(0.3, 0.8, 0.4, 16.0);
        let mesh = obj_mesh(path, translation, scale, material)
            .with_context(|| format!("Failed to load model {}", path.display()))?;
        let mesh = self.resources.create_mesh(path.display().to_string(), mesh);
        Ok(self.root.add(Box::new(BoundingShape::from_shapes(mesh_shapes(&mesh)))))
    }

    pub fn has_terrain(&self) -> bool {
        self.terrain.iter().any(Option::is_some) || self.active_terrain.is_some()
    }

    /// Swap the terrain in the scene root for `variant`.
    pub fn select_terrain(&mut self, variant: TerrainVariant) {
        if let Some((handle, slot)) = self.active_terrain.take() {
            self.terrain[slot] = self.root.remove(handle);
        }
        let slot = match variant {
            TerrainVariant::None => return,
            TerrainVariant::Flat => 0,
            TerrainVariant::Octree => 1,
        };
        match self.terrain[slot].take() {
            Some(shape) => self.active_terrain = Some((self.root.add(shape), slot)),
            None => log::warn!("No terrain loaded, {:?} variant unavailable", variant),
        }
    }

    /// Hand the scene to a ray tracer looking through camera `index`.
    pub fn into_raytracer(
        self,
        index: usize,
        orthographic: bool,
        show_debug: bool,
    ) -> Result<Raytracer> {
        let Some(camera) = self.cameras.get(index) else {
            bail!("Camera {} out of range, the demo has {}", index, self.cameras.len());
        };
        let mut raytracer = Raytracer::new(camera.clone().with_orthographic(orthographic));
        raytracer.set_root_shape(Box::new(self.root));
        for light in self.lights {
            raytracer.add_light(light);
        }
        if let Some(debug) = self.debug {
            raytracer.set_debug_shape(Box::new(debug));
        }
        raytracer.show_debug_shapes(show_debug);
        Ok(raytracer)
    }
}

/// Thin ribbons along every node box of the terrain octree.
fn debug_overlay(tree: &Octree) -> Octree {
    let marker = Material::new(Colour::new(1.0, 0.1, 0.1)).with_intensities(5.0, 0.0, 0.0, 1.0);
    let mut overlay = Octree::new(scene_boundary());
    for shape in line_shapes(&tree.bounding_lines(), DEBUG_LINE_THICKNESS, Some(&marker)) {
        overlay.insert(shape);
    }
    overlay
}
