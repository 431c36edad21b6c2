//! Strata Renderer - CPU Whitted-style ray tracing.
//!
//! Shapes, spatial acceleration, the camera and the shading engine, plus a
//! bucketed parallel driver that renders a whole image.
//!
//! A typical render:
//!
//! ```ignore
//! let mut raytracer = Raytracer::new(camera);
//! raytracer.set_root_shape(Box::new(BoundingShape::from_shapes(shapes)));
//! raytracer.add_light(light);
//! let output = render(&raytracer, &RenderConfig::default(), &AtomicBool::new(false));
//! output.image.save_tga("out.tga")?;
//! ```

mod bounding;
mod bucket;
mod camera;
mod loaders;
mod mesh_triangle;
mod octree;
mod raytracer;
mod renderer;
mod sampling;
mod shape;
mod sphere;
mod triangle;

pub use bounding::BoundingShape;
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, Rect};
pub use loaders::{line_shapes, skybox, terrain_octree, terrain_shape, Line, SKYBOX_FACES};
pub use mesh_triangle::{mesh_shapes, MeshTriangle};
pub use octree::{Octree, DEFAULT_CAPACITY, DEFAULT_MAX_DEPTH, MAX_CHILDREN};
pub use raytracer::{
    fresnel, reflect, refract, RayStats, Raytracer, AIR_REFRACTIVE_INDEX, GLOBAL_WEIGHT,
    LOCAL_WEIGHT, MAX_RAY_DISTANCE, MAX_TRACE_DEPTH, RAY_EPSILON,
};
pub use renderer::{render, render_pixel, RenderConfig, RenderOutput};
pub use sampling::{gen_f32, random_unit_vector, Sampler};
pub use shape::{HitRecord, Shape, ShapeHandle};
pub use sphere::Sphere;
pub use triangle::{intersect as intersect_triangle, Barycentric, Triangle};

pub use strata_math::{Aabb, Colour, Interval, Ray, Vec2, Vec3};
