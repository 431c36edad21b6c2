//! Recursive Whitted-style shading engine.
//!
//! Each camera ray is traced to its nearest hit, shaded with ambient,
//! diffuse and specular terms from every point light (diffuse and specular
//! only when the light is not blocked), and, for reflective or refractive
//! materials, blended with the colours of recursively traced secondary rays.

use std::fmt;
use std::ops::AddAssign;

use rand::RngCore;
use strata_core::{Material, PointLight};
use strata_math::{Colour, Interval, Ray, Vec3};

use crate::sampling::random_unit_vector;
use crate::shape::{HitRecord, Shape, ShapeHandle};
use crate::Camera;

/// Depth past which secondary rays contribute nothing.
pub const MAX_TRACE_DEPTH: u32 = 10;
/// Farthest distance along a ray that is searched for hits.
pub const MAX_RAY_DISTANCE: f32 = 1.0e6;
/// Start of every search window, so rays never re-hit their own origin.
pub const RAY_EPSILON: f32 = 1.0e-4;
/// Refractive index of the medium camera rays start in.
pub const AIR_REFRACTIVE_INDEX: f32 = 1.0;
/// Weight of local illumination when secondary rays are traced.
pub const LOCAL_WEIGHT: f32 = 0.5;
/// Weight of reflected and refracted light when secondary rays are traced.
pub const GLOBAL_WEIGHT: f32 = 0.5;

/// Counts of rays cast, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayStats {
    pub primary: u64,
    pub reflected: u64,
    pub refracted: u64,
    pub shadow: u64,
}

impl RayStats {
    pub fn total(&self) -> u64 {
        self.primary + self.reflected + self.refracted + self.shadow
    }

    /// Add another accumulator's counts into this one.
    pub fn merge(&mut self, other: &RayStats) {
        self.primary += other.primary;
        self.reflected += other.reflected;
        self.refracted += other.refracted;
        self.shadow += other.shadow;
    }
}

impl AddAssign for RayStats {
    fn add_assign(&mut self, other: RayStats) {
        self.merge(&other);
    }
}

impl fmt::Display for RayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rays ({} primary, {} reflected, {} refracted, {} shadow)",
            self.total(),
            self.primary,
            self.reflected,
            self.refracted,
            self.shadow
        )
    }
}

/// Mirror `direction` about `normal`.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Bend unit `direction` through a surface with unit `normal` facing it.
///
/// `eta` is the ratio n1 / n2 of the refractive indices. Returns `None` on
/// total internal reflection.
pub fn refract(direction: Vec3, normal: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = (-direction.dot(normal)).min(1.0);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some((eta * direction + (eta * cos_i - k.sqrt()) * normal).normalize())
}

/// Fraction of light reflected at a boundary from index `n1` into `n2`.
///
/// Average of the s- and p-polarised Fresnel terms; 1 on total internal
/// reflection.
pub fn fresnel(cos_i: f32, n1: f32, n2: f32) -> f32 {
    let cos_i = cos_i.clamp(0.0, 1.0);
    let sin_t = n1 / n2 * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin_t * sin_t).sqrt();
    let rs = ((n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t)).powi(2);
    let rp = ((n1 * cos_t - n2 * cos_i) / (n1 * cos_t + n2 * cos_i)).powi(2);
    ((rs + rp) / 2.0).clamp(0.0, 1.0)
}

/// The shading engine: scene root, lights and camera.
///
/// The engine is read-only while tracing; ray counts go to a caller-owned
/// [`RayStats`] so parallel workers can each keep their own.
pub struct Raytracer {
    camera: Camera,
    root: Option<Box<dyn Shape>>,
    debug_root: Option<Box<dyn Shape>>,
    show_debug: bool,
    lights: Vec<PointLight>,
    default_material: Material,
}

impl Raytracer {
    /// Create an engine with no scene and no lights.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            root: None,
            debug_root: None,
            show_debug: false,
            lights: Vec::new(),
            default_material: Material::default(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Replace the scene root, returning the previous one.
    pub fn set_root_shape(&mut self, root: Box<dyn Shape>) -> Option<Box<dyn Shape>> {
        self.root.replace(root)
    }

    pub fn root_shape(&self) -> Option<&dyn Shape> {
        self.root.as_deref()
    }

    /// Set the debug overlay root, returning the previous one.
    pub fn set_debug_shape(&mut self, root: Box<dyn Shape>) -> Option<Box<dyn Shape>> {
        self.debug_root.replace(root)
    }

    /// Toggle whether the debug overlay is visible to camera rays.
    pub fn show_debug_shapes(&mut self, show: bool) {
        self.show_debug = show;
    }

    pub fn debug_shapes_visible(&self) -> bool {
        self.show_debug && self.debug_root.is_some()
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Material used for shapes that carry none.
    pub fn default_material(&self) -> &Material {
        &self.default_material
    }

    pub fn set_default_material(&mut self, material: Material) {
        self.default_material = material;
    }

    /// Trace the camera ray through normalized pixel coordinates (x, y).
    ///
    /// Returns `None` when the ray hits nothing.
    pub fn raytrace(&self, x: f32, y: f32, stats: &mut RayStats) -> Option<Colour> {
        let ray = self.camera.ray_to_pixel(x, y);
        stats.primary += 1;
        self.trace(&ray, None, 0, stats)
    }

    /// Average of `samples` camera rays through (x, y), each direction
    /// perturbed by a random unit vector scaled by `jitter`.
    ///
    /// Only rays that hit something are averaged; `None` if none did.
    ///
    /// # Panics
    /// If `samples` is zero.
    pub fn multisample(
        &self,
        x: f32,
        y: f32,
        jitter: f32,
        samples: u32,
        rng: &mut dyn RngCore,
        stats: &mut RayStats,
    ) -> Option<Colour> {
        assert!(samples > 0, "multisample needs at least one sample");
        let centre = self.camera.ray_to_pixel(x, y);
        let mut sum = Colour::BLACK;
        let mut hits = 0u32;

        for _ in 0..samples {
            let direction = centre.direction() + random_unit_vector(rng) * jitter;
            let ray = Ray::new(centre.origin(), direction.normalize_or_zero());
            stats.primary += 1;
            if let Some(colour) = self.trace(&ray, None, 0, stats) {
                sum += colour;
                hits += 1;
            }
        }

        (hits > 0).then(|| sum / hits as f32)
    }

    /// Colour seen along `ray`, or `None` on a miss or past the depth limit.
    ///
    /// `medium` is the shape whose interior the ray travels through, `None`
    /// for air.
    pub fn trace(
        &self,
        ray: &Ray,
        medium: Option<&dyn Shape>,
        depth: u32,
        stats: &mut RayStats,
    ) -> Option<Colour> {
        if depth > MAX_TRACE_DEPTH {
            return None;
        }
        let hit = self.nearest_hit(ray, Interval::new(RAY_EPSILON, MAX_RAY_DISTANCE))?;
        let material = hit.shape.material().unwrap_or(&self.default_material);
        let base = material.surface_colour(hit.tex_coord, hit.point);

        let local = self.local_illumination(ray, &hit, material, base, stats);
        if !material.has_secondary_rays() {
            return Some(local);
        }
        let global = self.global_illumination(ray, &hit, material, medium, depth, stats);
        Some(local * LOCAL_WEIGHT + global * GLOBAL_WEIGHT)
    }

    /// Nearest hit among the scene root and, when shown, the debug overlay.
    fn nearest_hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let scene = self.root.as_ref().and_then(|root| root.hit(ray, ray_t));
        if !self.show_debug {
            return scene;
        }
        let window = scene.map_or(ray_t, |rec| ray_t.with_max(rec.t));
        match self.debug_root.as_ref().and_then(|root| root.hit(ray, window)) {
            Some(overlay) => Some(overlay),
            None => scene,
        }
    }

    /// True when a shape other than the hit one blocks the light.
    fn occluded(&self, light: Vec3, hit: &HitRecord<'_>, stats: &mut RayStats) -> bool {
        let Some(root) = self.root.as_ref() else {
            return false;
        };
        stats.shadow += 1;
        // From the light to the hit point; t = 1 is the hit point itself
        let ray = Ray::new(light, hit.point - light);
        root.shadow_hit(&ray, Interval::new(RAY_EPSILON, 1.0 - RAY_EPSILON))
            .is_some_and(|occluder| ShapeHandle::of(occluder) != hit.handle())
    }

    fn local_illumination(
        &self,
        ray: &Ray,
        hit: &HitRecord<'_>,
        material: &Material,
        base: Colour,
        stats: &mut RayStats,
    ) -> Colour {
        let to_viewer = -ray.direction().normalize_or_zero();
        let mut colour = Colour::BLACK;

        for light in &self.lights {
            colour += light.ambient * base * material.ka;
            if self.occluded(light.position, hit, stats) {
                continue;
            }

            let to_light = light.direction_from(hit.point);
            let lambert = to_light.dot(hit.normal);
            if lambert <= 0.0 {
                continue;
            }
            colour += light.diffuse * base * (material.kd * lambert);

            if material.ks > 0.0 {
                let mirrored = reflect(-to_light, hit.normal);
                let highlight = mirrored.dot(to_viewer).max(0.0).powf(material.shininess);
                colour += light.specular * (material.ks * highlight);
            }
        }

        colour
    }

    fn global_illumination(
        &self,
        ray: &Ray,
        hit: &HitRecord<'_>,
        material: &Material,
        medium: Option<&dyn Shape>,
        depth: u32,
        stats: &mut RayStats,
    ) -> Colour {
        let direction = ray.direction().normalize_or_zero();
        let normal = hit.normal;

        // Entering a refractive shape passes from the current medium into
        // it; leaving one passes back out into air
        let (reflectance, refraction) = match material.refractive_index {
            Some(index) => {
                let (n1, n2, inside) = if hit.front_face {
                    let n1 = medium
                        .and_then(|shape| shape.material())
                        .and_then(|m| m.refractive_index)
                        .unwrap_or(AIR_REFRACTIVE_INDEX);
                    (n1, index, Some(hit.shape))
                } else {
                    (index, AIR_REFRACTIVE_INDEX, None)
                };
                match refract(direction, normal, n1 / n2) {
                    Some(bent) => (
                        fresnel(-direction.dot(normal), n1, n2),
                        Some((bent, inside)),
                    ),
                    None => (1.0, None),
                }
            }
            None => (material.reflectivity.unwrap_or(0.0), None),
        };

        let mut colour = Colour::BLACK;
        if reflectance > 0.0 {
            stats.reflected += 1;
            let reflected = Ray::new(hit.point, reflect(direction, normal));
            if let Some(seen) = self.trace(&reflected, medium, depth + 1, stats) {
                colour += seen * reflectance;
            }
        }
        if let Some((bent, inside)) = refraction {
            if reflectance < 1.0 {
                stats.refracted += 1;
                let refracted = Ray::new(hit.point, bent);
                if let Some(seen) = self.trace(&refracted, inside, depth + 1, stats) {
                    colour += seen * (1.0 - reflectance);
                }
            }
        }
        colour
    }
}
