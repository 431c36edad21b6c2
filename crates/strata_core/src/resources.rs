//! Named registry of images, meshes and textures.
//!
//! Shapes and materials hold `Arc` clones of what they use, so removing an
//! entry here only drops the registry's reference.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use strata_math::Colour;

use crate::{CoreError, CoreResult, Image, ImageTexture, Mesh, Texture};

/// Owns every shared asset of a scene, keyed by name.
#[derive(Default)]
pub struct ResourceManager {
    images: HashMap<String, Arc<Image>>,
    meshes: HashMap<String, Arc<Mesh>>,
    textures: HashMap<String, Arc<dyn Texture>>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a blank image under `name`, replacing any previous one.
    pub fn create_image(
        &mut self,
        name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Arc<Image> {
        self.insert_image(name, Image::new(width, height, Colour::BLACK))
    }

    pub fn insert_image(&mut self, name: impl Into<String>, image: Image) -> Arc<Image> {
        let name = name.into();
        log::debug!(
            "Registered image '{}' ({}x{})",
            name,
            image.width(),
            image.height()
        );
        let image = Arc::new(image);
        if self.images.insert(name.clone(), Arc::clone(&image)).is_some() {
            log::debug!("Replaced image '{}'", name);
        }
        image
    }

    /// Load an image from disk. Loading a name that is already registered
    /// returns the existing image without touching the file.
    pub fn load_image(&mut self, name: &str, path: impl AsRef<Path>) -> CoreResult<Arc<Image>> {
        if let Some(image) = self.images.get(name) {
            log::debug!("Image '{}' already loaded", name);
            return Ok(Arc::clone(image));
        }
        let image = Image::load(path.as_ref())?;
        log::info!("Loaded image '{}' from {}", name, path.as_ref().display());
        Ok(self.insert_image(name, image))
    }

    pub fn image(&self, name: &str) -> Option<Arc<Image>> {
        self.images.get(name).cloned()
    }

    pub fn remove_image(&mut self, name: &str) -> Option<Arc<Image>> {
        let removed = self.images.remove(name);
        if removed.is_some() {
            log::debug!("Removed image '{}'", name);
        }
        removed
    }

    pub fn clear_images(&mut self) {
        self.images.clear();
    }

    pub fn create_mesh(&mut self, name: impl Into<String>, mesh: Mesh) -> Arc<Mesh> {
        let name = name.into();
        log::debug!(
            "Registered mesh '{}' ({} triangles)",
            name,
            mesh.triangle_count()
        );
        let mesh = Arc::new(mesh);
        if self.meshes.insert(name.clone(), Arc::clone(&mesh)).is_some() {
            log::debug!("Replaced mesh '{}'", name);
        }
        mesh
    }

    pub fn mesh(&self, name: &str) -> Option<Arc<Mesh>> {
        self.meshes.get(name).cloned()
    }

    pub fn remove_mesh(&mut self, name: &str) -> Option<Arc<Mesh>> {
        let removed = self.meshes.remove(name);
        if removed.is_some() {
            log::debug!("Removed mesh '{}'", name);
        }
        removed
    }

    pub fn clear_meshes(&mut self) {
        self.meshes.clear();
    }

    /// Wrap a registered image in an [`ImageTexture`] stored under `name`.
    pub fn create_texture(
        &mut self,
        name: impl Into<String>,
        image: &str,
    ) -> CoreResult<Arc<dyn Texture>> {
        let image = self
            .image(image)
            .ok_or_else(|| CoreError::UnknownResource(image.to_string()))?;
        Ok(self.insert_texture(name, Arc::new(ImageTexture::new(image))))
    }

    pub fn insert_texture(
        &mut self,
        name: impl Into<String>,
        texture: Arc<dyn Texture>,
    ) -> Arc<dyn Texture> {
        let name = name.into();
        log::debug!("Registered texture '{}'", name);
        if self.textures.insert(name.clone(), Arc::clone(&texture)).is_some() {
            log::debug!("Replaced texture '{}'", name);
        }
        texture
    }

    pub fn texture(&self, name: &str) -> Option<Arc<dyn Texture>> {
        self.textures.get(name).cloned()
    }

    pub fn remove_texture(&mut self, name: &str) -> Option<Arc<dyn Texture>> {
        let removed = self.textures.remove(name);
        if removed.is_some() {
            log::debug!("Removed texture '{}'", name);
        }
        removed
    }

    pub fn clear_textures(&mut self) {
        self.textures.clear();
    }

    /// Drop every registered resource.
    pub fn clear(&mut self) {
        self.clear_textures();
        self.clear_meshes();
        self.clear_images();
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}
