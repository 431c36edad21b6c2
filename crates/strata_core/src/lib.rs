//! Strata Core - scene assets for the Strata ray tracer.
//!
//! This crate provides:
//!
//! - **Images**: `Image` render targets and texture sources, TGA output
//! - **Surfaces**: `Material`, `Texture`, `PointLight`
//! - **Geometry**: indexed `Mesh` data, heightmap terrain and OBJ loading
//! - **Resources**: `ResourceManager`, a named registry of shared assets
//!
//! # Example
//!
//! ```ignore
//! use strata_core::{loaders, Material, ResourceManager};
//!
//! let mut resources = ResourceManager::new();
//! let heightmap = resources.load_image("terrain", "resources/terrain.tga")?;
//! let mesh = loaders::terrain_mesh(
//!     &heightmap,
//!     loaders::TERRAIN_CELL_SIZE,
//!     loaders::TERRAIN_MAX_HEIGHT,
//!     Vec3::ZERO,
//!     Material::default(),
//! )?;
//! let mesh = resources.create_mesh("terrain", mesh);
//! ```

pub mod error;
pub mod light;
pub mod loaders;
pub mod material;
pub mod mesh;
pub mod raster;
pub mod resources;
pub mod texture;

// Re-export commonly used types
pub use error::{CoreError, CoreResult};
pub use light::PointLight;
pub use material::Material;
pub use mesh::{Mesh, Vertex};
pub use raster::Image;
pub use resources::ResourceManager;
pub use texture::{ImageTexture, TerrainHeightTexture, Texture, TERRAIN_LAYERS};
