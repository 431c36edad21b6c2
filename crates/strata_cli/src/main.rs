use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use strata_math::Vec3;
use strata_renderer::render;

mod cli;
mod demo;
mod settings;

use cli::Args;
use demo::DemoScene;
use settings::{Settings, TerrainVariant};

/// Where an extra OBJ model is placed in the demo scene
const MODEL_POSITION: Vec3 = Vec3::new(-6.0, 4.0, -18.0);
const MODEL_SCALE: f32 = 1.0;

fn init_logger(args: &Args) {
    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args);

    let settings = Settings::from_args(&args)?;
    log::debug!("Settings: {:?}", settings);

    let mut scene = DemoScene::build(&settings.resources);
    if let Some(path) = &settings.obj {
        scene.add_model(path, MODEL_POSITION, MODEL_SCALE)?;
    }
    if scene.has_terrain() {
        scene.select_terrain(settings.terrain);
    } else if settings.terrain != TerrainVariant::None {
        log::warn!(
            "No heightmap found in {}, rendering without terrain",
            settings.resources.display()
        );
    }
    log::info!(
        "Scene: {} root shapes, {} images, {} meshes, {} textures",
        scene.root.len(),
        scene.resources.image_count(),
        scene.resources.mesh_count(),
        scene.resources.texture_count()
    );

    let raytracer = scene
        .into_raytracer(settings.camera, settings.orthographic, settings.show_debug)
        .context("Failed to set up the ray tracer")?;

    let output = render(&raytracer, &settings.render, &AtomicBool::new(false));
    output
        .image
        .save_tga(&settings.output)
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;
    log::info!("Wrote {}", settings.output.display());

    Ok(())
}
